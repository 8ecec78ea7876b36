pub mod driver;
pub mod error;
pub mod http;
pub mod page;
pub mod result;

pub use driver::{Driver, WaitCondition};
pub use error::DriverError;
pub use http::HttpDriver;
pub use page::{PageSession, PageSnapshot, check_selector};
pub use result::{ElementHandle, Navigation};
