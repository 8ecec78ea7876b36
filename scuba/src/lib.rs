// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

pub mod commands;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    AuditOutcome, build_config, display_path, report_format, write_default_config,
};
