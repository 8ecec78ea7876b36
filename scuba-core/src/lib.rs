pub mod audit;
pub mod collect;
pub mod config;
pub mod crawl;
pub mod error;
pub mod links;
pub mod report;

pub use audit::{AuditRecord, AuditStatus, IssueTag, PageAuditor, Severity};
pub use collect::{CrawlSet, LinkCollector};
pub use config::AuditConfig;
pub use crawl::{CrawlOrchestrator, ProgressCallback};
pub use error::{AuditError, Result};
pub use links::{LinkNormalizer, Normalized, OriginAllowlist};
pub use report::{Report, ReportFormat};
