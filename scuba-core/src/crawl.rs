use crate::audit::{AuditRecord, PageAuditor};
use crate::collect::LinkCollector;
use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::report::Report;
use futures::FutureExt;
use scuba_driver::Driver;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info};
use url::Url;

/// Called before each visit with `(position, total, url)`, position 1-based.
pub type ProgressCallback = Arc<dyn Fn(usize, usize, &str) + Send + Sync>;

/// Drives a whole run: collect links from the seed, then audit every URL in
/// order on a single page context.
pub struct CrawlOrchestrator<D: Driver> {
    driver: D,
    config: AuditConfig,
    progress_callback: Option<ProgressCallback>,
}

impl<D: Driver> CrawlOrchestrator<D> {
    pub fn new(driver: D, config: AuditConfig) -> Self {
        Self {
            driver,
            config,
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Run the audit starting at `seed`.
    ///
    /// Only a seed that cannot be loaded (or a bad configuration) makes this
    /// return `Err`. Every other failure ends up as a FAIL record in the
    /// report.
    pub async fn run(&self, seed: &str) -> Result<Report> {
        self.config.validate()?;
        let seed_url =
            Url::parse(seed).map_err(|e| AuditError::InvalidUrl(format!("{}: {}", seed, e)))?;
        let mut allowlist = self.config.allowlist(&seed_url)?;

        let crawl_set = LinkCollector::new(&self.driver, &self.config)
            .collect(seed)
            .await?;
        // A redirected seed may have widened the internal origins.
        for url in crawl_set.iter() {
            if let Ok(parsed) = Url::parse(url) {
                allowlist.insert(&parsed);
            }
        }

        let mut report = Report::new(crawl_set.seed(), allowlist);
        let auditor = PageAuditor::new(&self.driver, &self.config).with_seed(crawl_set.seed());

        let urls = crawl_set.into_urls();
        let total = urls.len();
        for (idx, url) in urls.iter().enumerate() {
            if let Some(ref callback) = self.progress_callback {
                callback(idx + 1, total, url);
            }
            report.push(Self::audit_step(&auditor, url).await);
        }

        report.finish();
        info!(
            "Audit complete: {} page(s), {} failed",
            report.records().len(),
            report.summary().failed
        );
        Ok(report)
    }

    /// One isolated visit. Errors and panics from the audit are turned into
    /// an `Exception` record so the remaining URLs still get visited.
    async fn audit_step(auditor: &PageAuditor<'_, D>, url: &str) -> AuditRecord {
        match AssertUnwindSafe(auditor.audit(url)).catch_unwind().await {
            Ok(Ok(record)) => record,
            Ok(Err(e)) => {
                error!("Failed during visit to {}: {}", url, e);
                AuditRecord::exception(url, e.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!("Visit to {} panicked: {}", url, message);
                AuditRecord::exception(url, message)
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic during audit".to_string()
    }
}
