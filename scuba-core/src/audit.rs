// Per-page audit: navigate, settle, then run the fixed check sequence

use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use scuba_driver::{Driver, DriverError, ElementHandle, Navigation, WaitCondition};
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Whether an issue fails the page or only warns about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Fail,
    Warn,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Fail => "fail",
            Severity::Warn => "warn",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueTag {
    Status(u16),
    EmptyBody,
    MissingNavbar,
    MissingFooter,
    MissingBrand,
    MissingTitle,
    MissingH1,
    MissingMetaDesc,
    Exception(String),
}

impl IssueTag {
    /// The classification policy. Only a missing H1 and a missing meta
    /// description are advisory.
    pub fn severity(&self) -> Severity {
        match self {
            IssueTag::Status(_)
            | IssueTag::EmptyBody
            | IssueTag::MissingNavbar
            | IssueTag::MissingFooter
            | IssueTag::MissingBrand
            | IssueTag::MissingTitle
            | IssueTag::Exception(_) => Severity::Fail,
            IssueTag::MissingH1 | IssueTag::MissingMetaDesc => Severity::Warn,
        }
    }
}

impl fmt::Display for IssueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueTag::Status(code) => write!(f, "Status {}", code),
            IssueTag::EmptyBody => f.write_str("Empty Body"),
            IssueTag::MissingNavbar => f.write_str("Missing Navbar"),
            IssueTag::MissingFooter => f.write_str("Missing Footer"),
            IssueTag::MissingBrand => f.write_str("Missing Brand"),
            IssueTag::MissingTitle => f.write_str("Missing Title"),
            IssueTag::MissingH1 => f.write_str("Missing H1"),
            IssueTag::MissingMetaDesc => f.write_str("Missing Meta Desc"),
            IssueTag::Exception(message) => write!(f, "Exception: {}", message),
        }
    }
}

impl Serialize for IssueTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditStatus {
    Pass,
    Fail,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Pass => "PASS",
            AuditStatus::Fail => "FAIL",
        }
    }
}

/// Result of auditing one URL. Issues are append-only and the overall status
/// follows from them.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub url: String,
    pub http_status: Option<u16>,
    issues: Vec<IssueTag>,
    status: AuditStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_time_ms: Option<u64>,
}

impl AuditRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http_status: None,
            issues: Vec::new(),
            status: AuditStatus::Pass,
            title: None,
            h1: None,
            meta_description: None,
            load_time_ms: None,
        }
    }

    /// Record for a visit that blew up before its checks completed.
    pub fn exception(url: impl Into<String>, message: impl Into<String>) -> Self {
        let mut record = Self::new(url);
        record.push_issue(IssueTag::Exception(message.into()));
        record
    }

    pub fn push_issue(&mut self, issue: IssueTag) {
        if issue.severity() == Severity::Fail {
            self.status = AuditStatus::Fail;
        }
        self.issues.push(issue);
    }

    pub fn issues(&self) -> &[IssueTag] {
        &self.issues
    }

    pub fn status(&self) -> AuditStatus {
        self.status
    }

    pub fn is_pass(&self) -> bool {
        self.status == AuditStatus::Pass
    }

    pub fn has_issue(&self, issue: &IssueTag) -> bool {
        self.issues.contains(issue)
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| i.severity() == Severity::Warn)
    }
}

/// Navigate with the driver's own timeout, backed by a hard deadline in case
/// the driver does not honour it.
pub(crate) async fn navigate_bounded<D: Driver + ?Sized>(
    driver: &D,
    url: &str,
    wait: WaitCondition,
    timeout: Duration,
) -> std::result::Result<Navigation, DriverError> {
    match tokio::time::timeout(timeout, driver.navigate(url, wait, timeout)).await {
        Ok(result) => result,
        Err(_) => Err(DriverError::Timeout(timeout)),
    }
}

/// Best-effort stabilization: network idle up to `idle_timeout`, then a
/// fixed settle delay. Never fails.
pub(crate) async fn settle<D: Driver + ?Sized>(
    driver: &D,
    url: &str,
    idle_timeout: Duration,
    settle_delay: Duration,
) {
    if !idle_timeout.is_zero() {
        match tokio::time::timeout(idle_timeout, driver.wait_for_idle(idle_timeout)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Network idle wait failed on {}, continuing: {}", url, e),
            Err(_) => warn!("Network idle timeout on {}, continuing", url),
        }
    }

    if !settle_delay.is_zero() {
        tokio::time::sleep(settle_delay).await;
    }
}

/// Elements of the first candidate selector that matches anything.
pub(crate) async fn first_match<D: Driver + ?Sized>(
    driver: &D,
    candidates: &[String],
) -> Result<Vec<ElementHandle>> {
    for selector in candidates.iter().filter(|s| !s.trim().is_empty()) {
        let elements = driver.query_all(selector).await?;
        if !elements.is_empty() {
            debug!("Selector '{}' matched {} element(s)", selector, elements.len());
            return Ok(elements);
        }
    }
    Ok(Vec::new())
}

pub struct PageAuditor<'a, D: Driver + ?Sized> {
    driver: &'a D,
    config: &'a AuditConfig,
    seed: Option<String>,
}

impl<'a, D: Driver + ?Sized> PageAuditor<'a, D> {
    pub fn new(driver: &'a D, config: &'a AuditConfig) -> Self {
        Self {
            driver,
            config,
            seed: None,
        }
    }

    /// Mark `seed` as the home page, enabling the brand check there.
    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    /// Audit one URL.
    ///
    /// Failed checks become issues on the returned record. An `Err` means the
    /// driver itself failed (navigation timeout, lost page) and the record
    /// could not be completed.
    pub async fn audit(&self, url: &str) -> Result<AuditRecord> {
        let parsed =
            Url::parse(url).map_err(|e| AuditError::InvalidUrl(format!("{}: {}", url, e)))?;
        let mut record = AuditRecord::new(url);

        info!("Auditing {}", url);
        let navigation = navigate_bounded(
            self.driver,
            url,
            WaitCondition::DomContentLoaded,
            self.config.navigation_timeout(),
        )
        .await?;
        record.http_status = Some(navigation.status);
        record.load_time_ms = Some(navigation.load_time.as_millis() as u64);

        settle(
            self.driver,
            url,
            self.config.idle_timeout(),
            self.config.settle_delay(),
        )
        .await;

        self.check_status(&navigation, &mut record);
        self.check_body(&mut record).await?;

        if self.config.is_special_layout(&parsed) {
            debug!("{} uses a special layout, skipping landmark checks", url);
        } else {
            self.check_layout(&mut record).await?;
        }

        self.check_seo(&mut record).await?;

        for issue in record.issues() {
            match issue.severity() {
                Severity::Fail => warn!("{}: {}", url, issue),
                Severity::Warn => warn!("Warning: {} on {}", issue, url),
            }
        }

        Ok(record)
    }

    fn check_status(&self, navigation: &Navigation, record: &mut AuditRecord) {
        if navigation.status != 200 {
            record.push_issue(IssueTag::Status(navigation.status));
        }
    }

    /// White-screen detection: the body needs at least one element or some
    /// text.
    async fn check_body(&self, record: &mut AuditRecord) -> Result<()> {
        if self.driver.count("body *").await? > 0 {
            return Ok(());
        }

        let text = match self.driver.query_all("body").await?.first() {
            Some(body) => self.driver.get_text(body).await?,
            None => String::new(),
        };
        if text.trim().is_empty() {
            record.push_issue(IssueTag::EmptyBody);
        }
        Ok(())
    }

    async fn check_layout(&self, record: &mut AuditRecord) -> Result<()> {
        if !self.landmark_visible(&self.config.nav_selectors).await? {
            record.push_issue(IssueTag::MissingNavbar);
        }
        if !self.landmark_visible(&self.config.footer_selectors).await? {
            record.push_issue(IssueTag::MissingFooter);
        }

        let is_seed = self.seed.as_deref() == Some(record.url.as_str());
        if is_seed
            && !self.config.brand_selectors.is_empty()
            && !self.landmark_visible(&self.config.brand_selectors).await?
        {
            record.push_issue(IssueTag::MissingBrand);
        }
        Ok(())
    }

    async fn check_seo(&self, record: &mut AuditRecord) -> Result<()> {
        let title = self.driver.title().await?;
        if title.trim().is_empty() {
            record.push_issue(IssueTag::MissingTitle);
        } else {
            record.title = Some(title.trim().to_string());
        }

        let h1_text = match self.driver.query_all("h1").await?.first() {
            Some(h1) => self.driver.get_text(h1).await?,
            None => String::new(),
        };
        if h1_text.trim().is_empty() {
            record.push_issue(IssueTag::MissingH1);
        } else {
            record.h1 = Some(h1_text.trim().to_string());
        }

        let description = match self
            .driver
            .query_all(r#"meta[name="description"]"#)
            .await?
            .first()
        {
            Some(meta) => self.driver.get_attribute(meta, "content").await?,
            None => None,
        };
        match description {
            Some(content) if !content.trim().is_empty() => {
                record.meta_description = Some(content.trim().to_string());
            }
            _ => record.push_issue(IssueTag::MissingMetaDesc),
        }

        Ok(())
    }

    async fn landmark_visible(&self, candidates: &[String]) -> Result<bool> {
        match first_match(self.driver, candidates).await?.first() {
            Some(landmark) => Ok(self.driver.is_visible(landmark).await?),
            None => Ok(false),
        }
    }
}
