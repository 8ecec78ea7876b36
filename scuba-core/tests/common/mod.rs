// In-memory driver serving canned pages, shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use scuba_core::AuditConfig;
use scuba_driver::{
    Driver, DriverError, ElementHandle, Navigation, PageSession, PageSnapshot, WaitCondition,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

pub const ORIGIN: &str = "https://www.example.com";
pub const SEED: &str = "https://www.example.com/";

pub struct FixtureDriver {
    session: PageSession,
    pages: HashMap<String, (u16, String)>,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    slow: HashMap<String, Duration>,
    idle_delay: Option<Duration>,
    stale_hrefs: HashSet<String>,
    redirects: HashMap<String, String>,
    visits: Mutex<Vec<String>>,
}

impl FixtureDriver {
    pub fn new() -> Self {
        Self {
            session: PageSession::new(),
            pages: HashMap::new(),
            failing: HashSet::new(),
            panicking: HashSet::new(),
            slow: HashMap::new(),
            idle_delay: None,
            stale_hrefs: HashSet::new(),
            redirects: HashMap::new(),
            visits: Mutex::new(Vec::new()),
        }
    }

    pub fn page(mut self, url: &str, status: u16, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), (status, html.into()));
        self
    }

    /// Navigation to `url` fails with a transport error.
    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// Navigation to `url` panics.
    pub fn panicking(mut self, url: &str) -> Self {
        self.panicking.insert(url.to_string());
        self
    }

    /// Navigation to `url` takes `delay` before completing.
    pub fn slow(mut self, url: &str, delay: Duration) -> Self {
        self.slow.insert(url.to_string(), delay);
        self
    }

    /// Every network-idle wait takes `delay`.
    pub fn slow_idle(mut self, delay: Duration) -> Self {
        self.idle_delay = Some(delay);
        self
    }

    /// Reading an anchor whose href is `href` fails as if it had detached.
    pub fn stale_href(mut self, href: &str) -> Self {
        self.stale_hrefs.insert(href.to_string());
        self
    }

    /// Navigation to `from` lands on `to`, which is served instead.
    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Driver for FixtureDriver {
    async fn navigate(
        &self,
        url: &str,
        _wait: WaitCondition,
        _timeout: Duration,
    ) -> Result<Navigation, DriverError> {
        self.visits.lock().unwrap().push(url.to_string());

        if self.panicking.contains(url) {
            panic!("renderer crashed on {}", url);
        }
        if self.failing.contains(url) {
            return Err(DriverError::Other(format!("connection refused: {}", url)));
        }
        if let Some(delay) = self.slow.get(url) {
            tokio::time::sleep(*delay).await;
        }

        let target = self.redirects.get(url).map(String::as_str).unwrap_or(url);
        let (status, html) = self.pages.get(target).cloned().unwrap_or_else(|| {
            (
                404,
                "<html><head><title>Not Found</title></head><body><h1>Not Found</h1></body></html>"
                    .to_string(),
            )
        });
        self.session
            .load(PageSnapshot::new(target, status, html))
            .await;
        Ok(Navigation::new(target.to_string(), status))
    }

    async fn wait_for_idle(&self, _timeout: Duration) -> Result<(), DriverError> {
        if let Some(delay) = self.idle_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>, DriverError> {
        self.session.query_all(selector).await
    }

    async fn get_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        let value = self.session.get_attribute(element, name).await?;
        if name == "href"
            && let Some(ref href) = value
            && self.stale_hrefs.contains(href)
        {
            return Err(DriverError::StaleElement(element.to_string()));
        }
        Ok(value)
    }

    async fn get_text(&self, element: &ElementHandle) -> Result<String, DriverError> {
        self.session.get_text(element).await
    }

    async fn is_visible(&self, element: &ElementHandle) -> Result<bool, DriverError> {
        self.session.is_visible(element).await
    }

    async fn count(&self, selector: &str) -> Result<usize, DriverError> {
        self.session.count(selector).await
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        self.session.current_url().await
    }
}

/// Default configuration without the settle delay so tests stay fast.
pub fn fast_config() -> AuditConfig {
    AuditConfig {
        settle_delay_ms: 0,
        ..AuditConfig::default()
    }
}

/// A page using the site's usual chrome.
pub fn site_page(title: &str, h1: &str, nav: &[&str], footer: &[&str]) -> String {
    let nav_links: String = nav
        .iter()
        .map(|href| format!(r#"<a class="nav-link" href="{}">Link</a>"#, href))
        .collect();
    let footer_links: String = footer
        .iter()
        .map(|href| format!(r#"<a href="{}">Link</a>"#, href))
        .collect();

    format!(
        r#"<html>
<head><title>{title}</title><meta name="description" content="Electric motorcycles"></head>
<body>
  <nav class="navbar navbar-expand-lg">
    <a class="navbar-brand" href="/"><img src="/logo.png" alt="Logo"></a>
    {nav_links}
  </nav>
  <main><h1>{h1}</h1><p>Welcome aboard.</p></main>
  <footer class="main-footer">{footer_links}</footer>
</body>
</html>"#
    )
}

/// A healthy page with no outgoing links.
pub fn plain_page(title: &str) -> String {
    site_page(title, title, &[], &[])
}

pub fn url(path: &str) -> String {
    format!("{}{}", ORIGIN, path)
}
