use crate::driver::{Driver, WaitCondition};
use crate::error::{DriverError, Result};
use crate::page::{PageSession, PageSnapshot};
use crate::result::{ElementHandle, Navigation};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

const USER_AGENT: &str = "Scuba/0.1 (https://github.com/trapdoorsec/scuba)";

/// Driver that loads pages with plain HTTP requests.
///
/// No scripts run, so a page is as settled as it will ever be once its body
/// has been read: every `WaitCondition` is met at that point and
/// `wait_for_idle` returns immediately.
pub struct HttpDriver {
    client: Client,
    session: PageSession,
}

impl HttpDriver {
    pub fn new() -> Result<Self> {
        Self::with_connect_timeout(Duration::from_secs(10))
    }

    pub fn with_connect_timeout(connect_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(connect_timeout)
            .cookie_store(true)
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            session: PageSession::new(),
        })
    }

    async fn fetch(&self, url: &Url) -> Result<PageSnapshot> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        if let Some(ref ct) = content_type
            && !ct.contains("html")
        {
            debug!("{} served non-HTML content ({})", final_url, ct);
        }

        let body = response.text().await?;
        Ok(PageSnapshot::new(final_url, status, body))
    }
}

#[async_trait]
impl Driver for HttpDriver {
    async fn navigate(
        &self,
        url: &str,
        wait: WaitCondition,
        timeout: Duration,
    ) -> Result<Navigation> {
        let parsed = Url::parse(url).map_err(|e| DriverError::InvalidUrl(format!("{}: {}", url, e)))?;
        debug!("Navigating to {} (wait: {:?}, timeout: {:?})", url, wait, timeout);

        let start = Instant::now();
        let snapshot = match tokio::time::timeout(timeout, self.fetch(&parsed)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("Navigation to {} exceeded {:?}", url, timeout);
                return Err(DriverError::Timeout(timeout));
            }
        };

        let mut navigation = Navigation::new(snapshot.url.clone(), snapshot.status);
        navigation.load_time = start.elapsed();
        self.session.load(snapshot).await;

        Ok(navigation)
    }

    async fn wait_for_idle(&self, _timeout: Duration) -> Result<()> {
        self.session.current().await.map(|_| ())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        self.session.query_all(selector).await
    }

    async fn get_attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        self.session.get_attribute(element, name).await
    }

    async fn get_text(&self, element: &ElementHandle) -> Result<String> {
        self.session.get_text(element).await
    }

    async fn is_visible(&self, element: &ElementHandle) -> Result<bool> {
        self.session.is_visible(element).await
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        self.session.count(selector).await
    }

    async fn current_url(&self) -> Result<String> {
        self.session.current_url().await
    }
}
