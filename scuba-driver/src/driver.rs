//! The page-automation boundary consumed by the audit engine.
//!
//! A `Driver` owns a single page context that is navigated URL to URL.
//! Implementations decide what "loaded" and "idle" mean for their backend;
//! the engine only relies on the contract documented on each method.

use crate::error::Result;
use crate::result::{ElementHandle, Navigation};
use async_trait::async_trait;
use std::time::Duration;

/// How far a navigation must progress before `navigate` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitCondition {
    /// Structural DOM parsed, subresources may still be loading.
    DomContentLoaded,
    /// Full load event.
    Load,
    /// No network activity for a short quiet window.
    NetworkIdle,
}

#[async_trait]
pub trait Driver: Send + Sync {
    /// Navigate the page context to `url`.
    ///
    /// HTTP error statuses are reported through `Navigation::status`; only
    /// transport failures and timeouts are errors.
    async fn navigate(&self, url: &str, wait: WaitCondition, timeout: Duration)
        -> Result<Navigation>;

    /// Wait for network quiescence, failing with `DriverError::Timeout` if the
    /// page does not settle in time.
    async fn wait_for_idle(&self, timeout: Duration) -> Result<()>;

    /// All elements matching `selector`, in document order.
    async fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>>;

    /// Attribute value, `None` when the attribute is absent.
    async fn get_attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>>;

    async fn get_text(&self, element: &ElementHandle) -> Result<String>;

    async fn is_visible(&self, element: &ElementHandle) -> Result<bool>;

    async fn count(&self, selector: &str) -> Result<usize>;

    /// Document title, empty when the page has none.
    async fn title(&self) -> Result<String> {
        match self.query_all("title").await?.first() {
            Some(element) => Ok(self.get_text(element).await?.trim().to_string()),
            None => Ok(String::new()),
        }
    }

    /// URL the page context currently shows.
    async fn current_url(&self) -> Result<String>;
}
