//! Static page model backed by parsed HTML.
//!
//! `PageSnapshot` answers DOM queries against a fetched document and
//! `PageSession` tracks which snapshot is current so element handles can be
//! checked for staleness. Documents are parsed per query and never held
//! across an await point.

use crate::error::{DriverError, Result};
use crate::result::ElementHandle;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Tags whose content is never rendered.
const NON_RENDERED_TAGS: &[&str] = &["head", "script", "style", "template", "noscript"];

#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub url: String,
    pub status: u16,
    pub html: String,
}

impl PageSnapshot {
    pub fn new(url: impl Into<String>, status: u16, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status,
            html: html.into(),
        }
    }

    pub fn count(&self, selector: &str) -> Result<usize> {
        let selector = parse_selector(selector)?;
        let document = Html::parse_document(&self.html);
        Ok(document.select(&selector).count())
    }

    pub fn attribute(&self, selector: &str, index: usize, name: &str) -> Result<Option<String>> {
        self.with_element(selector, index, |element| {
            element.value().attr(name).map(|v| v.to_string())
        })
    }

    /// Text content with whitespace runs collapsed, roughly what a reader sees.
    pub fn text(&self, selector: &str, index: usize) -> Result<String> {
        self.with_element(selector, index, |element| {
            element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
        })
    }

    pub fn is_visible(&self, selector: &str, index: usize) -> Result<bool> {
        self.with_element(selector, index, |element| {
            if is_hidden(&element) {
                return false;
            }
            !element
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|ancestor| is_hidden(&ancestor))
        })
    }

    fn with_element<R>(
        &self,
        selector: &str,
        index: usize,
        f: impl FnOnce(ElementRef<'_>) -> R,
    ) -> Result<R> {
        let parsed = parse_selector(selector)?;
        let document = Html::parse_document(&self.html);
        let element = document
            .select(&parsed)
            .nth(index)
            .ok_or_else(|| DriverError::StaleElement(format!("{}[{}]", selector, index)))?;
        Ok(f(element))
    }
}

/// Reject a CSS selector that no query could ever use.
pub fn check_selector(selector: &str) -> Result<()> {
    parse_selector(selector).map(|_| ())
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| DriverError::InvalidSelector(format!("{}: {}", selector, e)))
}

fn is_hidden(element: &ElementRef<'_>) -> bool {
    let value = element.value();

    if NON_RENDERED_TAGS.contains(&value.name()) {
        return true;
    }
    if value.attr("hidden").is_some() {
        return true;
    }
    if value
        .attr("aria-hidden")
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    {
        return true;
    }
    if value.name() == "input"
        && value
            .attr("type")
            .is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
    {
        return true;
    }

    if let Some(style) = value.attr("style") {
        let style: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        if style.contains("display:none") || style.contains("visibility:hidden") {
            return true;
        }
    }

    false
}

struct SessionState {
    generation: u64,
    page: Option<Arc<PageSnapshot>>,
}

/// The single page context a driver navigates.
pub struct PageSession {
    state: RwLock<SessionState>,
}

impl PageSession {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SessionState {
                generation: 0,
                page: None,
            }),
        }
    }

    /// Install a freshly loaded page, invalidating every outstanding handle.
    pub async fn load(&self, snapshot: PageSnapshot) -> u64 {
        let mut state = self.state.write().await;
        state.generation += 1;
        state.page = Some(Arc::new(snapshot));
        state.generation
    }

    pub async fn current(&self) -> Result<(u64, Arc<PageSnapshot>)> {
        let state = self.state.read().await;
        match state.page {
            Some(ref page) => Ok((state.generation, page.clone())),
            None => Err(DriverError::NoPage),
        }
    }

    async fn resolve(&self, element: &ElementHandle) -> Result<Arc<PageSnapshot>> {
        let (generation, page) = self.current().await?;
        if generation != element.generation() {
            return Err(DriverError::StaleElement(element.to_string()));
        }
        Ok(page)
    }

    pub async fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        let (generation, page) = self.current().await?;
        let found = page.count(selector)?;
        Ok((0..found)
            .map(|index| ElementHandle::new(generation, selector, index))
            .collect())
    }

    pub async fn count(&self, selector: &str) -> Result<usize> {
        let (_, page) = self.current().await?;
        page.count(selector)
    }

    pub async fn get_attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        let page = self.resolve(element).await?;
        page.attribute(element.selector(), element.index(), name)
    }

    pub async fn get_text(&self, element: &ElementHandle) -> Result<String> {
        let page = self.resolve(element).await?;
        page.text(element.selector(), element.index())
    }

    pub async fn is_visible(&self, element: &ElementHandle) -> Result<bool> {
        let page = self.resolve(element).await?;
        page.is_visible(element.selector(), element.index())
    }

    pub async fn current_url(&self) -> Result<String> {
        let (_, page) = self.current().await?;
        Ok(page.url.clone())
    }
}

impl Default for PageSession {
    fn default() -> Self {
        Self::new()
    }
}
