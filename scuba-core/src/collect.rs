// Link collection from the seed page's navigation and footer

use crate::audit::{first_match, navigate_bounded, settle};
use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::links::{LinkNormalizer, Normalized};
use scuba_driver::{Driver, WaitCondition};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use url::Url;

/// Deduplicated, insertion-ordered set of URLs to audit. The seed is always
/// the first entry, so a set is never empty: the seed goes in on
/// construction and entries are never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSet {
    urls: Vec<String>,
    seen: HashSet<String>,
}

#[allow(clippy::len_without_is_empty)]
impl CrawlSet {
    pub fn new(seed: impl Into<String>) -> Self {
        let seed = seed.into();
        let mut seen = HashSet::new();
        seen.insert(seed.clone());
        Self {
            urls: vec![seed],
            seen,
        }
    }

    /// Returns false if the URL was already present.
    pub fn insert(&mut self, url: String) -> bool {
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.urls.push(url);
        true
    }

    pub fn seed(&self) -> &str {
        &self.urls[0]
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }

    /// Freeze the set into its visit order.
    pub fn into_urls(self) -> Vec<String> {
        self.urls
    }
}

pub struct LinkCollector<'a, D: Driver + ?Sized> {
    driver: &'a D,
    config: &'a AuditConfig,
}

impl<'a, D: Driver + ?Sized> LinkCollector<'a, D> {
    pub fn new(driver: &'a D, config: &'a AuditConfig) -> Self {
        Self { driver, config }
    }

    /// Load the seed page and gather every internal link from its navigation
    /// and footer anchors.
    ///
    /// This is the run's hard gate: if the seed cannot be loaded, or answers
    /// with anything but 200, the error is returned and no audit happens.
    pub async fn collect(&self, seed: &str) -> Result<CrawlSet> {
        let mut seed_url =
            Url::parse(seed).map_err(|e| AuditError::InvalidUrl(format!("{}: {}", seed, e)))?;
        seed_url.set_fragment(None);

        let mut allowlist = self.config.allowlist(&seed_url)?;
        if !allowlist.contains(&seed_url) {
            return Err(AuditError::Config(format!(
                "seed {} is outside the origin allowlist",
                seed_url
            )));
        }

        info!("Loading seed page {}", seed_url);
        let navigation = navigate_bounded(
            self.driver,
            seed_url.as_str(),
            WaitCondition::DomContentLoaded,
            self.config.seed_timeout(),
        )
        .await
        .map_err(|e| AuditError::SeedUnreachable {
            url: seed_url.to_string(),
            reason: e.to_string(),
        })?;

        if navigation.status != 200 {
            return Err(AuditError::SeedStatus {
                url: seed_url.to_string(),
                status: navigation.status,
            });
        }

        settle(
            self.driver,
            seed_url.as_str(),
            self.config.idle_timeout(),
            self.config.settle_delay(),
        )
        .await;

        // Relative hrefs resolve against wherever the seed actually landed.
        let base = Url::parse(&navigation.url).unwrap_or_else(|_| seed_url.clone());
        if base.origin() != seed_url.origin() {
            if self.config.origins.is_empty() {
                warn!(
                    "Seed {} redirected to {}, treating {} as internal",
                    seed_url,
                    base,
                    base.origin().ascii_serialization()
                );
                allowlist.insert(&base);
            } else if !allowlist.contains(&base) {
                warn!(
                    "Seed {} redirected to {}, outside the configured origins",
                    seed_url, base
                );
            }
        }
        let normalizer = LinkNormalizer::new(allowlist);

        let mut crawl_set = CrawlSet::new(seed_url.to_string());
        let regions = [
            ("navigation", &self.config.nav_link_selectors),
            ("footer", &self.config.footer_link_selectors),
        ];

        for (region, candidates) in regions {
            let anchors = first_match(self.driver, candidates).await?;
            debug!("{} anchors found in {} region", anchors.len(), region);

            for anchor in anchors {
                let href = match self.driver.get_attribute(&anchor, "href").await {
                    Ok(Some(href)) => href,
                    Ok(None) => continue,
                    // Anchors can detach between enumeration and read
                    Err(e) => {
                        warn!("Skipping unreadable anchor {}: {}", anchor, e);
                        continue;
                    }
                };

                match normalizer.normalize_against(&href, &base) {
                    Normalized::Internal(url) => {
                        if crawl_set.insert(url.clone()) {
                            debug!("  + {}", url);
                        }
                    }
                    Normalized::Excluded(reason) => {
                        debug!("  - {} ({:?})", href, reason);
                    }
                }
            }
        }

        info!("Found {} unique internal links to audit", crawl_set.len());
        Ok(crawl_set)
    }
}
