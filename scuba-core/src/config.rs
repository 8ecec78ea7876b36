// Audit configuration: origins, landmark selectors, special layouts, timeouts

use crate::error::{AuditError, Result};
use crate::links::OriginAllowlist;
use scuba_driver::check_selector;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Origins treated as internal. Empty means the seed URL's origin.
    pub origins: Vec<String>,
    /// Candidate selectors for the primary navigation landmark, tried in order.
    pub nav_selectors: Vec<String>,
    /// Candidate selectors for the footer landmark, tried in order.
    pub footer_selectors: Vec<String>,
    /// Candidate selectors for the anchors collected from the navigation.
    pub nav_link_selectors: Vec<String>,
    /// Candidate selectors for the anchors collected from the footer.
    pub footer_link_selectors: Vec<String>,
    /// Path substrings of pages rendered without shared chrome.
    pub special_layout_paths: Vec<String>,
    /// Candidate selectors for the brand logo checked on the seed page.
    pub brand_selectors: Vec<String>,
    pub seed_timeout_ms: u64,
    pub navigation_timeout_ms: u64,
    pub idle_timeout_ms: u64,
    pub settle_delay_ms: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            origins: Vec::new(),
            nav_selectors: strings(&[
                ".navbar.navbar-expand-lg",
                "header nav",
                "nav",
                "[role=navigation]",
            ]),
            footer_selectors: strings(&["footer.main-footer", "footer", "[role=contentinfo]"]),
            nav_link_selectors: strings(&[
                ".navbar.navbar-expand-lg .nav-link",
                "header nav a[href]",
                "nav a[href]",
            ]),
            footer_link_selectors: strings(&["footer.main-footer a", "footer a[href]"]),
            special_layout_paths: strings(&["/book"]),
            brand_selectors: strings(&[".navbar-brand img"]),
            seed_timeout_ms: 60_000,
            navigation_timeout_ms: 20_000,
            idle_timeout_ms: 10_000,
            settle_delay_ms: 2_000,
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl AuditConfig {
    /// Load a JSON config file. `~` in the path is expanded.
    pub fn load(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path);
        let content = fs::read_to_string(Path::new(expanded.as_ref()))?;
        let config: AuditConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("nav_selectors", &self.nav_selectors),
            ("footer_selectors", &self.footer_selectors),
            ("nav_link_selectors", &self.nav_link_selectors),
            ("footer_link_selectors", &self.footer_link_selectors),
        ];
        for (name, selectors) in required {
            if selectors.iter().all(|s| s.trim().is_empty()) {
                return Err(AuditError::Config(format!("{} must not be empty", name)));
            }
        }

        for (name, selectors) in required
            .into_iter()
            .chain([("brand_selectors", &self.brand_selectors)])
        {
            for selector in selectors.iter().filter(|s| !s.trim().is_empty()) {
                check_selector(selector)
                    .map_err(|e| AuditError::Config(format!("{}: {}", name, e)))?;
            }
        }

        for origin in &self.origins {
            let parsed = Url::parse(origin)
                .map_err(|e| AuditError::Config(format!("invalid origin '{}': {}", origin, e)))?;
            if !parsed.origin().is_tuple() {
                return Err(AuditError::Config(format!(
                    "origin '{}' has no host",
                    origin
                )));
            }
        }

        if self.navigation_timeout_ms == 0 || self.seed_timeout_ms == 0 {
            return Err(AuditError::Config(
                "navigation timeouts must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Internal origins for a run starting at `seed`.
    pub fn allowlist(&self, seed: &Url) -> Result<OriginAllowlist> {
        if self.origins.is_empty() {
            return Ok(OriginAllowlist::from_url(seed));
        }
        OriginAllowlist::parse(&self.origins)
    }

    /// True when `url`'s path matches a special-layout entry.
    pub fn is_special_layout(&self, url: &Url) -> bool {
        let path = url.path();
        self.special_layout_paths
            .iter()
            .filter(|p| !p.is_empty())
            .any(|p| path.contains(p.as_str()))
    }

    pub fn seed_timeout(&self) -> Duration {
        Duration::from_millis(self.seed_timeout_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
