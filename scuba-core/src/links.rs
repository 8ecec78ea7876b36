// Href resolution and internal/external classification

use crate::error::{AuditError, Result};
use url::{Origin, Url};

/// Scheme prefixes that never lead to an auditable page.
const EXCLUDED_SCHEMES: &[&str] = &["mailto:", "tel:", "javascript:"];

/// Outcome of normalizing one href.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// Absolute URL on an allowlisted origin, fragment removed.
    Internal(String),
    Excluded(Exclusion),
}

impl Normalized {
    pub fn into_internal(self) -> Option<String> {
        match self {
            Normalized::Internal(url) => Some(url),
            Normalized::Excluded(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    Empty,
    Fragment,
    Scheme,
    Unparsable,
    External,
}

/// The set of origins considered internal to the audited site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginAllowlist {
    origins: Vec<Origin>,
}

impl OriginAllowlist {
    pub fn from_url(url: &Url) -> Self {
        Self {
            origins: vec![url.origin()],
        }
    }

    pub fn parse(origins: &[String]) -> Result<Self> {
        let mut parsed = Vec::with_capacity(origins.len());
        for origin in origins {
            let url = Url::parse(origin)
                .map_err(|e| AuditError::InvalidUrl(format!("{}: {}", origin, e)))?;
            let origin = url.origin();
            if !parsed.contains(&origin) {
                parsed.push(origin);
            }
        }
        if parsed.is_empty() {
            return Err(AuditError::Config("origin allowlist is empty".to_string()));
        }
        Ok(Self { origins: parsed })
    }

    /// Add `url`'s origin. Returns false if it was already present or the
    /// URL has no host.
    pub fn insert(&mut self, url: &Url) -> bool {
        let origin = url.origin();
        if !origin.is_tuple() || self.origins.contains(&origin) {
            return false;
        }
        self.origins.push(origin);
        true
    }

    pub fn contains(&self, url: &Url) -> bool {
        let origin = url.origin();
        origin.is_tuple() && self.origins.contains(&origin)
    }

    /// Serialized origins, e.g. `https://www.example.com`.
    pub fn origins(&self) -> Vec<String> {
        self.origins.iter().map(|o| o.ascii_serialization()).collect()
    }
}

pub struct LinkNormalizer {
    allowlist: OriginAllowlist,
}

impl LinkNormalizer {
    pub fn new(allowlist: OriginAllowlist) -> Self {
        Self { allowlist }
    }

    pub fn allowlist(&self) -> &OriginAllowlist {
        &self.allowlist
    }

    /// Resolve `href` against `base_url` and classify it. Never fails:
    /// anything that cannot be resolved is simply excluded.
    pub fn normalize(&self, href: &str, base_url: &str) -> Normalized {
        match Url::parse(base_url) {
            Ok(base) => self.normalize_against(href, &base),
            Err(_) => Normalized::Excluded(Exclusion::Unparsable),
        }
    }

    pub fn normalize_against(&self, href: &str, base: &Url) -> Normalized {
        let href = href.trim();
        if href.is_empty() {
            return Normalized::Excluded(Exclusion::Empty);
        }
        if href.starts_with('#') {
            return Normalized::Excluded(Exclusion::Fragment);
        }
        if has_excluded_scheme(href) {
            return Normalized::Excluded(Exclusion::Scheme);
        }

        let mut resolved = match base.join(href) {
            Ok(url) => url,
            Err(_) => return Normalized::Excluded(Exclusion::Unparsable),
        };

        if !self.allowlist.contains(&resolved) {
            return Normalized::Excluded(Exclusion::External);
        }

        resolved.set_fragment(None);
        Normalized::Internal(resolved.to_string())
    }
}

fn has_excluded_scheme(href: &str) -> bool {
    EXCLUDED_SCHEMES.iter().any(|scheme| {
        href.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// The part of `url` after its origin, for compact display.
pub fn strip_origin(url: &str, allowlist: &OriginAllowlist) -> String {
    if let Ok(parsed) = Url::parse(url)
        && allowlist.contains(&parsed)
    {
        let mut display = parsed.path().to_string();
        if let Some(query) = parsed.query() {
            display.push('?');
            display.push_str(query);
        }
        return display;
    }
    url.to_string()
}
