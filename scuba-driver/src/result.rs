use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of a completed navigation.
///
/// A non-2xx response is still a completed navigation; callers inspect
/// `status` themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Navigation {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub load_time: Duration,
}

impl Navigation {
    pub fn new(url: String, status: u16) -> Self {
        Self {
            url,
            status,
            load_time: Duration::from_secs(0),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Reference to an element returned by `Driver::query_all`.
///
/// Handles are tied to the page generation they were enumerated on. Once the
/// driver navigates elsewhere, reading through an old handle fails with
/// `DriverError::StaleElement`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    generation: u64,
    selector: String,
    index: usize,
}

impl ElementHandle {
    pub fn new(generation: u64, selector: impl Into<String>, index: usize) -> Self {
        Self {
            generation,
            selector: selector.into(),
            index,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl std::fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]@{}", self.selector, self.index, self.generation)
    }
}
