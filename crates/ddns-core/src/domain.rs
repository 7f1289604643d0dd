//! Domain name splitting
//!
//! A request domain such as `a.b.example.com` is split into the resource
//! record prefix (`a.b`) and the registered domain (`example.com`), the two
//! values the provider APIs take separately.

use crate::error::{Error, Result};

/// Minimum number of labels a request domain must have
const MIN_LABELS: usize = 3;

/// Labels that form the registered domain
const REGISTERED_LABELS: usize = 2;

/// A domain split into resource record prefix and registered domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitDomain {
    /// Resource record prefix, e.g. `www` in `www.example.com`
    pub rr: String,
    /// Registered domain (the last two labels), e.g. `example.com`
    pub domain: String,
}

impl SplitDomain {
    /// Split a domain name
    ///
    /// Fails when the name has fewer than three labels or when either part
    /// ends up blank (e.g. `.example.com`).
    pub fn parse(name: &str) -> Result<Self> {
        let labels: Vec<&str> = name.split('.').collect();
        if labels.len() < MIN_LABELS {
            return Err(Error::invalid_input(format!(
                "Domain '{}' needs at least {} labels",
                name, MIN_LABELS
            )));
        }

        let count = labels.len() - REGISTERED_LABELS;
        let rr = labels[..count].join(".");
        let domain = labels[count..].join(".");

        if rr.trim().is_empty() || domain.trim().is_empty() {
            return Err(Error::invalid_input(format!("Domain '{}' is malformed", name)));
        }

        Ok(Self { rr, domain })
    }
}

impl std::fmt::Display for SplitDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.rr, self.domain)
    }
}
