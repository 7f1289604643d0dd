//! Domain configuration lookup
//!
//! Finds the settings of a request domain in the static configuration,
//! behind a [`SlidingCache`] so that repeated updates for the same domain do
//! not re-read the source on every request.
//!
//! Unknown domains are cached too: the answer "not configured" is as stable
//! as any other answer from a static source. Expired entries, including
//! those of unknown domains, are swept by the cache on insert.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::SlidingCache;
use crate::config::{DdnsConfig, DomainConfig};

/// Default sliding window of the configuration cache
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// A read-only source of per-domain settings
pub trait ConfigSource: Send + Sync {
    /// Settings of a domain, or `None` when the domain is not configured
    fn domain(&self, name: &str) -> Option<DomainConfig>;
}

impl ConfigSource for DdnsConfig {
    fn domain(&self, name: &str) -> Option<DomainConfig> {
        DdnsConfig::domain(self, name).cloned()
    }
}

/// Cached domain configuration resolver
pub struct DomainConfigResolver {
    source: Arc<dyn ConfigSource>,
    cache: SlidingCache<String, Option<Arc<DomainConfig>>>,
}

impl DomainConfigResolver {
    /// Create a resolver with the given sliding cache window
    ///
    /// A zero window disables caching.
    pub fn new(source: Arc<dyn ConfigSource>, ttl: Duration) -> Self {
        Self {
            source,
            cache: SlidingCache::new(ttl),
        }
    }

    /// Create a resolver that reads the source on every lookup
    pub fn uncached(source: Arc<dyn ConfigSource>) -> Self {
        Self::new(source, Duration::ZERO)
    }

    /// Settings of a domain, or `None` when the domain is not configured
    pub async fn resolve(&self, domain: &str) -> Option<Arc<DomainConfig>> {
        let key = format!("DOMAIN_{}", domain.to_lowercase());
        let source = &self.source;

        self.cache
            .get_or_insert_with(key, || {
                debug!("Reading configuration of domain {}", domain);
                source.domain(domain).map(Arc::new)
            })
            .await
    }

    /// Access the underlying cache
    pub fn cache(&self) -> &SlidingCache<String, Option<Arc<DomainConfig>>> {
        &self.cache
    }
}
