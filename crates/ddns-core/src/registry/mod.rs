//! Plugin-based provider registry
//!
//! The registry maps provider names, as they appear in the `Provider` field of
//! a domain's configuration, to factories. It is populated once at startup;
//! there is no type scanning or other implicit discovery.
//!
//! ## Registration
//!
//! Provider crates expose a `register()` function:
//!
//! ```rust,ignore
//! // In ddns-provider-aliyun crate
//! pub fn register(registry: &ProviderRegistry) {
//!     registry.register_provider("aliyun", Box::new(AliyunFactory::new()));
//! }
//! ```

use crate::error::{Error, Result};
use crate::traits::{DnsProvider, DnsProviderFactory};
use std::collections::HashMap;
use std::sync::RwLock;

/// Provider registry for name-based DNS provider creation
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered DNS provider factories
    providers: RwLock<HashMap<String, Box<dyn DnsProviderFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a DNS provider factory
    ///
    /// Registering a name twice replaces the earlier factory.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use ddns_core::registry::ProviderRegistry;
    /// # use ddns_core::traits::DnsProviderFactory;
    /// # struct MyFactory;
    /// # impl DnsProviderFactory for MyFactory {
    /// #     fn create(&self) -> ddns_core::Result<Box<dyn ddns_core::DnsProvider>> { unimplemented!() }
    /// # }
    /// let registry = ProviderRegistry::new();
    /// registry.register_provider("myprovider", Box::new(MyFactory));
    /// ```
    pub fn register_provider(&self, name: impl Into<String>, factory: Box<dyn DnsProviderFactory>) {
        let name = name.into();
        let mut providers = self
            .providers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        providers.insert(name, factory);
    }

    /// Create a DNS provider by name
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsProvider>)`: Created provider instance
    /// - `Err(Error::NotImplemented)`: If no provider is registered under `name`
    pub fn create_provider(&self, name: &str) -> Result<Box<dyn DnsProvider>> {
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let factory = providers
            .get(name)
            .ok_or_else(|| Error::not_implemented(format!("Unknown provider type: {}", name)))?;

        factory.create()
    }

    /// List all registered provider names
    pub fn list_providers(&self) -> Vec<String> {
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut names: Vec<String> = providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a provider name is registered
    pub fn has_provider(&self, name: &str) -> bool {
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        providers.contains_key(name)
    }
}
