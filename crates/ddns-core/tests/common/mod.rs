//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal test doubles that record what the engine
//! asks of them without talking to any network.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{
    DnsProvider, DnsProviderFactory, IpResolver, Record, RecordRequest, RequestPeer,
};
use ddns_core::{
    DdnsConfig, DdnsEngine, DomainConfig, DomainConfigResolver, ProviderRegistry, UpdateRequest,
};
use std::sync::{Arc, Mutex};

pub const DOMAIN: &str = "home.example.com";
pub const TOKEN: &str = "s3cret-token";
pub const CALLER_IP: &str = "203.0.113.9";

/// How the mock provider answers `list_records()`
#[derive(Debug, Clone)]
pub enum ListBehavior {
    Records(Vec<Record>),
    Fail,
}

/// How the mock provider answers `add_record()` / `update_record()`
#[derive(Debug, Clone, Copy)]
pub enum WriteBehavior {
    Succeed,
    VendorRejects,
    Fail,
}

impl WriteBehavior {
    fn answer(self) -> Result<bool> {
        match self {
            WriteBehavior::Succeed => Ok(true),
            WriteBehavior::VendorRejects => Ok(false),
            WriteBehavior::Fail => Err(Error::http("connection reset")),
        }
    }
}

/// A provider call as seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    List {
        domain: String,
        record_type: String,
    },
    Add {
        request: RecordRequest,
        domain_name: String,
    },
    Update {
        request: RecordRequest,
        record_id: String,
    },
}

struct MockState {
    list: ListBehavior,
    write: WriteBehavior,
    calls: Mutex<Vec<ProviderCall>>,
    created: Mutex<usize>,
}

/// A mock DnsProvider that tracks calls
///
/// Clones share their call log, so a test can keep one handle and hand
/// the factory to the registry.
#[derive(Clone)]
pub struct MockDnsProvider {
    state: Arc<MockState>,
}

impl MockDnsProvider {
    pub fn new(list: ListBehavior, write: WriteBehavior) -> Self {
        Self {
            state: Arc::new(MockState {
                list,
                write,
                calls: Mutex::new(Vec::new()),
                created: Mutex::new(0),
            }),
        }
    }

    /// Provider without any existing record
    pub fn empty() -> Self {
        Self::new(ListBehavior::Records(Vec::new()), WriteBehavior::Succeed)
    }

    /// Provider with one existing record
    pub fn with_record(id: &str, value: &str) -> Self {
        Self::new(
            ListBehavior::Records(vec![Record::new(id, value)]),
            WriteBehavior::Succeed,
        )
    }

    /// All calls made so far
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state.calls.lock().unwrap().clone()
    }

    /// Calls other than `list_records()`
    pub fn write_calls(&self) -> Vec<ProviderCall> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, ProviderCall::List { .. }))
            .collect()
    }

    /// Number of provider instances the factory handed out
    pub fn created_count(&self) -> usize {
        *self.state.created.lock().unwrap()
    }

    fn record(&self, call: ProviderCall) {
        self.state.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_records(
        &self,
        _config: &DomainConfig,
        domain: &str,
        record_type: &str,
    ) -> Result<Vec<Record>> {
        self.record(ProviderCall::List {
            domain: domain.to_string(),
            record_type: record_type.to_string(),
        });

        match &self.state.list {
            ListBehavior::Records(records) => Ok(records.clone()),
            ListBehavior::Fail => Err(Error::provider("mock", "InvalidAccessKeyId.NotFound")),
        }
    }

    async fn add_record(
        &self,
        _config: &DomainConfig,
        request: &RecordRequest,
        domain_name: &str,
    ) -> Result<bool> {
        self.record(ProviderCall::Add {
            request: request.clone(),
            domain_name: domain_name.to_string(),
        });
        self.state.write.answer()
    }

    async fn update_record(
        &self,
        _config: &DomainConfig,
        request: &RecordRequest,
        record_id: &str,
    ) -> Result<bool> {
        self.record(ProviderCall::Update {
            request: request.clone(),
            record_id: record_id.to_string(),
        });
        self.state.write.answer()
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Factory handing out clones of one mock provider
pub struct MockFactory(pub MockDnsProvider);

impl DnsProviderFactory for MockFactory {
    fn create(&self) -> Result<Box<dyn DnsProvider>> {
        *self.0.state.created.lock().unwrap() += 1;
        Ok(Box::new(self.0.clone()))
    }
}

/// An IP resolver that always answers the same thing
pub struct FixedIpResolver {
    answer: Option<String>,
}

impl FixedIpResolver {
    pub fn new(ip: &str) -> Self {
        Self {
            answer: Some(ip.to_string()),
        }
    }

    /// Resolver that cannot determine any address
    pub fn failing() -> Self {
        Self { answer: None }
    }
}

#[async_trait::async_trait]
impl IpResolver for FixedIpResolver {
    async fn resolve(&self, _peer: &RequestPeer) -> Result<String> {
        self.answer
            .clone()
            .ok_or_else(|| Error::ip_source("no address"))
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Fully populated configuration of the test domain
pub fn domain_config() -> DomainConfig {
    DomainConfig::new("mock", "LTAIkey", "key-secret", TOKEN)
}

/// Configuration containing only the test domain
pub fn config_with(domain: DomainConfig) -> DdnsConfig {
    DdnsConfig::new().with_domain(DOMAIN, domain)
}

/// Engine wired with the given resolver, configuration and provider
pub fn engine_with(
    ip_resolver: impl IpResolver + 'static,
    config: DdnsConfig,
    provider: &MockDnsProvider,
) -> DdnsEngine {
    let registry = ProviderRegistry::new();
    registry.register_provider("mock", Box::new(MockFactory(provider.clone())));

    DdnsEngine::new(
        Arc::new(ip_resolver),
        DomainConfigResolver::uncached(Arc::new(config)),
        Arc::new(registry),
    )
}

/// Engine for the common case: fixed caller IP, valid configuration
pub fn engine(provider: &MockDnsProvider) -> DdnsEngine {
    engine_with(
        FixedIpResolver::new(CALLER_IP),
        config_with(domain_config()),
        provider,
    )
}

/// A valid request for the test domain
pub fn request() -> UpdateRequest {
    UpdateRequest::new(DOMAIN, TOKEN, RequestPeer::default())
}
