// # DNS Provider Trait
//
// Defines the interface for reading and writing DNS records via provider APIs.
//
// ## Implementations
//
// - Aliyun: `ddns-provider-aliyun` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{DnsProvider, DomainConfig, RecordRequest};
//
// async fn sync(provider: &dyn DnsProvider, config: &DomainConfig) -> ddns_core::Result<()> {
//     let records = provider.list_records(config, "home.example.com", "A").await?;
//     if records.is_empty() {
//         let request = RecordRequest::a_record("home", "1.2.3.4");
//         provider.add_record(config, &request, "example.com").await?;
//     }
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::config::DomainConfig;

/// An existing DNS record as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Provider-assigned record id
    pub id: String,
    /// Record value (the IP address for A records)
    pub value: String,
}

impl Record {
    /// Create a record
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }
}

/// Parameters of a record write (add or update)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRequest {
    /// Record priority
    pub priority: u32,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Record type, e.g. "A"
    pub record_type: String,
    /// Record value
    pub value: String,
    /// Resource record prefix
    pub rr: String,
}

impl RecordRequest {
    /// Priority used for every record the endpoint writes
    pub const DEFAULT_PRIORITY: u32 = 5;

    /// TTL used for every record the endpoint writes
    pub const DEFAULT_TTL: u32 = 600;

    /// The only record type the endpoint manages
    pub const A: &'static str = "A";

    /// An A record write with the default priority and TTL
    pub fn a_record(rr: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            priority: Self::DEFAULT_PRIORITY,
            ttl: Self::DEFAULT_TTL,
            record_type: Self::A.to_string(),
            value: value.into(),
            rr: rr.into(),
        }
    }
}

/// Trait for DNS provider implementations
///
/// Providers are stateless: every operation receives the domain's
/// credentials and performs a single round trip to the vendor API.
/// They never retry; a failure is reported to the caller as is.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List the records of one type on a (sub)domain
    ///
    /// # Parameters
    ///
    /// - `config`: credentials of the domain
    /// - `domain`: the full domain name (e.g. "home.example.com")
    /// - `record_type`: record type filter (e.g. "A")
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Record>)`: possibly empty when the vendor reports no records
    /// - `Err(Error)`: transport, authentication or vendor failure
    async fn list_records(
        &self,
        config: &DomainConfig,
        domain: &str,
        record_type: &str,
    ) -> Result<Vec<Record>, crate::Error>;

    /// Create a record under a registered domain
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: the vendor reported success
    /// - `Ok(false)`: the vendor rejected the request (its raw payload is logged)
    /// - `Err(Error)`: the request could not be performed
    async fn add_record(
        &self,
        config: &DomainConfig,
        request: &RecordRequest,
        domain_name: &str,
    ) -> Result<bool, crate::Error>;

    /// Change an existing record by its provider-assigned id
    ///
    /// Same success contract as [`DnsProvider::add_record`].
    async fn update_record(
        &self,
        config: &DomainConfig,
        request: &RecordRequest,
        record_id: &str,
    ) -> Result<bool, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance
    fn create(&self) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
