// # Aliyun DNS Provider
//
// This crate provides an Alibaba Cloud DNS (Alidns) provider implementation
// for the DDNS system.
//
// ## Behavior
//
// - One HTTP request per provider operation, no retries
// - Credentials are taken from the domain's configuration on every call,
//   so one provider instance serves all configured domains
// - Requests are signed with ACS3-HMAC-SHA256
// - HTTP timeouts: 10 seconds to connect, 30 seconds per request
//
// ## Error Policy
//
// - `list_records`: any failure is an `Err`
// - `add_record` / `update_record`: a vendor error body (`Code`/`Message`)
//   is `Ok(false)` with the raw payload logged; transport failures are `Err`
//
// ## Security Requirements
//
// - The access key secret NEVER appears in logs or error messages
// - Only the access key id is sent in clear (`Credential=`)
//
// ## API Reference
//
// - Endpoint: `https://alidns.cn-hangzhou.aliyuncs.com/`, version `2015-01-09`
// - `DescribeSubDomainRecords`: SubDomain, Type
// - `AddDomainRecord`: DomainName, RR, Type, Value, TTL, Priority
// - `UpdateDomainRecord`: RecordId, RR, Type, Value, TTL, Priority

mod error;
mod sign;
mod types;

use async_trait::async_trait;
use chrono::Utc;
use ddns_core::config::DomainConfig;
use ddns_core::traits::{DnsProvider, DnsProviderFactory, Record, RecordRequest};
use ddns_core::{Error, ProviderRegistry, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, info};

pub use error::AliyunError;
pub use sign::{EMPTY_BODY_SHA256, SIGNED_HEADERS};

use sign::SigningInput;
use types::{
    AddDomainRecordRequest, AddDomainRecordResponse, ApiErrorBody,
    DescribeSubDomainRecordsRequest, DescribeSubDomainRecordsResponse,
    UpdateDomainRecordRequest, UpdateDomainRecordResponse,
};

/// Name under which the provider is registered
pub const PROVIDER_NAME: &str = "aliyun";

/// Alidns API host
pub const ALIYUN_DNS_HOST: &str = "alidns.cn-hangzhou.aliyuncs.com";

/// Alidns API version
pub const ALIYUN_DNS_VERSION: &str = "2015-01-09";

/// Connect timeout for API requests
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall timeout for API requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Aliyun DNS provider
///
/// Cloning is cheap; clones share the HTTP connection pool.
#[derive(Debug, Clone)]
pub struct AliyunProvider {
    /// HTTP client for API requests
    client: reqwest::Client,

    /// Scheme and authority requests are sent to
    base_url: String,

    /// Host name covered by the signature
    host: String,
}

impl AliyunProvider {
    /// Create a provider talking to the public Alidns endpoint
    pub fn new() -> Result<Self> {
        Self::with_base_url(format!("https://{ALIYUN_DNS_HOST}"))
    }

    /// Create a provider talking to another endpoint
    ///
    /// The signed host stays [`ALIYUN_DNS_HOST`]; this is meant for proxies
    /// and test servers.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            host: ALIYUN_DNS_HOST.to_string(),
        })
    }

    /// Endpoint requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one signed RPC request
    ///
    /// # Returns
    ///
    /// - `Ok(T)`: the decoded success body
    /// - `Err(AliyunError::Api)`: the body carried `Code`/`Message`; the raw
    ///   payload has been logged
    /// - `Err(_)`: transport, status or decoding failure
    async fn request<P, T>(
        &self,
        config: &DomainConfig,
        action: &str,
        params: &P,
    ) -> std::result::Result<T, AliyunError>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let query_string = types::to_query_string(params)?;
        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let nonce = uuid::Uuid::new_v4().to_string();

        let authorization = sign::authorization(
            &config.access_key,
            &config.secret,
            &SigningInput {
                host: &self.host,
                action,
                version: ALIYUN_DNS_VERSION,
                query_string: &query_string,
                timestamp: &timestamp,
                nonce: &nonce,
            },
        )?;

        let url = if query_string.is_empty() {
            format!("{}/", self.base_url)
        } else {
            format!("{}/?{}", self.base_url, query_string)
        };

        debug!("Aliyun request: {} {}", action, url);

        let response = self
            .client
            .post(&url)
            .header("x-acs-action", action)
            .header("x-acs-version", ALIYUN_DNS_VERSION)
            .header("x-acs-date", &timestamp)
            .header("x-acs-signature-nonce", &nonce)
            .header("x-acs-content-sha256", EMPTY_BODY_SHA256)
            .header("Authorization", authorization)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // Vendor errors come with a Code on any status
        if let Ok(api_error) = serde_json::from_str::<ApiErrorBody>(&body) {
            error!("Aliyun {} failed: {}", action, body);
            return Err(AliyunError::Api {
                code: api_error.code,
                message: api_error.message,
            });
        }

        if !status.is_success() {
            return Err(AliyunError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Treat a vendor error as a refused write, anything else as a failure
    fn write_outcome<T>(action: &str, result: std::result::Result<T, AliyunError>) -> Result<bool> {
        match result {
            Ok(_) => Ok(true),
            Err(AliyunError::Api { code, .. }) => {
                debug!("Aliyun {} refused with {}", action, code);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl DnsProvider for AliyunProvider {
    /// List records via `DescribeSubDomainRecords`
    async fn list_records(
        &self,
        config: &DomainConfig,
        domain: &str,
        record_type: &str,
    ) -> Result<Vec<Record>> {
        let params = DescribeSubDomainRecordsRequest {
            sub_domain: domain,
            record_type,
        };

        let response: DescribeSubDomainRecordsResponse = self
            .request(config, "DescribeSubDomainRecords", &params)
            .await?;

        let records: Vec<Record> = response
            .domain_records
            .and_then(|wrapper| wrapper.record)
            .unwrap_or_default()
            .into_iter()
            .map(|record| Record::new(record.record_id, record.value))
            .collect();

        debug!(
            "Aliyun lists {} {} record(s) for {} (total {:?})",
            records.len(),
            record_type,
            domain,
            response.total_count
        );
        Ok(records)
    }

    /// Create a record via `AddDomainRecord`
    async fn add_record(
        &self,
        config: &DomainConfig,
        request: &RecordRequest,
        domain_name: &str,
    ) -> Result<bool> {
        let params = AddDomainRecordRequest {
            domain_name,
            rr: &request.rr,
            record_type: &request.record_type,
            value: &request.value,
            ttl: request.ttl,
            priority: request.priority,
        };

        let result: std::result::Result<AddDomainRecordResponse, _> =
            self.request(config, "AddDomainRecord", &params).await;
        if let Ok(response) = &result {
            info!(
                "Aliyun created record {} for {}.{}",
                response.record_id, request.rr, domain_name
            );
        }

        Self::write_outcome("AddDomainRecord", result)
    }

    /// Overwrite a record via `UpdateDomainRecord`
    async fn update_record(
        &self,
        config: &DomainConfig,
        request: &RecordRequest,
        record_id: &str,
    ) -> Result<bool> {
        let params = UpdateDomainRecordRequest {
            record_id,
            rr: &request.rr,
            record_type: &request.record_type,
            value: &request.value,
            ttl: request.ttl,
            priority: request.priority,
        };

        let result: std::result::Result<UpdateDomainRecordResponse, _> =
            self.request(config, "UpdateDomainRecord", &params).await;
        if let Ok(response) = &result {
            debug!("Aliyun updated record {:?}", response.record_id);
        }

        Self::write_outcome("UpdateDomainRecord", result)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating Aliyun providers
///
/// Every created provider shares the factory's HTTP client.
#[derive(Debug, Clone)]
pub struct AliyunFactory {
    provider: AliyunProvider,
}

impl AliyunFactory {
    /// Factory for the public Alidns endpoint
    pub fn new() -> Result<Self> {
        Ok(Self {
            provider: AliyunProvider::new()?,
        })
    }

    /// Factory for another endpoint
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            provider: AliyunProvider::with_base_url(base_url)?,
        })
    }
}

impl DnsProviderFactory for AliyunFactory {
    fn create(&self) -> Result<Box<dyn DnsProvider>> {
        Ok(Box::new(self.provider.clone()))
    }
}

/// Register the Aliyun provider with a registry
///
/// This function should be called during initialization to make the
/// `aliyun` provider name available.
///
/// # Example
///
/// ```rust,no_run
/// use ddns_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// ddns_provider_aliyun::register(&registry).unwrap();
/// assert!(registry.has_provider("aliyun"));
/// ```
pub fn register(registry: &ProviderRegistry) -> Result<()> {
    registry.register_provider(PROVIDER_NAME, Box::new(AliyunFactory::new()?));
    Ok(())
}
