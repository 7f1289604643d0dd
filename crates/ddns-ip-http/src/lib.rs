// # HTTP Echo IP Resolver
//
// This crate provides an HTTP-based IP resolver for the DDNS system.
//
// ## Purpose
//
// During development the endpoint usually runs on a workstation, where the
// caller's socket address is a loopback or LAN address. This resolver asks
// an external echo service for the machine's public address instead.
//
// ## IMPORTANT: Development Only
//
// In production the caller IP comes from the request itself
// (`ddns_core::ForwardedIpResolver`). This resolver ignores the caller.
//
// ## Response Format
//
// The default service (`https://ip.tool.lu`) answers with text such as
// `当前IP: 203.0.113.9\r\n归属地: ...`. The body is split on `:` and `\r\n`,
// empty pieces are dropped and the second piece, trimmed, is the address.

use ddns_core::traits::{IpResolver, RequestPeer};
use ddns_core::{Error, Result};

use std::time::Duration;

/// Default echo service
pub const DEFAULT_ECHO_URL: &str = "https://ip.tool.lu";

/// Timeout for echo requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// IP resolver backed by an external echo service
#[derive(Debug, Clone)]
pub struct EchoIpResolver {
    /// URL to fetch the address from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl EchoIpResolver {
    /// Create a resolver for the given echo URL
    ///
    /// # Parameters
    ///
    /// - `url`: echo service answering in the `label: address` format
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Create a resolver for [`DEFAULT_ECHO_URL`]
    pub fn with_default_url() -> Result<Self> {
        Self::new(DEFAULT_ECHO_URL)
    }

    /// Echo service URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the echo body
    async fn fetch(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::ip_source(format!("Request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(Error::ip_source(format!(
                "{} answered HTTP {}",
                self.url,
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::ip_source(format!("Failed to read response: {}", e)))
    }
}

#[async_trait::async_trait]
impl IpResolver for EchoIpResolver {
    async fn resolve(&self, _peer: &RequestPeer) -> Result<String> {
        let body = self.fetch().await?;
        let ip = parse_echo_body(&body)?;
        tracing::debug!("Echo service {} reports {}", self.url, ip);
        Ok(ip)
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}

/// Extract the address from an echo service body
///
/// # Returns
///
/// - `Ok(String)`: the second non-empty piece, trimmed (may be empty)
/// - `Err(Error::IpSource)`: fewer than two pieces
pub fn parse_echo_body(body: &str) -> Result<String> {
    body.split("\r\n")
        .flat_map(|line| line.split(':'))
        .filter(|piece| !piece.is_empty())
        .nth(1)
        .map(|piece| piece.trim().to_string())
        .ok_or_else(|| Error::ip_source(format!("Unexpected echo response: {:?}", body)))
}
