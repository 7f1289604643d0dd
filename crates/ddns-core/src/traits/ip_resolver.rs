// # IP Resolver Trait
//
// Defines the interface for determining the IP address of the caller that
// asked for a DNS update.
//
// ## Implementations
//
// - `X-Forwarded-For` / remote address: `ddns_core::ip::ForwardedIpResolver`
// - External IP-echo service (development): `ddns-ip-http` crate

use async_trait::async_trait;
use std::net::SocketAddr;

/// What the HTTP layer knows about the caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestPeer {
    /// Raw `X-Forwarded-For` header value, if present
    pub forwarded_for: Option<String>,
    /// Transport-level remote address, if known
    pub remote_addr: Option<SocketAddr>,
}

impl RequestPeer {
    /// Create a peer description
    pub fn new(forwarded_for: Option<String>, remote_addr: Option<SocketAddr>) -> Self {
        Self {
            forwarded_for,
            remote_addr,
        }
    }

    /// A peer known only by its remote address
    pub fn from_remote(remote_addr: SocketAddr) -> Self {
        Self::new(None, Some(remote_addr))
    }
}

/// Trait for IP resolver implementations
///
/// Implementations must be thread-safe; one instance serves all requests.
/// The returned value is used verbatim as the record value, no parsing or
/// validation is applied.
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Determine the caller's IP address
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: the IP address text (may be blank if the source was)
    /// - `Err(Error)`: if no address could be determined
    async fn resolve(&self, peer: &RequestPeer) -> Result<String, crate::Error>;

    /// Short name for logging
    fn name(&self) -> &'static str;
}
