// # Forwarded IP Resolver
//
// Resolves the caller IP when running behind a trusted reverse proxy.
//
// The first entry of `X-Forwarded-For` wins; without the header (or with a
// blank one) the transport-level remote address is used.

use async_trait::async_trait;

use crate::traits::ip_resolver::{IpResolver, RequestPeer};
use crate::Error;

/// IP resolver for production deployments behind a reverse proxy
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardedIpResolver;

impl ForwardedIpResolver {
    /// Create a new resolver
    pub fn new() -> Self {
        Self
    }

    /// First address of an `X-Forwarded-For` value, if any
    fn first_forwarded(header: &str) -> Option<&str> {
        header
            .split(',')
            .next()
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    }
}

#[async_trait]
impl IpResolver for ForwardedIpResolver {
    async fn resolve(&self, peer: &RequestPeer) -> Result<String, Error> {
        if let Some(ip) = peer.forwarded_for.as_deref().and_then(Self::first_forwarded) {
            return Ok(ip.to_string());
        }

        peer.remote_addr
            .map(|addr| addr.ip().to_string())
            .ok_or_else(|| Error::ip_source("No X-Forwarded-For header and no remote address"))
    }

    fn name(&self) -> &'static str {
        "forwarded"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    fn remote() -> SocketAddr {
        "10.0.0.7:51234".parse().unwrap()
    }

    #[tokio::test]
    async fn test_forwarded_header_wins_over_remote() {
        let resolver = ForwardedIpResolver::new();
        let peer = RequestPeer::new(Some("203.0.113.9".to_string()), Some(remote()));

        assert_eq!(resolver.resolve(&peer).await.unwrap(), "203.0.113.9");
    }

    #[tokio::test]
    async fn test_first_forwarded_entry_is_used() {
        let resolver = ForwardedIpResolver::new();
        let peer = RequestPeer::new(
            Some(" 203.0.113.9 , 198.51.100.1".to_string()),
            Some(remote()),
        );

        assert_eq!(resolver.resolve(&peer).await.unwrap(), "203.0.113.9");
    }

    #[tokio::test]
    async fn test_falls_back_to_remote_address() {
        let resolver = ForwardedIpResolver::new();

        let peer = RequestPeer::from_remote(remote());
        assert_eq!(resolver.resolve(&peer).await.unwrap(), "10.0.0.7");

        let blank_header = RequestPeer::new(Some("  ".to_string()), Some(remote()));
        assert_eq!(resolver.resolve(&blank_header).await.unwrap(), "10.0.0.7");
    }

    #[tokio::test]
    async fn test_unresolvable_peer() {
        let resolver = ForwardedIpResolver::new();
        assert!(resolver.resolve(&RequestPeer::default()).await.is_err());
    }
}
