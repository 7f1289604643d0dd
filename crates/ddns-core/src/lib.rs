// # ddns-core
//
// Core library for the DDNS update endpoint.
//
// ## Architecture Overview
//
// A caller asks `GET /domains/{domain}?token={token}`; the endpoint makes the
// domain's A record point at the caller's IP. This library holds everything
// except the HTTP server and the concrete providers:
// - **IpResolver**: Trait for determining the caller's IP address
// - **DnsProvider**: Trait for listing, adding and updating DNS records
// - **DomainConfigResolver**: Cached lookup of per-domain settings
// - **ProviderRegistry**: Name-based registry of DNS providers
// - **DdnsEngine**: Validates a request and drives the provider calls
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Plugin-Based**: Providers are registered by name, no hard-coded if-else
// 3. **Library-First**: The request flow runs without any HTTP framework
// 4. **Stateless Requests**: Nothing outlives a request except the config cache

pub mod traits;
pub mod engine;
pub mod registry;
pub mod config;
pub mod error;
pub mod cache;
pub mod domain;
pub mod ip;
pub mod resolver;

// Re-export core types for convenience
pub use traits::{DnsProvider, DnsProviderFactory, IpResolver, Record, RecordRequest, RequestPeer};
pub use engine::{DdnsEngine, RejectStatus, Rejection, UpdateOutcome, UpdateRequest};
pub use registry::ProviderRegistry;
pub use config::{DdnsConfig, DomainConfig, Environment};
pub use error::{Error, Result};
pub use cache::SlidingCache;
pub use domain::SplitDomain;
pub use ip::ForwardedIpResolver;
pub use resolver::{ConfigSource, DomainConfigResolver};
