//! Core traits for the DDNS system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpResolver`]: Determine the caller's IP address
//! - [`DnsProvider`]: Read and write DNS records via provider APIs

pub mod dns_provider;
pub mod ip_resolver;

pub use dns_provider::{DnsProvider, DnsProviderFactory, Record, RecordRequest};
pub use ip_resolver::{IpResolver, RequestPeer};
