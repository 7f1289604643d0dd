// # IP Resolver Implementations
//
// Resolvers that need nothing but the request itself. The development-mode
// resolver that calls out to an IP-echo service lives in `ddns-ip-http`.

pub mod forwarded;

pub use forwarded::ForwardedIpResolver;
