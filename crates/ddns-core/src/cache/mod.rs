// # Cache Implementations
//
// The only shared mutable state of the system: a short-lived cache in front
// of configuration lookups. Caching never changes results, a miss re-reads
// the same static source.

pub mod memory;

pub use memory::SlidingCache;
