//! Resolver service implementations

pub mod commercial_provider;
pub mod lookup_stats;
pub mod manual_provider;
pub mod memory_cache;
pub mod registry_provider;

#[cfg(test)]
pub mod tests;

pub use commercial_provider::*;
pub use lookup_stats::*;
pub use manual_provider::*;
pub use memory_cache::*;
pub use registry_provider::*;
