//! NIP resolution library
//!
//! Validates Polish tax identifiers and resolves them to company data through
//! an ordered chain of interchangeable providers, with an expiring cache in front.

pub mod config;
pub mod core;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;

// Re-export main types
pub use config::ResolverConfig;
pub use crate::core::NipResolver;
pub use error::{CacheError, ProviderError, ProviderResult, ResolverError, ResolverResult};
pub use traits::*;
