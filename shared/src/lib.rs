//! Shared types for the NIP resolution system
//!
//! Contains the domain types exchanged between the resolver and its callers,
//! the pure checksum validator, and the tracing bootstrap.

pub mod errors;
pub mod logging;
pub mod nip;
pub mod types;

pub use errors::*;
pub use nip::{ValidationFailure, format_nip, is_test_nip, normalize};
pub use types::*;
