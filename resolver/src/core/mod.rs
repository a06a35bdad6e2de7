//! Resolver core business logic

pub mod resolver;

pub use resolver::NipResolver;
