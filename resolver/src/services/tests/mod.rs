//! Tests for resolver services
//!
//! HTTP-backed providers are exercised against wiremock servers; the
//! in-process services are tested directly.
