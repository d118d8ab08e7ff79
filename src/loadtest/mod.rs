//! HTTP load testing engine.
//!
//! Provides a pluggable HTTP client, a concurrency-safe result store, the
//! single-request executor, five traffic-shape policies, typed TOML
//! configuration, and a terminal summary renderer.

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod summary;

#[cfg(test)]
pub(crate) mod testing;
