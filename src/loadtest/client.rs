//! HTTP client capability used by the request executor.
//!
//! The executor only needs "GET a URL, give me the status code or a transport
//! failure". [`HttpClient`] captures that seam so tests can inject a
//! controllable client; [`ReqwestClient`] is the production implementation.

use async_trait::async_trait;
use std::time::Duration;

use crate::loadtest::error::{LoadTestError, TransportError};

/// Minimal HTTP capability consumed by the executor.
///
/// Implementations own their timeout policy. A request that never resolves
/// blocks its dispatch round, so production clients must set one.
#[async_trait]
pub trait HttpClient: Send + Sync + 'static {
    /// Issue a GET against `url`, returning the response status code.
    async fn get(&self, url: &str) -> Result<u16, TransportError>;
}

/// [`HttpClient`] backed by a shared [`reqwest::Client`] connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    /// Build a client whose requests fail with [`TransportError::Timeout`]
    /// after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, LoadTestError> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LoadTestError::ClientBuild {
                message: e.to_string(),
            })?;
        Ok(Self { inner })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<u16, TransportError> {
        let response = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::classify_reqwest(&e))?;
        let status = response.status().as_u16();
        // Measured time covers the full response body.
        response
            .bytes()
            .await
            .map_err(|e| TransportError::classify_reqwest(&e))?;
        Ok(status)
    }
}
