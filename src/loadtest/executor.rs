//! Single-request executor and concurrent round dispatch.
//!
//! [`RequestExecutor`] times one GET, classifies it, and appends the result to
//! the shared [`ResultStore`]. Per-request errors stop here: they are counted
//! and logged, never returned to the driver.
//!
//! [`RequestExecutor::dispatch_round`] fans a round out as independent tokio
//! tasks on a [`TaskTracker`] and waits for every one of them before
//! returning.

use std::sync::Arc;
use std::time::Instant;
use tokio_util::task::TaskTracker;

use crate::loadtest::client::HttpClient;
use crate::loadtest::metrics::{Measurement, Outcome, ResultStore};

/// Status code treated as success. Every other code counts as an error.
const SUCCESS_STATUS: u16 = 200;

/// Cheap-to-clone handle bundling everything one request needs.
pub struct RequestExecutor<C: HttpClient> {
    client: Arc<C>,
    target: Arc<str>,
    results: Arc<ResultStore>,
}

impl<C: HttpClient> Clone for RequestExecutor<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            target: Arc::clone(&self.target),
            results: Arc::clone(&self.results),
        }
    }
}

impl<C: HttpClient> RequestExecutor<C> {
    /// Creates an executor for `target` that records into `results`.
    pub fn new(client: Arc<C>, target: Arc<str>, results: Arc<ResultStore>) -> Self {
        Self {
            client,
            target,
            results,
        }
    }

    /// The URL every request is sent to.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Perform one timed GET and record it.
    ///
    /// Elapsed time is recorded whatever the outcome, including the time spent
    /// before a transport failure or timeout.
    pub async fn execute(&self) -> Measurement {
        let start = Instant::now();
        let result = self.client.get(&self.target).await;
        let elapsed = start.elapsed();

        let outcome = match result {
            Ok(SUCCESS_STATUS) => Outcome::Success,
            Ok(status) => {
                tracing::warn!(status, "Received {} status code", status);
                Outcome::UnexpectedStatus(status)
            },
            Err(err) => {
                tracing::warn!(
                    category = err.error_category(),
                    "Request failed: {}",
                    err
                );
                Outcome::Failure(err)
            },
        };

        let measurement = Measurement::new(elapsed, outcome);
        self.results.record(measurement.clone());
        measurement
    }

    /// Launch `count` requests as independent tasks and wait for all of them.
    ///
    /// Returns only once every task has finished. The returned measurements
    /// are exactly this round's, in launch order; other runs appending to the
    /// shared store concurrently do not leak in. A task
    /// that panics records nothing and is logged at error level.
    pub async fn dispatch_round(&self, count: usize) -> Vec<Measurement> {
        if count == 0 {
            return Vec::new();
        }
        let tracker = TaskTracker::new();
        let handles: Vec<_> = (0..count)
            .map(|_| {
                let executor = self.clone();
                tracker.spawn(async move { executor.execute().await })
            })
            .collect();
        tracker.close();

        let mut measurements = Vec::with_capacity(count);
        for handle in handles {
            match handle.await {
                Ok(measurement) => measurements.push(measurement),
                Err(err) if err.is_panic() => {
                    tracing::error!(target_url = %self.target, "Request task panicked: {}", err);
                },
                Err(err) => {
                    tracing::error!(target_url = %self.target, "Request task cancelled: {}", err);
                },
            }
        }
        tracker.wait().await;
        measurements
    }
}
