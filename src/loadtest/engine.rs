//! Load pattern driver.
//!
//! [`LoadTester`] owns one target, one HTTP client, and one [`ResultStore`],
//! and runs one of five traffic shapes against them:
//!
//! - **Volume**: a fixed number of sequential requests
//! - **Stress**: concurrent rounds growing by `step` until a round's mean
//!   latency exceeds a threshold
//! - **Soak**: sequential requests until a wall-clock deadline
//! - **Spike**: repeated fixed-size concurrent bursts separated by pauses
//! - **Concurrency**: a single concurrent burst
//!
//! Concurrent rounds are strict barriers: every request of a round completes
//! before the round's mean is taken or the next round starts. A stress round's
//! mean is computed from that round's own measurements, so other runs sharing
//! the tester cannot skew it. Every policy ends with
//! [`analyze`](crate::loadtest::metrics::analyze) over everything recorded on
//! this tester so far.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::loadtest::client::{HttpClient, ReqwestClient};
use crate::loadtest::config::LoadTesterConfig;
use crate::loadtest::error::LoadTestError;
use crate::loadtest::executor::RequestExecutor;
use crate::loadtest::metrics::{mean_latency, Analysis, ResultSet, ResultStore};

/// One completed stress round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressRound {
    /// Number of concurrent requests dispatched in this round.
    pub concurrency: usize,
    /// Mean latency of exactly this round's requests (seconds).
    pub mean_latency_secs: f64,
}

/// Load tester bound to a single target URL.
pub struct LoadTester<C: HttpClient = ReqwestClient> {
    executor: RequestExecutor<C>,
    results: Arc<ResultStore>,
    config: LoadTesterConfig,
    stress_rounds: Mutex<Vec<StressRound>>,
}

impl LoadTester<ReqwestClient> {
    /// Creates a tester for `target_url` with the default configuration.
    pub fn new(target_url: &str) -> Result<Self, LoadTestError> {
        Self::with_config(target_url, LoadTesterConfig::default())
    }

    /// Creates a tester whose reqwest client uses `config`'s timeout.
    pub fn with_config(target_url: &str, config: LoadTesterConfig) -> Result<Self, LoadTestError> {
        config.validate()?;
        let client = ReqwestClient::new(config.settings.timeout_as_duration())?;
        Self::with_client(target_url, client, config)
    }
}

impl<C: HttpClient> LoadTester<C> {
    /// Creates a tester that issues requests through `client`.
    pub fn with_client(
        target_url: &str,
        client: C,
        config: LoadTesterConfig,
    ) -> Result<Self, LoadTestError> {
        config.validate()?;
        validate_target(target_url)?;
        let results = Arc::new(ResultStore::new());
        let executor = RequestExecutor::new(
            Arc::new(client),
            Arc::from(target_url),
            Arc::clone(&results),
        );
        Ok(Self {
            executor,
            results,
            config,
            stress_rounds: Mutex::new(Vec::new()),
        })
    }

    /// The URL under test.
    pub fn target(&self) -> &str {
        self.executor.target()
    }

    /// Returns a reference to the tester's configuration.
    pub fn config(&self) -> &LoadTesterConfig {
        &self.config
    }

    /// Snapshot of every measurement recorded on this tester.
    pub fn results(&self) -> ResultSet {
        self.results.snapshot()
    }

    /// Rounds completed by stress runs on this tester, oldest first.
    pub fn stress_rounds(&self) -> Vec<StressRound> {
        self.stress_rounds.lock().clone()
    }

    /// Discards all recorded measurements and stress round history.
    pub fn reset(&self) {
        self.results.clear();
        self.stress_rounds.lock().clear();
    }

    /// Sends `n_requests` requests one after another.
    pub async fn volume(&self, n_requests: usize) -> Result<Analysis, LoadTestError> {
        tracing::info!(target_url = %self.target(), n_requests, "Starting volume test");
        for _ in 0..n_requests {
            self.executor.execute().await;
        }
        Ok(self.results.analyze())
    }

    /// Stress test using the configured default step.
    pub async fn stress_default(&self, threshold_time: f64) -> Result<Analysis, LoadTestError> {
        self.stress(threshold_time, self.config.settings.stress_step)
            .await
    }

    /// Ramps concurrency by `step` per round until a round's mean latency
    /// exceeds `threshold_time` seconds.
    ///
    /// Without `stress_max_rounds` in the config there is no round limit: an
    /// endpoint that never slows past the threshold keeps the ramp growing.
    pub async fn stress(&self, threshold_time: f64, step: usize) -> Result<Analysis, LoadTestError> {
        if step == 0 {
            return Err(LoadTestError::invalid_argument(
                "stress step must be greater than 0",
            ));
        }
        if !threshold_time.is_finite() || threshold_time < 0.0 {
            return Err(LoadTestError::invalid_argument(format!(
                "stress threshold_time must be a non-negative number of seconds, got {threshold_time}"
            )));
        }

        let max_rounds = self.config.settings.stress_max_rounds;
        tracing::info!(
            target_url = %self.target(),
            threshold_time,
            step,
            ?max_rounds,
            "Starting stress test"
        );

        let mut concurrency = 0usize;
        let mut rounds = 0u32;
        loop {
            concurrency = match next_round_size(concurrency, step) {
                Some(next) => next,
                None => {
                    tracing::warn!(
                        rounds,
                        concurrency,
                        step,
                        "Stress ramp cannot grow further, stopping before threshold was exceeded"
                    );
                    break;
                },
            };
            let round = self.executor.dispatch_round(concurrency).await;
            rounds += 1;

            let mean = mean_latency(&round);
            self.stress_rounds.lock().push(StressRound {
                concurrency,
                mean_latency_secs: mean,
            });
            tracing::info!(
                round = rounds,
                concurrency,
                mean_latency_secs = mean,
                "Stress round complete"
            );

            if mean > threshold_time {
                tracing::info!(
                    concurrency,
                    "Mean response time {:.2}s exceeded threshold {:.2}s",
                    mean,
                    threshold_time
                );
                break;
            }
            if max_rounds.is_some_and(|max| rounds >= max) {
                tracing::warn!(
                    rounds,
                    concurrency,
                    "Stress round limit reached before threshold was exceeded"
                );
                break;
            }
        }

        Ok(self.results.analyze())
    }

    /// Sends sequential requests for `duration_minutes` minutes.
    pub async fn soak(&self, duration_minutes: u64) -> Result<Analysis, LoadTestError> {
        let secs = duration_minutes.checked_mul(60).ok_or_else(|| {
            LoadTestError::invalid_argument(format!(
                "soak duration of {duration_minutes} minutes is too large"
            ))
        })?;
        self.soak_for(Duration::from_secs(secs)).await
    }

    /// Sends sequential requests until `duration` has elapsed.
    ///
    /// The deadline is checked before each request, so the last request may
    /// finish after it.
    pub async fn soak_for(&self, duration: Duration) -> Result<Analysis, LoadTestError> {
        let deadline = Instant::now().checked_add(duration).ok_or_else(|| {
            LoadTestError::invalid_argument(format!("soak duration {duration:?} is too large"))
        })?;
        tracing::info!(target_url = %self.target(), ?duration, "Starting soak test");

        let mut sent = 0u64;
        while Instant::now() < deadline {
            self.executor.execute().await;
            sent += 1;
        }
        tracing::debug!(sent, "Soak deadline reached");

        Ok(self.results.analyze())
    }

    /// Spike test using the configured default delay.
    pub async fn spike_default(&self, spikes: usize) -> Result<Analysis, LoadTestError> {
        self.spike(spikes, self.config.settings.spike_delay_secs)
            .await
    }

    /// Fires `spikes` bursts of `spike_burst_size` concurrent requests,
    /// pausing `delay_between_spikes` seconds after each burst (including
    /// the last).
    pub async fn spike(
        &self,
        spikes: usize,
        delay_between_spikes: f64,
    ) -> Result<Analysis, LoadTestError> {
        if !delay_between_spikes.is_finite() || delay_between_spikes < 0.0 {
            return Err(LoadTestError::invalid_argument(format!(
                "delay_between_spikes must be a non-negative number of seconds, got {delay_between_spikes}"
            )));
        }
        let delay = Duration::try_from_secs_f64(delay_between_spikes).map_err(|e| {
            LoadTestError::invalid_argument(format!("delay_between_spikes: {e}"))
        })?;
        let burst_size = self.config.settings.spike_burst_size;
        tracing::info!(
            target_url = %self.target(),
            spikes,
            burst_size,
            ?delay,
            "Starting spike test"
        );

        for spike in 1..=spikes {
            self.executor.dispatch_round(burst_size).await;
            tracing::info!(spike, spikes, "Spike complete");
            tokio::time::sleep(delay).await;
        }

        Ok(self.results.analyze())
    }

    /// Sends `n_concurrent_requests` requests at once and waits for all of them.
    pub async fn concurrency(&self, n_concurrent_requests: usize) -> Result<Analysis, LoadTestError> {
        tracing::info!(
            target_url = %self.target(),
            n_concurrent_requests,
            "Starting concurrency test"
        );
        self.executor.dispatch_round(n_concurrent_requests).await;
        Ok(self.results.analyze())
    }
}

/// Size of the next stress round, `None` once the ramp would overflow.
fn next_round_size(current: usize, step: usize) -> Option<usize> {
    current.checked_add(step)
}

fn validate_target(target_url: &str) -> Result<(), LoadTestError> {
    let parsed = url::Url::parse(target_url).map_err(|e| LoadTestError::InvalidTarget {
        url: target_url.to_string(),
        message: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(LoadTestError::InvalidTarget {
            url: target_url.to_string(),
            message: format!("unsupported scheme '{other}'"),
        }),
    }
}
