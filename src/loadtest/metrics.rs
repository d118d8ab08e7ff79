//! Measurement storage and run analysis.
//!
//! [`ResultStore`] is the only shared mutable state of a load test. Every
//! executor task appends to it concurrently; the driver reads it after each
//! barrier. Appending a measurement and bumping the error counter happen
//! under one lock, so readers never observe a counter that disagrees with
//! the measurement list.

use parking_lot::Mutex;
use std::fmt;
use std::time::Duration;

use crate::loadtest::error::TransportError;

/// Classification of a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The server answered 200.
    Success,
    /// The server answered with any status other than 200.
    UnexpectedStatus(u16),
    /// No response was received.
    Failure(TransportError),
}

impl Outcome {
    /// Returns `true` for outcomes that count toward the error counter.
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Success)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::UnexpectedStatus(code) => write!(f, "status {code}"),
            Self::Failure(err) => write!(f, "failure ({err})"),
        }
    }
}

/// One timed request.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Wall-clock time from just before the GET until it resolved, in seconds.
    pub elapsed_secs: f64,
    /// How the request ended.
    pub outcome: Outcome,
}

impl Measurement {
    /// Create a measurement from a [`Duration`].
    pub fn new(elapsed: Duration, outcome: Outcome) -> Self {
        Self {
            elapsed_secs: elapsed.as_secs_f64(),
            outcome,
        }
    }
}

/// Append-only sequence of measurements plus the error counter.
///
/// Order is completion order, not launch order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    measurements: Vec<Measurement>,
    errors: u64,
}

impl ResultSet {
    /// Creates an empty result set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a measurement, incrementing the error counter for error outcomes.
    pub fn record(&mut self, measurement: Measurement) {
        if measurement.outcome.is_error() {
            self.errors += 1;
        }
        self.measurements.push(measurement);
    }

    /// All measurements in completion order.
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Number of recorded measurements.
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    /// Returns `true` when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Number of non-200 and failed requests recorded.
    pub fn error_count(&self) -> u64 {
        self.errors
    }

    /// Mean elapsed time over every measurement, `0.0` when empty.
    pub fn mean_latency_secs(&self) -> f64 {
        mean_latency(&self.measurements)
    }
}

/// Mean elapsed time of `measurements` in seconds, `0.0` when empty.
pub fn mean_latency(measurements: &[Measurement]) -> f64 {
    if measurements.is_empty() {
        return 0.0;
    }
    let total: f64 = measurements.iter().map(|m| m.elapsed_secs).sum();
    total / measurements.len() as f64
}

/// Thread-safe wrapper around [`ResultSet`] shared by all executor tasks.
#[derive(Debug, Default)]
pub struct ResultStore {
    inner: Mutex<ResultSet>,
}

impl ResultStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically appends a measurement (and bumps the error counter if needed).
    pub fn record(&self, measurement: Measurement) {
        self.inner.lock().record(measurement);
    }

    /// Number of recorded measurements.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns `true` when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Current value of the error counter.
    pub fn error_count(&self) -> u64 {
        self.inner.lock().error_count()
    }

    /// Consistent copy of the current result set.
    pub fn snapshot(&self) -> ResultSet {
        self.inner.lock().clone()
    }

    /// Analyze the current contents under a single lock.
    pub fn analyze(&self) -> Analysis {
        analyze(&self.inner.lock())
    }

    /// Discard every measurement and reset the error counter.
    pub fn clear(&self) {
        *self.inner.lock() = ResultSet::new();
    }
}

/// Aggregate statistics reported at the end of every run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Analysis {
    /// Mean elapsed time across every measurement recorded so far (seconds).
    pub mean_latency_secs: f64,
    /// Total non-200 and failed requests.
    pub error_count: u64,
    /// Total measurements recorded.
    pub total_requests: usize,
}

/// Summarize a result set and emit the summary as info-level events.
pub fn analyze(results: &ResultSet) -> Analysis {
    let analysis = Analysis {
        mean_latency_secs: results.mean_latency_secs(),
        error_count: results.error_count(),
        total_requests: results.len(),
    };
    tracing::info!(
        mean_latency_secs = analysis.mean_latency_secs,
        "Average Response Time: {:.2} seconds",
        analysis.mean_latency_secs
    );
    tracing::info!(
        error_count = analysis.error_count,
        "Total Errors: {}",
        analysis.error_count
    );
    analysis
}
