//! Controllable HTTP clients shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;

use loadshape::{HttpClient, TransportError};

/// Shared call/in-flight counters so tests can keep a handle after the
/// client has been moved into a `LoadTester`.
#[derive(Clone, Default)]
pub struct CallStats {
    calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl CallStats {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Registers a call start and returns its zero-based index.
    fn enter(&self) -> usize {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        index
    }

    fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Answers 200 after a fixed delay.
pub struct FixedLatencyClient {
    pub latency: Duration,
    pub stats: CallStats,
}

impl FixedLatencyClient {
    pub fn new(latency: Duration) -> (Self, CallStats) {
        let stats = CallStats::default();
        (
            Self {
                latency,
                stats: stats.clone(),
            },
            stats,
        )
    }
}

#[async_trait]
impl HttpClient for FixedLatencyClient {
    async fn get(&self, _url: &str) -> Result<u16, TransportError> {
        self.stats.enter();
        tokio::time::sleep(self.latency).await;
        self.stats.exit();
        Ok(200)
    }
}

/// Answers instantly for the first `fast_calls` calls, then sleeps `slow`
/// before answering. Lets a stress test cross its threshold at a known round.
pub struct SlowAfterClient {
    pub fast_calls: usize,
    pub slow: Duration,
    pub stats: CallStats,
}

impl SlowAfterClient {
    pub fn new(fast_calls: usize, slow: Duration) -> (Self, CallStats) {
        let stats = CallStats::default();
        (
            Self {
                fast_calls,
                slow,
                stats: stats.clone(),
            },
            stats,
        )
    }
}

#[async_trait]
impl HttpClient for SlowAfterClient {
    async fn get(&self, _url: &str) -> Result<u16, TransportError> {
        let index = self.stats.enter();
        if index >= self.fast_calls {
            tokio::time::sleep(self.slow).await;
        }
        self.stats.exit();
        Ok(200)
    }
}

/// Holds every call at a barrier until `group_size` calls are in flight.
///
/// A round smaller than `group_size` never gets past the barrier, so tests
/// should wrap runs in `tokio::time::timeout`.
pub struct GatedClient {
    barrier: Barrier,
    pub stats: CallStats,
}

impl GatedClient {
    pub fn new(group_size: usize) -> (Self, CallStats) {
        let stats = CallStats::default();
        (
            Self {
                barrier: Barrier::new(group_size),
                stats: stats.clone(),
            },
            stats,
        )
    }
}

#[async_trait]
impl HttpClient for GatedClient {
    async fn get(&self, _url: &str) -> Result<u16, TransportError> {
        self.stats.enter();
        self.barrier.wait().await;
        self.stats.exit();
        Ok(200)
    }
}

/// Fails every call whose index satisfies `fails(index)`, alternating
/// between a 500 status and a transport failure.
pub struct FlakyClient {
    fails: fn(usize) -> bool,
    pub stats: CallStats,
}

impl FlakyClient {
    pub fn new(fails: fn(usize) -> bool) -> (Self, CallStats) {
        let stats = CallStats::default();
        (
            Self {
                fails,
                stats: stats.clone(),
            },
            stats,
        )
    }
}

#[async_trait]
impl HttpClient for FlakyClient {
    async fn get(&self, _url: &str) -> Result<u16, TransportError> {
        let index = self.stats.enter();
        tokio::task::yield_now().await;
        self.stats.exit();
        if !(self.fails)(index) {
            Ok(200)
        } else if index % 2 == 0 {
            Ok(500)
        } else {
            Err(TransportError::Connection {
                message: "connection reset".to_string(),
            })
        }
    }
}

/// Answers after `sequential` when called directly from the test body and
/// after `concurrent` when called from a spawned task, so sequential and
/// concurrent runs sharing one tester have distinct latencies.
pub struct SplitLatencyClient {
    sequential: Duration,
    concurrent: Duration,
    pub stats: CallStats,
}

impl SplitLatencyClient {
    pub fn new(sequential: Duration, concurrent: Duration) -> (Self, CallStats) {
        let stats = CallStats::default();
        (
            Self {
                sequential,
                concurrent,
                stats: stats.clone(),
            },
            stats,
        )
    }
}

#[async_trait]
impl HttpClient for SplitLatencyClient {
    async fn get(&self, _url: &str) -> Result<u16, TransportError> {
        self.stats.enter();
        let latency = if tokio::task::try_id().is_some() {
            self.concurrent
        } else {
            self.sequential
        };
        tokio::time::sleep(latency).await;
        self.stats.exit();
        Ok(200)
    }
}
