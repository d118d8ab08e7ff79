//! # loadshape
//!
//! HTTP load generator. A [`LoadTester`] sends GET requests to one target
//! under a chosen traffic shape and reports mean latency and error count:
//!
//! - [`LoadTester::volume`]: fixed number of sequential requests
//! - [`LoadTester::stress`]: growing concurrent rounds until latency exceeds a threshold
//! - [`LoadTester::soak`]: sequential requests for a fixed wall-clock duration
//! - [`LoadTester::spike`]: repeated concurrent bursts separated by pauses
//! - [`LoadTester::concurrency`]: one concurrent burst
//!
//! ```rust,no_run
//! use loadshape::LoadTester;
//!
//! # async fn run() -> Result<(), loadshape::LoadTestError> {
//! let tester = LoadTester::new("http://localhost:8080/health")?;
//! let analysis = tester.stress(2.0, 10).await?;
//! println!("mean {:.2}s, {} errors", analysis.mean_latency_secs, analysis.error_count);
//! # Ok(())
//! # }
//! ```

pub mod loadtest;

pub use loadtest::client::{HttpClient, ReqwestClient};
pub use loadtest::config::{LoadTesterConfig, Settings};
pub use loadtest::engine::{LoadTester, StressRound};
pub use loadtest::error::{LoadTestError, TransportError};
pub use loadtest::metrics::{analyze, mean_latency, Analysis, Measurement, Outcome, ResultSet};
