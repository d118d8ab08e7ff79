//! Terminal summary renderer for load test results.
//!
//! [`render_summary`] is a pure function: it takes the run's [`Analysis`] and
//! returns a formatted [`String`]. Color is applied via the `colored` crate,
//! which respects `colored::control::set_override(false)` when `--no-color`
//! is active or stdout is piped.

use colored::Colorize;
use std::time::Duration;

use crate::loadtest::engine::StressRound;
use crate::loadtest::metrics::Analysis;

/// Width for dotted metric row padding.
const PAD_WIDTH: usize = 32;

/// Mean latency above this many seconds is highlighted in yellow.
const SLOW_MEAN_SECS: f64 = 1.0;

/// Render the end-of-run summary.
///
/// # Layout
///
/// ```text
///   loadshape stress
///   target: http://localhost:8080/
///
///   http_req_total..................: 60
///   http_req_errors.................: 2
///   http_req_mean_latency...........: 0.21s
///   http_req_elapsed................: 4.2s
/// ```
pub fn render_summary(analysis: &Analysis, policy: &str, url: &str, elapsed: Duration) -> String {
    let mut lines = Vec::new();

    lines.push(String::new());
    lines.push(format!("  {}", format!("loadshape {policy}").bold()));
    lines.push(format!("  target: {url}"));
    lines.push(String::new());

    lines.push(format_metric_row(
        "http_req_total",
        &analysis.total_requests.to_string(),
        PAD_WIDTH,
    ));

    let errors = analysis.error_count.to_string();
    let errors = if analysis.error_count > 0 {
        errors.red().to_string()
    } else {
        errors.green().to_string()
    };
    lines.push(format_metric_row("http_req_errors", &errors, PAD_WIDTH));

    let mean = format!("{:.2}s", analysis.mean_latency_secs);
    let mean = if analysis.mean_latency_secs > SLOW_MEAN_SECS {
        mean.yellow().to_string()
    } else {
        mean.green().to_string()
    };
    lines.push(format_metric_row("http_req_mean_latency", &mean, PAD_WIDTH));

    lines.push(format_metric_row(
        "http_req_elapsed",
        &format!("{:.1}s", elapsed.as_secs_f64()),
        PAD_WIDTH,
    ));

    lines.join("\n")
}

/// Render one row per stress round, marking the round that broke the threshold.
pub fn render_stress_rounds(rounds: &[StressRound], threshold_time: f64) -> String {
    let mut lines = vec![String::new(), "  stress rounds:".to_string()];
    for (i, round) in rounds.iter().enumerate() {
        let mean = format!("{:.3}s", round.mean_latency_secs);
        let mean = if round.mean_latency_secs > threshold_time {
            mean.red().to_string()
        } else {
            mean
        };
        lines.push(format_metric_row(
            &format!("    round {} ({} concurrent)", i + 1, round.concurrency),
            &mean,
            PAD_WIDTH,
        ));
    }
    lines.join("\n")
}

/// Format a single metric row with dot-padding.
///
/// Produces: `"  metric_name..................: value_string"`
fn format_metric_row(name: &str, value: &str, pad_width: usize) -> String {
    format!("  {name:.<pad_width$}: {value}")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Disable colors in tests for deterministic assertions.
    fn setup_no_color() {
        colored::control::set_override(false);
    }

    fn analysis() -> Analysis {
        Analysis {
            mean_latency_secs: 0.2134,
            error_count: 3,
            total_requests: 60,
        }
    }

    #[test]
    fn test_render_summary_contains_header() {
        setup_no_color();
        let output = render_summary(
            &analysis(),
            "stress",
            "http://localhost:8080/",
            Duration::from_secs(4),
        );
        assert!(output.contains("loadshape stress"), "Missing title");
        assert!(
            output.contains("http://localhost:8080/"),
            "Missing target URL"
        );
    }

    #[test]
    fn test_render_summary_contains_metrics() {
        setup_no_color();
        let output = render_summary(&analysis(), "volume", "http://x/", Duration::from_millis(4200));
        assert!(output.contains("http_req_total"));
        assert!(output.contains(": 60"), "Missing total");
        assert!(output.contains(": 3"), "Missing error count");
        assert!(output.contains("0.21s"), "Mean should use two decimals");
        assert!(output.contains("4.2s"), "Missing elapsed");
    }

    #[test]
    fn test_render_summary_empty_run() {
        setup_no_color();
        let empty = Analysis {
            mean_latency_secs: 0.0,
            error_count: 0,
            total_requests: 0,
        };
        let output = render_summary(&empty, "soak", "http://x/", Duration::ZERO);
        assert!(output.contains("0.00s"));
    }

    #[test]
    fn test_render_stress_rounds() {
        setup_no_color();
        let rounds = [
            StressRound {
                concurrency: 10,
                mean_latency_secs: 0.05,
            },
            StressRound {
                concurrency: 20,
                mean_latency_secs: 2.5,
            },
        ];
        let output = render_stress_rounds(&rounds, 2.0);
        assert!(output.contains("round 1 (10 concurrent)"));
        assert!(output.contains("round 2 (20 concurrent)"));
        assert!(output.contains("2.500s"));
    }

    #[test]
    fn test_format_metric_row_pads_with_dots() {
        let row = format_metric_row("abc", "1", 8);
        assert_eq!(row, "  abc.....: 1");
    }
}
