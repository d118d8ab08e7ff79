//! Error types for the load testing engine.
//!
//! Defines [`LoadTestError`] for run-level misuse (bad arguments, bad target,
//! bad configuration) and [`TransportError`] for per-request failures that
//! the executor absorbs and counts.

/// Errors that abort a load test before any request is dispatched.
///
/// Individual request failures never surface here; they are recorded in the
/// result store and logged by the executor.
#[derive(Debug, thiserror::Error)]
pub enum LoadTestError {
    /// A policy argument is out of range (e.g., zero stress step).
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The target URL could not be parsed or uses an unsupported scheme.
    #[error("Invalid target URL '{url}': {message}")]
    InvalidTarget { url: String, message: String },

    /// TOML parse failure -- the config file contains invalid TOML syntax
    /// or does not match the expected schema.
    #[error("Failed to parse config TOML: {source}")]
    ConfigParse {
        #[from]
        source: toml::de::Error,
    },

    /// Semantic validation failure -- the config parsed successfully but
    /// contains invalid values (e.g., zero burst size).
    #[error("Config validation error: {message}")]
    ConfigValidation { message: String },

    /// File I/O failure -- the config file could not be read from disk.
    #[error("Failed to read config file '{path}': {source}")]
    ConfigIo {
        source: std::io::Error,
        path: String,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {message}")]
    ClientBuild { message: String },
}

impl LoadTestError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

/// Transport-level failure of a single GET request.
///
/// The request never produced a status code. Elapsed time up to the failure
/// is still recorded by the executor.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request exceeded the client's per-request timeout.
    #[error("Request timed out")]
    Timeout,

    /// Connection-level failure (DNS resolution, TCP connect, TLS handshake).
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// Any other failure while sending the request or reading the response.
    #[error("Request error: {message}")]
    Request { message: String },
}

impl TransportError {
    /// Returns the error category as a static string for log fields.
    ///
    /// Categories: `"timeout"`, `"connection"`, `"request"`.
    pub fn error_category(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connection { .. } => "connection",
            Self::Request { .. } => "request",
        }
    }

    /// Classify a [`reqwest::Error`] into the appropriate [`TransportError`] variant.
    pub fn classify_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection {
                message: err.to_string(),
            }
        } else {
            Self::Request {
                message: err.to_string(),
            }
        }
    }
}
