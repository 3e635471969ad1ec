//! TfL client error types.

use std::fmt;

/// Errors from the TfL HTTP client and the fixture-backed mock.
#[derive(Debug)]
pub enum TflError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned a non-success status code
    Api { status: u16, message: String },

    /// Invalid or missing API key
    Unauthorized,

    /// Rate limited by the API
    RateLimited,

    /// Client cannot be used as configured
    NotConfigured(String),

    /// Mock fixture could not be read
    Fixture { path: String, message: String },
}

impl TflError {
    /// Build a [`TflError::Json`] from a serde error, keeping the first
    /// 500 characters of the offending body.
    pub(crate) fn json(err: serde_json::Error, body: &str) -> Self {
        TflError::Json {
            message: err.to_string(),
            body: Some(body.chars().take(500).collect()),
        }
    }
}

impl fmt::Display for TflError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TflError::Http(e) => write!(f, "HTTP error: {e}"),
            TflError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            TflError::Api { status, message } => write!(f, "TfL API error {status}: {message}"),
            TflError::Unauthorized => write!(f, "unauthorized (check TFL_API_KEY)"),
            TflError::RateLimited => write!(f, "rate limited by TfL API"),
            TflError::NotConfigured(msg) => write!(f, "{msg}"),
            TflError::Fixture { path, message } => {
                write!(f, "mock fixture {path}: {message}")
            }
        }
    }
}

impl std::error::Error for TflError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TflError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TflError {
    fn from(err: reqwest::Error) -> Self {
        TflError::Http(err)
    }
}
