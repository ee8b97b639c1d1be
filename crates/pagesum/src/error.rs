//! Error types for Pagesum
//!
//! Each pipeline stage has its own error enum. [`Error`] unions them so the
//! top-level caller sees every failure unchanged.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while retrieving a page
#[derive(Debug, Error)]
pub enum FetchError {
    /// Server answered with anything other than 200
    #[error("Failed to fetch the URL: {url} (HTTP {status})")]
    Status { url: String, status: u16 },

    /// Request timed out
    #[error("Request timed out: {url}")]
    Timeout { url: String },

    /// Failed to connect to server
    #[error("Failed to connect to server: {url}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Other request error
    #[error("Request failed for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuild(#[source] reqwest::Error),
}

impl FetchError {
    /// Classify a reqwest error raised while fetching `url`
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        let url = url.to_string();
        if err.is_timeout() {
            FetchError::Timeout { url }
        } else if err.is_connect() {
            FetchError::Connect { url, source: err }
        } else {
            FetchError::Request { url, source: err }
        }
    }

    /// HTTP status code, if the server responded at all
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised while turning HTML into a title/body pair
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Parsed document has no `<body>` element
    #[error("Document has no body element")]
    MissingBody,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required key is unset or empty
    #[error("Missing required configuration value: {key}")]
    Missing { key: String },

    /// Value is present but is not an integer
    #[error("Invalid integer for {key}: {value:?}")]
    InvalidInt { key: String, value: String },

    /// Value is present but is not a URL
    #[error("Invalid URL for {key}: {value:?}")]
    InvalidUrl { key: String, value: String },

    /// Env file exists but could not be read or parsed
    #[error("Failed to read env file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

/// Errors from the chat-completion call
#[derive(Debug, Error)]
pub enum LlmError {
    /// Provider answered with a non-success status
    #[error("LLM API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport failure
    #[error("LLM request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// Response body was not a chat completion
    #[error("Failed to decode LLM response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Failed to build HTTP client
    #[error("Failed to create LLM HTTP client")]
    ClientBuild(#[source] reqwest::Error),
}

/// Any failure in the summarization pipeline
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FetchError::Status {
                url: "https://example.com".to_string(),
                status: 404,
            }
            .to_string(),
            "Failed to fetch the URL: https://example.com (HTTP 404)"
        );
        assert_eq!(
            FetchError::Timeout {
                url: "https://example.com".to_string(),
            }
            .to_string(),
            "Request timed out: https://example.com"
        );
        assert_eq!(
            ExtractionError::MissingBody.to_string(),
            "Document has no body element"
        );
        assert_eq!(
            ConfigError::Missing {
                key: "OPENAI_API_KEY".to_string(),
            }
            .to_string(),
            "Missing required configuration value: OPENAI_API_KEY"
        );
        assert_eq!(
            ConfigError::InvalidInt {
                key: "PAGESUM_TIMEOUT_SECS".to_string(),
                value: "ten".to_string(),
            }
            .to_string(),
            "Invalid integer for PAGESUM_TIMEOUT_SECS: \"ten\""
        );
        assert_eq!(
            LlmError::Api {
                status: 401,
                message: "Incorrect API key provided".to_string(),
            }
            .to_string(),
            "LLM API error: HTTP 401: Incorrect API key provided"
        );
    }

    #[test]
    fn test_error_is_transparent() {
        let err: Error = FetchError::Status {
            url: "https://example.com".to_string(),
            status: 500,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Failed to fetch the URL: https://example.com (HTTP 500)"
        );
        assert!(matches!(err, Error::Fetch(ref e) if e.status() == Some(500)));
    }
}
