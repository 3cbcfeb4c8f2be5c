//! Error types for quakemap.
//!
//! Uses `thiserror` for library-style error definitions.

use thiserror::Error;

/// Errors that can occur while fetching or decoding feed data.
#[derive(Error, Debug)]
pub enum QuakemapError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Remote server returned an error status
    #[error("feed error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid response structure
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
