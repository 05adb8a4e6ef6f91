//! Generation client error types.

use syl_core::enums::UpstreamService;
use syl_core::errors::UpstreamError;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    /// Connection, timeout, or body transfer failure.
    #[error("Request to {url} failed: {message}")]
    Http { url: String, message: String },

    /// The API answered with a non-success status.
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected chat-completions shape.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl GenerationError {
    /// Network failures, rate limits and server errors may succeed later.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Http { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Client(_) | Self::Malformed(_) => false,
        }
    }
}

impl From<GenerationError> for UpstreamError {
    fn from(error: GenerationError) -> Self {
        if error.is_transient() {
            Self::transient(UpstreamService::Generation, error.to_string())
        } else {
            Self::rejected(UpstreamService::Generation, error.to_string())
        }
    }
}
