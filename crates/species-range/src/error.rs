//! Error types for the species range pipeline.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.
//! [`ClientError`] covers the HTTP layer; [`RangeError`] is what every pipeline stage
//! surfaces to the caller.

use std::time::Duration;

/// Errors from the HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, body decoding, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Rate limited by the remote service (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Resource not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Invalid request parameters (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from the service
        message: String,
    },

    /// An endpoint URL could not be built
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl {
        /// The offending URL
        url: String,
        /// Why it was rejected
        message: String,
    },

    /// JSON parsing error (malformed body or missing required fields)
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create an invalid URL error.
    #[must_use]
    pub fn invalid_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into(), message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Server { .. })
    }

    /// Get the retry-after duration if this is a rate limit error.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Errors surfaced by the species range pipeline.
///
/// Every stage returns one of these unchanged; nothing is retried or recovered
/// internally, and a failed call never yields a partial table.
#[derive(thiserror::Error, Debug)]
pub enum RangeError {
    /// Input validation failed before any request was made
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// The catalog search produced no range-map candidates
    #[error("No range map found for '{query}'")]
    NotFound {
        /// The species name as supplied by the caller
        query: String,
    },

    /// Several candidates tied for the best match
    #[error("'{query}' matches {} range maps equally well: {}", .candidates.len(), .candidates.join("; "))]
    AmbiguousMatch {
        /// The species name as supplied by the caller
        query: String,
        /// Titles of the tied candidates, in ranking order
        candidates: Vec<String>,
    },

    /// The catalog item has no attached file accepted by the range-file filter
    #[error("Catalog item {item_id} has no range map file")]
    NoRangeFile {
        /// Catalog item that was inspected
        item_id: String,
    },

    /// The catalog or taxonomy service failed or answered with something unexpected
    #[error("Upstream error: {0}")]
    Upstream(#[from] ClientError),

    /// Transfer of the range file failed
    #[error("Download of {url} failed: {message}")]
    Download {
        /// Download locator
        url: String,
        /// What went wrong
        message: String,
    },

    /// The downloaded bytes are not a readable range map
    #[error("Could not read {file}: {message}")]
    Parse {
        /// File name as listed in the catalog
        file: String,
        /// What went wrong
        message: String,
    },

    /// A source identifier that this library does not provide
    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),

    /// Local filesystem error while staging the download
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RangeError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(query: impl Into<String>) -> Self {
        Self::NotFound { query: query.into() }
    }

    /// Create a download error.
    #[must_use]
    pub fn download(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Download { url: url.into(), message: message.into() }
    }

    /// Create a parse error.
    #[must_use]
    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse { file: file.into(), message: message.into() }
    }

    /// Convert to a user-friendly error message for command-line output.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Upstream(ClientError::RateLimited { retry_after }) => {
                format!(
                    "Rate limited by the catalog service. Please wait {:?} before retrying.",
                    retry_after
                )
            }
            Self::NotFound { query } => {
                format!("No range map found for '{query}'. Try the scientific name.")
            }
            Self::AmbiguousMatch { query, candidates } => {
                format!(
                    "'{query}' is ambiguous. Candidates:\n  - {}\nUse a more specific name.",
                    candidates.join("\n  - ")
                )
            }
            Self::Validation { field, message } => {
                format!("Invalid input for '{field}': {message}")
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for pipeline operations.
pub type RangeResult<T> = Result<T, RangeError>;
