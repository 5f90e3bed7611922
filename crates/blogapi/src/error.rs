//! Error types for item service calls.
//!
//! Errors are categorized so callers can tell an absent item apart from a
//! failed call without looking at message text.

use std::fmt;

/// Result type alias for item service operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of item service errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The requested item does not exist.
    NotFound,
    /// An item with the same name already exists.
    Conflict,
    /// Transport or server-side failure.
    Network,
    /// The service answered with something we could not decode.
    Format,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Whether this category means the item is absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "Item not found",
            Self::Conflict => "Item already exists",
            Self::Network => "Item service unreachable or failing",
            Self::Format => "Invalid response from item service",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::NotFound => "Run `blogctl refresh` to drop it from state, or import it again",
            Self::Conflict => "Import the existing item with `blogctl import` instead of creating it",
            Self::Network => "Check the provider endpoint and that the service is running",
            Self::Format => "Check that the endpoint points at a blog item service",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors returned by an [`ItemClient`](crate::ItemClient).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No item with this identifier exists.
    #[error("item not found: {id}")]
    NotFound {
        /// Identifier that was looked up.
        id: String,
    },

    /// An item with this name already exists.
    #[error("item already exists: {name}")]
    AlreadyExists {
        /// Conflicting item name.
        name: String,
    },

    /// HTTP request failed.
    #[error("HTTP request failed: {message}")]
    HttpError {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// Invalid response from the service.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a not-found error for an identifier.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::HttpError {
            message: message.into(),
            status,
        }
    }

    /// Classify a transport error for a call that addressed `id`.
    ///
    /// Status 404 and 409 become typed errors; everything else stays an
    /// HTTP error.
    pub fn from_transport(err: ureq::Error, id: &str) -> Self {
        match err {
            ureq::Error::StatusCode(404) => Self::not_found(id),
            ureq::Error::StatusCode(409) => Self::AlreadyExists {
                name: id.to_string(),
            },
            other => other.into(),
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::AlreadyExists { .. } => ErrorCategory::Conflict,
            Error::HttpError { .. } => ErrorCategory::Network,
            Error::InvalidResponse(_) => ErrorCategory::Format,
            Error::Other(_) => ErrorCategory::Other,
        }
    }

    /// Whether this error means the item does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.category().is_not_found()
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::HttpError {
                message: format!("HTTP {}", code),
                status: Some(code),
            },
            other => Self::HttpError {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
