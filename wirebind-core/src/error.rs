//! Error types for wirebind
//!
//! Two kinds of error live here:
//!
//! - **Error**: failures inside the wire layer (body decoding, argument
//!   decoding, encoding, telemetry setup), built with `thiserror`
//! - **ErrorBody**: the envelope a dispatcher sends back to the caller,
//!   `{"error": <category>, "msg": <detail>}`
//!
//! # Categories
//!
//! Every request-time failure is reported under one [`ErrorCategory`]:
//!
//! | category | status | raised when |
//! |---|---|---|
//! | `Bad Request` | 400 | malformed body, unknown method, procedure returned an error |
//! | `Invalid JSON` | 400 | a positional argument failed to decode |
//! | `Invalid Context` | 400 | a context extractor failed |
//! | `Internal Error` | 500 | a return value failed to encode |
//!
//! # Examples
//!
//! ```rust
//! use wirebind_core::{ErrorBody, ErrorCategory};
//!
//! let body = ErrorBody::invalid_json("expected i32");
//! assert_eq!(body.error, ErrorCategory::InvalidJson);
//! assert_eq!(body.error.status(), 400);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for wirebind wire operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wire-layer error
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The request body is not a valid `{"method", "args"}` object
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// A positional argument did not decode into the expected type
    #[error("Invalid argument {index}: {message}")]
    InvalidArgument {
        /// Position among the wire arguments
        index: usize,
        message: String,
    },

    /// A value could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Telemetry pipeline setup failed
    #[error("Observability error: {0}")]
    Observability(String),
}

impl Error {
    /// The detail carried into an [`ErrorBody`], without the variant prefix
    pub fn detail(&self) -> &str {
        match self {
            Error::InvalidBody(msg)
            | Error::Serialization(msg)
            | Error::Observability(msg) => msg,
            Error::InvalidArgument { message, .. } => message,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Failure category reported in the `error` field of an [`ErrorBody`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    #[serde(rename = "Bad Request")]
    BadRequest,
    #[serde(rename = "Invalid JSON")]
    InvalidJson,
    #[serde(rename = "Invalid Context")]
    InvalidContext,
    #[serde(rename = "Internal Error")]
    Internal,
}

impl ErrorCategory {
    /// Wire spelling of the category
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::BadRequest => "Bad Request",
            ErrorCategory::InvalidJson => "Invalid JSON",
            ErrorCategory::InvalidContext => "Invalid Context",
            ErrorCategory::Internal => "Internal Error",
        }
    }

    /// HTTP-style status paired with the category
    pub fn status(self) -> u16 {
        match self {
            ErrorCategory::Internal => 500,
            _ => 400,
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error envelope sent to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorCategory,
    pub msg: String,
}

impl ErrorBody {
    pub fn new(error: ErrorCategory, msg: impl Into<String>) -> Self {
        Self {
            error,
            msg: msg.into(),
        }
    }

    /// Malformed body, unknown method or a procedure error
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCategory::BadRequest, msg)
    }

    /// An argument failed to decode
    pub fn invalid_json(msg: impl Into<String>) -> Self {
        Self::new(ErrorCategory::InvalidJson, msg)
    }

    /// A context extractor failed
    pub fn invalid_context(msg: impl Into<String>) -> Self {
        Self::new(ErrorCategory::InvalidContext, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Internal, msg)
    }

    pub fn status(&self) -> u16 {
        self.error.status()
    }
}

impl std::fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.msg)
    }
}

impl std::error::Error for ErrorBody {}
