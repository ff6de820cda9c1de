//! Error types for the warehouse API client.
//!
//! # Design
//! The four statuses callers act on (401, 403, 404, 422) get their own
//! variants carrying the normalized error descriptors from the body. Any
//! other unexpected status lands in `Http` with the raw envelope, since its
//! body has no known shape. The remaining variants are local failures.
//! `kind()` folds all of this into the five-way classification callers
//! match on.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http::HttpResponse;
use crate::temporal::FormatError;

/// A symbolic error code such as `not-found` or `invalid-id-token`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Code(String);

impl Code {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Code {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl PartialEq<str> for Code {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Code {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// One entry of an error body's `errors` list, with snake_case keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Any other fields the server sent, e.g. `field`.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ErrorDescriptor {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: Some(Code::new(code)),
            description: Some(description.into()),
            extra: serde_json::Map::new(),
        }
    }
}

/// Coarse classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Authentication,
    Authorization,
    Validation,
    Generic,
}

/// Errors returned by the client's parse methods and the `Warehouse` facade.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 404 without a handler.
    #[error("resource not found{}", summarize(.errors))]
    NotFound { errors: Vec<ErrorDescriptor> },

    /// 401 without a handler.
    #[error("authentication failed{}", summarize(.errors))]
    Authentication { errors: Vec<ErrorDescriptor> },

    /// 403 without a handler.
    #[error("not authorized{}", summarize(.errors))]
    Authorization { errors: Vec<ErrorDescriptor> },

    /// 422 without a handler; the descriptors are meant for the user.
    #[error("validation failed{}", summarize(.errors))]
    Validation { errors: Vec<ErrorDescriptor> },

    /// Any other status without a handler.
    #[error("unexpected HTTP {}: {}", .response.status, .response.body)]
    Http { response: HttpResponse },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("transport failed: {0}")]
    Transport(String),

    /// The service has no endpoint for this operation on this resource.
    /// Raised before any request is built.
    #[error("{resource} does not support {operation}")]
    Unsupported {
        resource: &'static str,
        operation: &'static str,
    },
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::NotFound { .. } => ErrorKind::NotFound,
            ApiError::Authentication { .. } => ErrorKind::Authentication,
            ApiError::Authorization { .. } => ErrorKind::Authorization,
            ApiError::Validation { .. } => ErrorKind::Validation,
            _ => ErrorKind::Generic,
        }
    }

    /// Normalized descriptors; empty for generic failures.
    pub fn descriptors(&self) -> &[ErrorDescriptor] {
        match self {
            ApiError::NotFound { errors }
            | ApiError::Authentication { errors }
            | ApiError::Authorization { errors }
            | ApiError::Validation { errors } => errors,
            _ => &[],
        }
    }

    /// The raw envelope, for unexpected statuses only.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            ApiError::Http { response } => Some(response),
            _ => None,
        }
    }
}

fn summarize(errors: &[ErrorDescriptor]) -> String {
    let parts: Vec<String> = errors
        .iter()
        .map(|e| match (&e.code, &e.description) {
            (Some(code), Some(description)) => format!("{code}: {description}"),
            (Some(code), None) => code.to_string(),
            (None, Some(description)) => description.clone(),
            (None, None) => "unknown".to_string(),
        })
        .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join("; "))
    }
}
