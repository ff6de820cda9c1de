//! Status-code driven response dispatch.
//!
//! # Design
//! Each call site registers the statuses it expects with a handler. A
//! response either reaches exactly one handler, whose result (success or
//! error) is returned untouched, or falls through to [`fail_generically`],
//! the single fallback shared by every call site. There are no retries; each
//! response is dispatched once.

use serde_json::Value;
use tracing::{debug, warn};

use crate::case::to_internal_case;
use crate::error::{ApiError, ErrorDescriptor};
use crate::http::HttpResponse;

type Handler<'a, T> = Box<dyn FnOnce(&HttpResponse) -> Result<T, ApiError> + 'a>;

/// Table of expected statuses and what to do with each.
pub struct Responders<'a, T> {
    handlers: Vec<(u16, Handler<'a, T>)>,
}

impl<'a, T> Responders<'a, T> {
    pub fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    /// Registers `handler` for `status`, replacing any earlier one.
    pub fn on<F>(mut self, status: u16, handler: F) -> Self
    where
        F: FnOnce(&HttpResponse) -> Result<T, ApiError> + 'a,
    {
        self.handlers.retain(|(registered, _)| *registered != status);
        self.handlers.push((status, Box::new(handler)));
        self
    }

    /// Runs the handler registered for the response's status, or raises the
    /// classified error for an unexpected one.
    pub fn dispatch(self, response: HttpResponse) -> Result<T, ApiError> {
        let status = response.status;
        match self.handlers.into_iter().find(|(registered, _)| *registered == status) {
            Some((_, handler)) => {
                debug!(status, "dispatching response to registered handler");
                handler(&response)
            }
            None => Err(fail_generically(response)),
        }
    }
}

impl<T> Default for Responders<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Classifies a response no handler claimed.
///
/// 401, 403, 404 and 422 carry the body's error descriptors. Anything else
/// becomes `ApiError::Http` holding the whole envelope.
pub fn fail_generically(response: HttpResponse) -> ApiError {
    let errors = parse_error_descriptors(&response.body);
    warn!(
        status = response.status,
        descriptors = errors.len(),
        "unexpected response status"
    );
    match response.status {
        401 => ApiError::Authentication { errors },
        403 => ApiError::Authorization { errors },
        404 => ApiError::NotFound { errors },
        422 => ApiError::Validation { errors },
        _ => ApiError::Http { response },
    }
}

/// Extracts `{"errors": [...]}` with snake_case keys and symbolic codes.
///
/// Any problem with the body (not JSON, no `errors` list, entries of the
/// wrong shape) yields an empty list rather than an error.
pub fn parse_error_descriptors(body: &str) -> Vec<ErrorDescriptor> {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json.get("errors").map(to_internal_case))
        .and_then(|errors| serde_json::from_value::<Vec<ErrorDescriptor>>(errors).ok())
        .unwrap_or_default()
}
