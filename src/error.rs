//! Error taxonomy with stable kinds and HTTP status mapping.
//!
//! [`GazetteError`] is the single error type returned by every repository
//! operation. Its [`ErrorKind`] is stable and inspectable so the REST layer
//! (or any other boundary) can map it with a table instead of matching on
//! messages.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "validation failed: invalid email address: not-an-email",
///     "kind": "validation"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code, kind and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Stable error kind (`validation`, `not_found`, ...).
    pub kind: ErrorKind,
    /// Human-readable error message.
    pub message: String,
}

/// Stable classification of every [`GazetteError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input or a reference to a row that does not exist.
    Validation,
    /// No live row matches.
    NotFound,
    /// Duplicate unique value, or mutation of a protected entity.
    Conflict,
    /// Connection, timeout or deadline problem talking to the store.
    TransientStore,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    /// HTTP status for this kind.
    ///
    /// | Kind           | HTTP Status               |
    /// |----------------|---------------------------|
    /// | Validation     | 400 Bad Request           |
    /// | NotFound       | 404 Not Found             |
    /// | Conflict       | 409 Conflict              |
    /// | TransientStore | 503 Service Unavailable   |
    /// | Internal       | 500 Internal Server Error |
    #[must_use]
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::TransientStore => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Input rejected before (or by) the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Email does not match the accepted pattern.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// A required field is empty after trimming.
    #[error("{field} must not be empty")]
    Empty {
        /// Offending field.
        field: &'static str,
    },

    /// A field exceeds its maximum length in characters.
    #[error("{field} exceeds {max} characters")]
    TooLong {
        /// Offending field.
        field: &'static str,
        /// Maximum number of characters.
        max: usize,
    },

    /// Status is not one of the accepted values.
    #[error("invalid status: {0}")]
    InvalidStatus(String),

    /// `permanent` is reserved for the seeded founder.
    #[error("status 'permanent' cannot be assigned")]
    ReservedStatus,

    /// Slug does not match `^[a-z0-9]+(-[a-z0-9]+)*$`.
    #[error("invalid slug: {0}")]
    InvalidSlug(String),

    /// More than one image in a single request is flagged as display image.
    #[error("at most one image may be flagged as display image")]
    MultipleDisplayImages,

    /// Foreign key points at a row that does not exist.
    #[error("unknown {0} reference")]
    UnknownReference(&'static str),

    /// A store-level check constraint rejected the row.
    #[error("constraint violated: {0}")]
    ConstraintViolated(String),
}

/// Error type for all core and REST operations.
#[derive(Debug, thiserror::Error)]
pub enum GazetteError {
    /// Request validation failed.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// No live row matches.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Duplicate unique value or protected entity.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Store could not be reached in time.
    #[error("store unavailable: {0}")]
    TransientStore(String),

    /// Unclassified store failure.
    #[error("store error: {0}")]
    Store(#[source] sqlx::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GazetteError {
    /// Returns the stable kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::TransientStore(_) => ErrorKind::TransientStore,
            Self::Store(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(ValidationError::UnknownReference(_)) => 1002,
            Self::Validation(_) => 1001,
            Self::NotFound(_) => 2001,
            Self::Conflict(_) => 2002,
            Self::TransientStore(_) => 3002,
            Self::Store(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }
}

impl From<sqlx::Error> for GazetteError {
    fn from(err: sqlx::Error) -> Self {
        classify(&err).unwrap_or(Self::Store(err))
    }
}

/// Maps store errors that have a meaning in the taxonomy. `None` means the
/// error stays an opaque [`GazetteError::Store`].
fn classify(err: &sqlx::Error) -> Option<GazetteError> {
    match err {
        sqlx::Error::RowNotFound => Some(GazetteError::NotFound("row")),
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => Some(GazetteError::TransientStore(err.to_string())),
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or_default();
            if db_err.is_unique_violation() {
                Some(GazetteError::Conflict(conflict_message(constraint).to_string()))
            } else if db_err.is_foreign_key_violation() {
                Some(GazetteError::Validation(ValidationError::UnknownReference(
                    referenced_entity(constraint),
                )))
            } else if db_err.is_check_violation() {
                Some(GazetteError::Validation(ValidationError::ConstraintViolated(
                    constraint.to_string(),
                )))
            } else if db_err.code().is_some_and(|code| is_transient_sqlstate(&code)) {
                Some(GazetteError::TransientStore(err.to_string()))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Human message for a unique-constraint name.
fn conflict_message(constraint: &str) -> &'static str {
    match constraint {
        "admins_email_live_key" => "email already exists",
        "events_slug_key" => "slug already exists",
        "event_images_one_display_per_event" => "event already has a display image",
        "event_authors_pkey" => "admin already authors this event",
        _ => "duplicate value",
    }
}

/// Entity name behind a foreign-key constraint.
fn referenced_entity(constraint: &str) -> &'static str {
    match constraint {
        "event_authors_admin_id_fkey" => "admin",
        "event_authors_event_id_fkey" | "event_images_event_id_fkey" => "event",
        _ => "row",
    }
}

/// SQLSTATEs worth retrying by the caller: connection exceptions,
/// serialization failures, deadlocks, cancellations and shutdowns.
fn is_transient_sqlstate(code: &str) -> bool {
    code.starts_with("08")
        || code.starts_with("57P")
        || matches!(code, "40001" | "40P01" | "57014" | "53300")
}

impl IntoResponse for GazetteError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.kind() == ErrorKind::Internal {
            tracing::error!(error = %self, "request failed");
        }
        let message = match &self {
            // Store internals stay in the log.
            Self::Store(_) => "a database error occurred".to_string(),
            other => other.to_string(),
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                kind: self.kind(),
                message,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_status_codes() {
        let cases = [
            (
                GazetteError::Validation(ValidationError::ReservedStatus),
                StatusCode::BAD_REQUEST,
            ),
            (GazetteError::NotFound("admin"), StatusCode::NOT_FOUND),
            (
                GazetteError::Conflict("email already exists".into()),
                StatusCode::CONFLICT,
            ),
            (
                GazetteError::TransientStore("pool timed out".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                GazetteError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{err}");
        }
    }

    #[test]
    fn unknown_reference_has_its_own_code() {
        let fk = GazetteError::Validation(ValidationError::UnknownReference("admin"));
        let plain = GazetteError::Validation(ValidationError::InvalidEmail("x".into()));
        assert_eq!(fk.kind(), ErrorKind::Validation);
        assert_ne!(fk.error_code(), plain.error_code());
    }

    #[test]
    fn row_not_found_is_not_found() {
        let err = GazetteError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn pool_timeout_is_transient() {
        let err = GazetteError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind(), ErrorKind::TransientStore);
    }

    #[test]
    fn decode_failure_is_internal() {
        let err = GazetteError::from(sqlx::Error::ColumnNotFound("email".into()));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn constraint_names_pick_messages() {
        assert_eq!(conflict_message("admins_email_live_key"), "email already exists");
        assert_eq!(conflict_message("events_slug_key"), "slug already exists");
        assert_eq!(conflict_message("something_else"), "duplicate value");
        assert_eq!(referenced_entity("event_authors_admin_id_fkey"), "admin");
        assert_eq!(referenced_entity("event_images_event_id_fkey"), "event");
    }

    #[test]
    fn transient_sqlstates() {
        assert!(is_transient_sqlstate("08006"));
        assert!(is_transient_sqlstate("40001"));
        assert!(is_transient_sqlstate("57014"));
        assert!(is_transient_sqlstate("57P01"));
        assert!(!is_transient_sqlstate("23505"));
        assert!(!is_transient_sqlstate("42P01"));
    }

    #[test]
    fn error_kind_serializes_snake_case() {
        let Ok(json) = serde_json::to_string(&ErrorKind::TransientStore) else {
            panic!("serialization failed");
        };
        assert_eq!(json, "\"transient_store\"");
    }
}
