//! Typed error handling for pawprint
//!
//! Every fallible public operation returns [`PawprintError`], which carries
//! enough structure for callers to branch on the failure kind and converts
//! straight into an HTTP response.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: a request violated a declared constraint
//! - [`StoreError`]: the persistent cat store failed
//! - [`ConfigError`]: configuration could not be loaded
//!
//! # Example
//!
//! ```rust,ignore
//! match service.search(request).await {
//!     Ok(page) => println!("{} cats", page.items.len()),
//!     Err(PawprintError::InvalidArgument(e)) => eprintln!("bad request: {}", e),
//!     Err(e) if e.is_retryable() => eprintln!("try again later: {}", e),
//!     Err(e) => eprintln!("failed: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// The main error type for pawprint
#[derive(Debug)]
pub enum PawprintError {
    /// Request violates a declared constraint; rejected before any store call
    InvalidArgument(ValidationError),

    /// A single cat lookup found nothing
    NotFound { resource: String, id: Uuid },

    /// Caller has no identity but the action requires one
    Unauthorized { message: String },

    /// Caller is known but not permitted to perform the action
    Forbidden { message: String },

    /// Action conflicts with the current state of the resource
    Conflict { message: String },

    /// Underlying store call failed
    StoreUnavailable(StoreError),

    /// Configuration errors
    Config(ConfigError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for PawprintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PawprintError::InvalidArgument(e) => write!(f, "Invalid argument: {}", e),
            PawprintError::NotFound { resource, id } => {
                write!(f, "{} with id '{}' not found", resource, id)
            }
            PawprintError::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
            PawprintError::Forbidden { message } => write!(f, "Forbidden: {}", message),
            PawprintError::Conflict { message } => write!(f, "Conflict: {}", message),
            PawprintError::StoreUnavailable(e) => write!(f, "Store unavailable: {}", e),
            PawprintError::Config(e) => write!(f, "{}", e),
            PawprintError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for PawprintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PawprintError::InvalidArgument(e) => Some(e),
            PawprintError::StoreUnavailable(e) => Some(e),
            PawprintError::Config(e) => Some(e),
            _ => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl PawprintError {
    /// Shorthand for a single-field validation failure
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        PawprintError::InvalidArgument(ValidationError::FieldError {
            field: field.into(),
            message: message.into(),
        })
    }

    pub fn cat_not_found(id: Uuid) -> Self {
        PawprintError::NotFound {
            resource: "cat".to_string(),
            id,
        }
    }

    pub fn application_not_found(id: Uuid) -> Self {
        PawprintError::NotFound {
            resource: "application".to_string(),
            id,
        }
    }

    /// Whether the caller may retry the same request unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PawprintError::StoreUnavailable(
                StoreError::Connection { .. } | StoreError::Unavailable { .. }
            )
        )
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            PawprintError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            PawprintError::NotFound { .. } => StatusCode::NOT_FOUND,
            PawprintError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            PawprintError::Forbidden { .. } => StatusCode::FORBIDDEN,
            PawprintError::Conflict { .. } => StatusCode::CONFLICT,
            PawprintError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            PawprintError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PawprintError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            PawprintError::InvalidArgument(_) => "INVALID_ARGUMENT",
            PawprintError::NotFound { .. } => "NOT_FOUND",
            PawprintError::Unauthorized { .. } => "UNAUTHORIZED",
            PawprintError::Forbidden { .. } => "FORBIDDEN",
            PawprintError::Conflict { .. } => "CONFLICT",
            PawprintError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            PawprintError::Config(_) => "CONFIG_ERROR",
            PawprintError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            PawprintError::NotFound { resource, id } => Some(serde_json::json!({
                "resource": resource,
                "id": id.to_string()
            })),
            PawprintError::InvalidArgument(ValidationError::FieldError { field, message }) => {
                Some(serde_json::json!({
                    "fields": [{ "field": field, "message": message }]
                }))
            }
            PawprintError::InvalidArgument(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            PawprintError::StoreUnavailable(_) => {
                Some(serde_json::json!({ "retryable": self.is_retryable() }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for PawprintError {
    fn into_response(self) -> Response {
        if self.status_code().is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationError {
    /// Single field validation failed
    FieldError { field: String, message: String },

    /// Multiple field validation errors
    FieldErrors(Vec<FieldValidationError>),

    /// Request body could not be decoded
    InvalidBody { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldError { field, message } => {
                write!(f, "Field '{}': {}", field, message)
            }
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation failed: {}", msgs.join(", "))
            }
            ValidationError::InvalidBody { message } => {
                write!(f, "Invalid request body: {}", message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for PawprintError {
    fn from(err: ValidationError) -> Self {
        PawprintError::InvalidArgument(err)
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldValidationError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        // field_errors() iterates a HashMap
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::FieldErrors(fields)
    }
}

impl From<validator::ValidationErrors> for PawprintError {
    fn from(errors: validator::ValidationErrors) -> Self {
        PawprintError::InvalidArgument(errors.into())
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors raised by a [`CatStore`](crate::core::store::CatStore) backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{backend} connection error: {message}")]
    Connection { backend: String, message: String },

    #[error("{backend} query error: {message}")]
    Query { backend: String, message: String },

    /// The cursor id references no stored record
    #[error("cursor '{id}' does not reference a stored cat")]
    CursorNotFound { id: Uuid },

    #[error("{backend} storage is unavailable")]
    Unavailable { backend: String },

    /// A stored row no longer decodes into a domain value
    #[error("{backend} returned a corrupt record: {message}")]
    Corrupt { backend: String, message: String },
}

impl From<StoreError> for PawprintError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Corrupt { .. } => PawprintError::Internal(err.to_string()),
            other => PawprintError::StoreUnavailable(other),
        }
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors related to configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Unknown auth policy '{policy}' for action '{action}'")]
    UnknownPolicy { action: String, policy: String },
}

impl From<ConfigError> for PawprintError {
    fn from(err: ConfigError) -> Self {
        PawprintError::Config(err)
    }
}
