//! Unified error type for the gate, its stores and the HTTP adapter.

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Every failure the crate can surface.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human readable description
        message: String,
    },

    /// Settings or document store failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem or socket failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or unreadable environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Template registration or rendering failed
    #[error("Template error: {message}")]
    Template {
        /// Underlying handlebars message
        message: String,
    },

    /// Submitted data cannot be accepted
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong
        message: String,
    },

    /// No landing document with this id
    #[error("Landing document not found: {id}")]
    DocumentNotFound {
        /// Requested document id
        id: i64,
    },

    /// Caller is not signed in
    #[error("Authentication required")]
    Unauthenticated,

    /// Caller lacks the capability required for the operation
    #[error("Permission denied: missing capability {capability}")]
    PermissionDenied {
        /// Name of the missing capability
        capability: String,
    },
}

impl From<handlebars::RenderError> for Error {
    fn from(value: handlebars::RenderError) -> Self {
        Self::Template {
            message: value.to_string(),
        }
    }
}

impl From<handlebars::TemplateError> for Error {
    fn from(value: handlebars::TemplateError) -> Self {
        Self::Template {
            message: value.to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Self::InvalidInput { .. } => (StatusCode::BAD_REQUEST, self.to_string()).into_response(),
            Self::DocumentNotFound { .. } => (StatusCode::NOT_FOUND, self.to_string()).into_response(),
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                "authentication required",
            )
                .into_response(),
            Self::PermissionDenied { .. } => {
                (StatusCode::FORBIDDEN, "you are not allowed to access this page").into_response()
            }
            _ => {
                tracing::error!("Request failed: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
