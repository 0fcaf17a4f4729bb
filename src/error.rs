//! Error types and handling for the climate API

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Main error type for the climate API
#[derive(Error, Debug)]
pub enum ClimateError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Errors reported by the storage engine
    #[error("Database error: {source}")]
    Database {
        #[from]
        source: sqlx::Error,
    },

    /// The live schema does not match the declared entities
    #[error("Schema error: {message}")]
    Schema { message: String },

    /// A stored value needed for numeric coercion was NULL
    #[error("Missing value in column '{column}'")]
    MissingValue { column: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ClimateError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new schema error
    pub fn schema<S: Into<String>>(message: S) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create a new missing value error
    pub fn missing_value<S: Into<String>>(column: S) -> Self {
        Self::MissingValue {
            column: column.into(),
        }
    }

    /// HTTP status reported when this error escapes a handler
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            ClimateError::Config { .. }
            | ClimateError::Database { .. }
            | ClimateError::Schema { .. }
            | ClimateError::MissingValue { .. }
            | ClimateError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ClimateError::Config { message } => format!("Configuration error: {message}"),
            ClimateError::Database { .. } => {
                "The observation database could not be queried.".to_string()
            }
            ClimateError::Schema { message } => {
                format!("The observation database has an unexpected layout: {message}")
            }
            ClimateError::MissingValue { column } => {
                format!("A stored observation has no value for '{column}'.")
            }
            ClimateError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<&ClimateError> for ErrorResponse {
    fn from(err: &ClimateError) -> Self {
        Self {
            error: err.user_message(),
            code: err.status_code().as_u16(),
        }
    }
}

impl IntoResponse for ClimateError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        let status = self.status_code();
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
