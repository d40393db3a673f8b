//! Error types for the platform user-role API.
//!
//! Uses RFC 7807 Problem Details for HTTP APIs.
//!
//! Only batch-scope failures live here. Row-scope failures never cross the
//! reconciliation loop; they are rendered into the row's `status` field (see
//! `services::reconciler::RowFailure`).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base URL for error type URIs.
const ERROR_BASE_URL: &str = "https://ursa.dev/errors/user-roles";

/// RFC 7807 Problem Details structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI identifying the problem type.
    #[serde(rename = "type")]
    pub error_type: String,

    /// Short human-readable summary.
    pub title: String,

    /// HTTP status code.
    pub status: u16,

    /// Human-readable explanation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProblemDetails {
    /// Create a new `ProblemDetails` instance.
    #[must_use]
    pub fn new(error_type: &str, title: &str, status: StatusCode) -> Self {
        Self {
            error_type: format!("{ERROR_BASE_URL}/{error_type}"),
            title: title.to_string(),
            status: status.as_u16(),
            detail: None,
        }
    }

    /// Add detail message.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Batch-scope API errors.
#[derive(Debug, Error)]
pub enum RolesApiError {
    /// Uploaded file could not be decoded as tabular text.
    #[error("Invalid CSV: {0}")]
    InvalidCsv(String),

    /// Uploaded file or data is missing.
    #[error("File or data is missing.")]
    MissingFile,

    /// The role directory could not be loaded; no role code can be
    /// validated, so the whole batch is rejected.
    #[error("Role directory unavailable: {0}")]
    RoleDirectory(String),

    /// The identity directory could not be reached.
    #[error("Identity directory unavailable: {0}")]
    IdentityDirectory(String),

    /// Missing or invalid caller identity.
    #[error("Unauthorized")]
    Unauthorized,

    /// Internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RolesApiError {
    /// Convert to `ProblemDetails`.
    pub fn to_problem_details(&self) -> ProblemDetails {
        match self {
            RolesApiError::InvalidCsv(msg) => {
                ProblemDetails::new("invalid-csv", "Invalid CSV", StatusCode::BAD_REQUEST)
                    .with_detail(msg.clone())
            }

            RolesApiError::MissingFile => {
                ProblemDetails::new("missing-file", "Missing File", StatusCode::BAD_REQUEST)
                    .with_detail("File or data is missing.")
            }

            RolesApiError::RoleDirectory(msg) => {
                tracing::error!(error = %msg, "Role directory unavailable");
                ProblemDetails::new(
                    "role-directory-unavailable",
                    "Role Directory Unavailable",
                    StatusCode::BAD_GATEWAY,
                )
                .with_detail("The role catalog could not be loaded. Please try again later.")
            }

            RolesApiError::IdentityDirectory(msg) => {
                tracing::error!(error = %msg, "Identity directory unavailable");
                ProblemDetails::new(
                    "identity-directory-unavailable",
                    "Identity Directory Unavailable",
                    StatusCode::BAD_GATEWAY,
                )
                .with_detail("The identity directory could not be reached. Please try again later.")
            }

            RolesApiError::Unauthorized => {
                ProblemDetails::new("unauthorized", "Unauthorized", StatusCode::UNAUTHORIZED)
                    .with_detail("Authentication required.")
            }

            RolesApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal user-roles error");
                ProblemDetails::new(
                    "internal-error",
                    "Internal Server Error",
                    StatusCode::INTERNAL_SERVER_ERROR,
                )
                .with_detail("An internal error occurred. Please try again later.")
            }

            RolesApiError::Database(err) => {
                tracing::error!(error = %err, "Database error in user-roles API");
                ProblemDetails::new(
                    "database-error",
                    "Database Error",
                    StatusCode::INTERNAL_SERVER_ERROR,
                )
                .with_detail("A database error occurred. Please try again later.")
            }
        }
    }

    /// Get the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            RolesApiError::InvalidCsv(_) => StatusCode::BAD_REQUEST,
            RolesApiError::MissingFile => StatusCode::BAD_REQUEST,
            RolesApiError::RoleDirectory(_) => StatusCode::BAD_GATEWAY,
            RolesApiError::IdentityDirectory(_) => StatusCode::BAD_GATEWAY,
            RolesApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            RolesApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RolesApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RolesApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let problem = self.to_problem_details();

        let mut response = (status, Json(problem)).into_response();
        response.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/problem+json"),
        );

        response
    }
}
