//! HTTP mapping of domain errors
//!
//! Every handler returns `Result<_, ApiError>`. The body is always
//! `{ "message": ..., "errors"?: [...] }`; `errors` is present only when a
//! close was blocked by validation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use costclose_domain::{CostCloseError, ValidationError};
use serde::Serialize;
use tracing::{error, warn};

/// Domain error on its way out of the HTTP layer.
#[derive(Debug)]
pub struct ApiError(pub CostCloseError);

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<ValidationError>>,
}

impl ApiError {
    /// HTTP status for the wrapped domain error.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CostCloseError::InvalidInput(_) | CostCloseError::ClosingBlocked { .. } => {
                StatusCode::BAD_REQUEST
            }
            CostCloseError::Auth(_) => StatusCode::UNAUTHORIZED,
            CostCloseError::NotFound(_) => StatusCode::NOT_FOUND,
            CostCloseError::Conflict(_) => StatusCode::CONFLICT,
            CostCloseError::Database(_)
            | CostCloseError::Config(_)
            | CostCloseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CostCloseError> for ApiError {
    fn from(value: CostCloseError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.0.label(), error = %self.0, "request failed");
        } else {
            warn!(kind = self.0.label(), status = status.as_u16(), error = %self.0, "request rejected");
        }

        let body = match self.0 {
            CostCloseError::ClosingBlocked { message, errors } => {
                ErrorBody { message, errors: Some(errors) }
            }
            // Internal details stay in the logs.
            CostCloseError::Database(_) | CostCloseError::Internal(_) => {
                ErrorBody { message: "Internal server error".to_string(), errors: None }
            }
            other => ErrorBody { message: other.to_string(), errors: None },
        };

        (status, Json(body)).into_response()
    }
}
