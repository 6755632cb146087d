use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::reconcile::ReconcileError;
use crate::update::UpdateError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("unsupported type '{0}'")]
    UnsupportedType(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("persistence failure: {0}")]
    Persistence(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ReconcileError> for GatewayError {
    fn from(e: ReconcileError) -> Self {
        match e {
            ReconcileError::MalformedInput { reason } => Self::MalformedInput(reason),
        }
    }
}

impl From<UpdateError> for GatewayError {
    fn from(e: UpdateError) -> Self {
        match e {
            UpdateError::UnsupportedType { type_id } => Self::UnsupportedType(type_id),
            UpdateError::MalformedInput { reason } => Self::MalformedInput(reason),
            UpdateError::Persistence(e) => Self::Persistence(e.to_string()),
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MalformedInput(_) | GatewayError::UnsupportedType(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Persistence(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}
