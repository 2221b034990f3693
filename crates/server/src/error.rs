//! HTTP error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use policyqa_core::AppError;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;
use validator::ValidationErrors;

/// Why a request body was rejected, split into whole-body and per-field
/// messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationDetails {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationDetails {
    pub fn form(message: impl Into<String>) -> Self {
        Self {
            form_errors: vec![message.into()],
            field_errors: BTreeMap::new(),
        }
    }
}

impl From<&ValidationErrors> for ValidationDetails {
    fn from(errors: &ValidationErrors) -> Self {
        let field_errors = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|err| match &err.message {
                        Some(message) => message.to_string(),
                        None => err.code.to_string(),
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();

        Self {
            form_errors: Vec::new(),
            field_errors,
        }
    }
}

/// Errors returned by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or rejected bearer token
    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    /// Body failed to parse or validate
    #[error("Invalid request body")]
    InvalidBody(ValidationDetails),

    /// Anything that went wrong after the request was accepted
    #[error("An unexpected error occurred: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::InvalidBody(ValidationDetails::from(&errors))
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation(msg) => ApiError::InvalidBody(ValidationDetails::form(msg)),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = self.to_string();
        match self {
            ApiError::Unauthorized(_) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": error }))).into_response()
            }
            ApiError::InvalidBody(details) => {
                tracing::debug!(?details, "Rejected request body");
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": error, "details": details })),
                )
                    .into_response()
            }
            ApiError::Internal(msg) => {
                tracing::error!("Request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": error })))
                    .into_response()
            }
        }
    }
}
