//! API routes for the PolicyQA server

pub mod run;
pub mod verify;

use axum::{body::Bytes, routing::post, Json, Router};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{ApiError, ValidationDetails};
use crate::state::AppState;

/// Authenticated routes, nested under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/hackrx/run", post(run::run))
        .route("/verify", post(verify::verify))
}

/// Parse and validate a JSON body, reporting failures as a 400.
pub(crate) fn parse_body<T>(body: &Bytes) -> Result<T, ApiError>
where
    T: DeserializeOwned + Validate,
{
    let request: T = serde_json::from_slice(body)
        .map_err(|e| ApiError::InvalidBody(ValidationDetails::form(e.to_string())))?;
    request.validate()?;
    Ok(request)
}

/// API info endpoint
pub async fn info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "policyqa",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Answers questions about policy documents, one answer per question",
        "endpoints": {
            "POST /api/v1/hackrx/run": "Answer questions about a document (bearer token)",
            "POST /api/v1/verify": "Check a document against criteria (bearer token)",
            "GET /api/info": "This description",
            "GET /health": "Liveness check"
        }
    }))
}
