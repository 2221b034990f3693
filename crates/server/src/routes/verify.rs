//! Document verification endpoint

use axum::{body::Bytes, extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use crate::error::ApiError;
use crate::routes::parse_body;
use crate::state::AppState;
use policyqa_answer::Verification;

/// Body of `POST /api/v1/verify`.
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyRequest {
    #[validate(required(message = "Required"), url(message = "Invalid url"))]
    pub documents: Option<String>,

    #[validate(
        required(message = "Required"),
        length(min = 10, message = "Criteria must be at least 10 characters.")
    )]
    pub criteria: Option<String>,
}

/// POST /api/v1/verify - check the document's first passage against criteria
pub async fn verify(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Verification>, ApiError> {
    let request: VerifyRequest = parse_body(&body)?;
    let documents = request.documents.unwrap_or_default();
    let criteria = request.criteria.unwrap_or_default();

    let chunks = state.documents().fetch_chunks(&documents).await?;
    let verification = state.verifier().verify_document(&chunks, &criteria).await?;

    Ok(Json(verification))
}
