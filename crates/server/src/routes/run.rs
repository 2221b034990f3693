//! Batch question answering endpoint

use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use crate::error::ApiError;
use crate::routes::parse_body;
use crate::state::AppState;
use policyqa_answer::Query;

/// Body of `POST /api/v1/hackrx/run`.
#[derive(Debug, Deserialize, Validate)]
pub struct RunRequest {
    /// Document URL
    #[validate(required(message = "Required"), url(message = "Invalid url"))]
    pub documents: Option<String>,

    #[validate(
        required(message = "Required"),
        length(min = 1, message = "Array must contain at least 1 element(s)"),
        custom(function = "non_blank_questions")
    )]
    pub questions: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunResponse {
    pub answers: Vec<String>,
}

fn non_blank_questions(questions: &[String]) -> Result<(), ValidationError> {
    if questions.iter().any(|q| q.is_empty()) {
        return Err(ValidationError::new("blank_question")
            .with_message(Cow::Borrowed("String must contain at least 1 character(s)")));
    }
    Ok(())
}

/// POST /api/v1/hackrx/run - answer every question about a document
///
/// Each submitted question is answered as given, so `answers[i]` belongs to
/// `questions[i]`.
pub async fn run(State(state): State<AppState>, body: Bytes) -> Result<Json<RunResponse>, ApiError> {
    let request: RunRequest = parse_body(&body)?;
    let documents = request.documents.unwrap_or_default();
    let questions = request.questions.unwrap_or_default();

    tracing::info!(questions = questions.len(), document = %documents, "Run request");

    let chunks = state.documents().fetch_chunks(&documents).await?;
    let query = Query::Many(questions);
    let answers = state.orchestrator().answer(&query, &chunks).await?.into_list();

    Ok(Json(RunResponse { answers }))
}
