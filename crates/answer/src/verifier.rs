//! Document verification against free-text criteria.

use policyqa_core::{AppError, AppResult};
use policyqa_llm::{LlmClient, LlmRequest};
use policyqa_prompt::{build_prompt, PromptDefinition};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Minimum length of verification criteria, in characters.
pub const MIN_CRITERIA_CHARS: usize = 10;

/// Outcome of checking a document against criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    pub is_valid: bool,
    pub reason: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyVariables<'a> {
    document_chunk: &'a str,
    criteria: &'a str,
}

/// Checks document content against caller-supplied criteria.
pub struct DocumentVerifier {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
    timeout: Option<Duration>,
}

impl DocumentVerifier {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, prompt: PromptDefinition) -> Self {
        Self {
            client,
            model: model.into(),
            prompt,
            timeout: None,
        }
    }

    /// Bound the model call; elapsing counts as a generation failure.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Verify the first chunk of a document against `criteria`.
    pub async fn verify_document(&self, chunks: &[String], criteria: &str) -> AppResult<Verification> {
        let first = chunks
            .first()
            .ok_or_else(|| AppError::Validation("Document has no content to verify".to_string()))?;
        self.verify(first, criteria).await
    }

    /// Verify one chunk against `criteria`.
    pub async fn verify(&self, chunk: &str, criteria: &str) -> AppResult<Verification> {
        validate_criteria(criteria)?;

        let built = build_prompt(
            &self.prompt,
            &VerifyVariables {
                document_chunk: chunk,
                criteria: criteria.trim(),
            },
        )?;

        let mut request = LlmRequest::new(built.user, &self.model);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }
        if let Some(schema) = built.response_schema {
            request = request.with_response_schema(schema);
        }

        let completion = self.client.complete(&request);
        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, completion).await.map_err(|_| {
                AppError::Generation(format!("verification timed out after {:?}", limit))
            })?,
            None => completion.await,
        }
        .map_err(|e| match e {
            AppError::Llm(msg) => AppError::Generation(msg),
            other => other,
        })?;

        let verification: Verification = serde_json::from_str(response.content.trim())
            .map_err(|e| AppError::Generation(format!("model output is not a verification: {}", e)))?;

        tracing::info!(is_valid = verification.is_valid, "Document verified");

        Ok(verification)
    }
}

/// Criteria must hold at least [`MIN_CRITERIA_CHARS`] characters after trimming.
pub fn validate_criteria(criteria: &str) -> AppResult<()> {
    if criteria.trim().chars().count() < MIN_CRITERIA_CHARS {
        return Err(AppError::Validation(format!(
            "Criteria must be at least {} characters",
            MIN_CRITERIA_CHARS
        )));
    }
    Ok(())
}
