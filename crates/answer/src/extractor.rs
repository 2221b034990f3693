//! Single-question answer extraction.

use policyqa_core::{AppError, AppResult};
use policyqa_llm::{LlmClient, LlmRequest};
use policyqa_prompt::{build_prompt, PromptDefinition};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractVariables<'a> {
    question: &'a str,
    document_chunks: &'a [String],
}

#[derive(Deserialize)]
struct ExtractOutput {
    answer: String,
}

/// Answers one question strictly from the supplied document chunks.
///
/// Each call issues exactly one structured completion. Any failure of that
/// call, including a missing or malformed `answer`, surfaces as
/// [`AppError::Generation`].
pub struct AnswerExtractor {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
    timeout: Option<Duration>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl AnswerExtractor {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, prompt: PromptDefinition) -> Self {
        Self {
            client,
            model: model.into(),
            prompt,
            timeout: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Bound each model call; elapsing counts as a generation failure.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sampling settings sent with every call; `None` keeps the provider default.
    pub fn with_sampling(mut self, temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Answer `question` using only `chunks`.
    pub async fn extract(&self, question: &str, chunks: &[String]) -> AppResult<String> {
        let built = build_prompt(
            &self.prompt,
            &ExtractVariables {
                question,
                document_chunks: chunks,
            },
        )?;

        let mut request = LlmRequest::new(built.user, &self.model);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }
        if let Some(schema) = built.response_schema {
            request = request.with_response_schema(schema);
        }
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        tracing::debug!(
            provider = self.client.provider_name(),
            model = %self.model,
            chunks = chunks.len(),
            "Extracting answer for: {}",
            question
        );

        let completion = self.client.complete(&request);
        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, completion).await.map_err(|_| {
                AppError::Generation(format!("model call timed out after {:?}", limit))
            })?,
            None => completion.await,
        }
        .map_err(into_generation)?;

        parse_answer(&response.content)
    }
}

fn into_generation(err: AppError) -> AppError {
    match err {
        AppError::Generation(_) => err,
        AppError::Llm(msg) => AppError::Generation(msg),
        other => AppError::Generation(other.to_string()),
    }
}

fn parse_answer(content: &str) -> AppResult<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AppError::Generation("model returned no output".to_string()));
    }

    let output: ExtractOutput = serde_json::from_str(trimmed).map_err(|e| {
        AppError::Generation(format!("model output is not a valid answer object: {}", e))
    })?;

    Ok(output.answer)
}
