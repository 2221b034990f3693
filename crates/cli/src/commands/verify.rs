//! Verify command handler.

use clap::Args;
use policyqa_answer::{DocumentSource, DocumentVerifier, StaticCorpus};
use policyqa_core::{config::AppConfig, AppError, AppResult};
use policyqa_prompt::{load_prompt, VERIFY_DOCUMENT_PROMPT};

use super::ask::DEFAULT_DOCUMENT;
use super::client::build_client;

/// Check a document against verification criteria
#[derive(Args, Debug)]
pub struct VerifyCommand {
    /// What the document must satisfy (at least 10 characters)
    #[arg(short = 'r', long)]
    pub criteria: String,

    /// Document URL to verify
    #[arg(short, long, default_value = DEFAULT_DOCUMENT)]
    pub document: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl VerifyCommand {
    /// Execute the verify command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing verify command");

        policyqa_answer::validate_criteria(&self.criteria)?;

        let verifier = DocumentVerifier::new(
            build_client(config)?,
            &config.model,
            load_prompt(&config.workspace, VERIFY_DOCUMENT_PROMPT)?,
        )
        .with_timeout(config.answering.call_timeout());

        let chunks = StaticCorpus::policy_passages()
            .fetch_chunks(&self.document)
            .await?;

        let verification = verifier
            .verify_document(&chunks, &self.criteria)
            .await
            .map_err(|e| {
                AppError::Other(format!(
                    "An unexpected error occurred: {}. Please try again.",
                    e
                ))
            })?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&verification)?);
        } else {
            let verdict = if verification.is_valid { "VALID" } else { "INVALID" };
            println!("{}: {}", verdict, verification.reason);
        }

        Ok(())
    }
}
