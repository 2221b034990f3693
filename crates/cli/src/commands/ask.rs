//! Ask command handler.
//!
//! Answers one or more questions about a policy document.

use clap::Args;
use policyqa_answer::{
    AnswerExtractor, AnswerOrchestrator, CombinedAnswer, DocumentSource, OutputForm, Query,
    SplitPolicy, StaticCorpus,
};
use policyqa_core::{config::AppConfig, AppError, AppResult};
use policyqa_prompt::{load_prompt, EXTRACT_ANSWER_PROMPT};
use std::path::PathBuf;
use std::sync::Arc;

use super::client::build_client;

/// Longest free-text query accepted, in characters.
pub const MAX_QUERY_CHARS: usize = 500;

/// Document reference used when none is given.
pub const DEFAULT_DOCUMENT: &str = "builtin://policy-corpus";

/// Ask one or more questions about a policy document
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The query; may hold several questions separated by '?' or newlines
    pub query: Option<String>,

    /// An explicit question (repeatable); skips question splitting
    #[arg(short = 'q', long = "question", conflicts_with_all = ["query", "file"])]
    pub questions: Vec<String>,

    /// Read the query from a file
    #[arg(short, long, conflicts_with = "query")]
    pub file: Option<PathBuf>,

    /// Document URL to answer from
    #[arg(short, long, default_value = DEFAULT_DOCUMENT)]
    pub document: String,

    /// Question split policy (line, delimiter); defaults to the configured one
    #[arg(long)]
    pub split_policy: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let query = self.read_query()?;
        validate_query(&query)?;

        let policy = SplitPolicy::parse(
            self.split_policy
                .as_deref()
                .unwrap_or(&config.answering.split_policy),
        )?;

        let orchestrator = build_orchestrator(config, policy, self.output_form())?;
        let corpus = StaticCorpus::policy_passages();

        let answer = answer_query(&orchestrator, &corpus, &self.document, &query)
            .await
            .map_err(|e| {
                AppError::Other(format!(
                    "An unexpected error occurred: {}. Please try again.",
                    e
                ))
            })?;

        self.print(answer)
    }

    fn output_form(&self) -> OutputForm {
        if self.json {
            OutputForm::List
        } else {
            OutputForm::Joined
        }
    }

    /// Get the query from the explicit questions, the argument or the file.
    fn read_query(&self) -> AppResult<Query> {
        if !self.questions.is_empty() {
            return Ok(Query::Many(self.questions.clone()));
        }

        if let Some(ref text) = self.query {
            return Ok(Query::Single(text.clone()));
        }

        if let Some(ref path) = self.file {
            let text = std::fs::read_to_string(path).map_err(|e| {
                AppError::Config(format!("Failed to read query file {:?}: {}", path, e))
            })?;
            return Ok(Query::Single(text));
        }

        Err(AppError::Validation("No query provided".to_string()))
    }

    fn print(&self, answer: CombinedAnswer) -> AppResult<()> {
        if self.json {
            let output = serde_json::json!({ "answers": answer.into_list() });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", answer);
        }
        Ok(())
    }
}

/// A free-text query must hold 1 to [`MAX_QUERY_CHARS`] characters.
fn validate_query(query: &Query) -> AppResult<()> {
    let invalid = match query {
        Query::Single(text) => text.is_empty() || text.chars().count() > MAX_QUERY_CHARS,
        Query::Many(questions) => questions.iter().any(|q| q.trim().is_empty()),
    };

    if invalid {
        return Err(AppError::Validation(format!(
            "Invalid input: a query must be between 1 and {} characters",
            MAX_QUERY_CHARS
        )));
    }

    Ok(())
}

fn build_orchestrator(
    config: &AppConfig,
    policy: SplitPolicy,
    form: OutputForm,
) -> AppResult<AnswerOrchestrator> {
    let client = build_client(config)?;
    let extractor = AnswerExtractor::new(
        client,
        &config.model,
        load_prompt(&config.workspace, EXTRACT_ANSWER_PROMPT)?,
    )
    .with_timeout(config.answering.call_timeout())
    .with_sampling(config.answering.temperature, config.answering.max_tokens);

    Ok(AnswerOrchestrator::new(Arc::new(extractor), policy, form))
}

async fn answer_query(
    orchestrator: &AnswerOrchestrator,
    source: &dyn DocumentSource,
    document: &str,
    query: &Query,
) -> AppResult<CombinedAnswer> {
    let chunks = source.fetch_chunks(document).await?;
    tracing::debug!("Answering from {} chunks", chunks.len());
    orchestrator.answer(query, &chunks).await
}
