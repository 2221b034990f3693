//! Multi-question answering.
//!
//! The orchestrator resolves a query into questions, answers all of them
//! concurrently and reassembles the answers in question order. The batch is
//! all-or-nothing: one failed extraction fails the whole call.

use crate::extractor::AnswerExtractor;
use crate::splitter::{resolve_questions, Query, SplitPolicy};
use futures::future::try_join_all;
use policyqa_core::AppResult;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Returned in place of answers when the query holds no question.
pub const FALLBACK_MESSAGE: &str =
    "I couldn't identify a specific question in your query. Please try rephrasing.";

/// Separator between answers in [`CombinedAnswer::Joined`].
pub const ANSWER_SEPARATOR: &str = "\n\n";

/// Shape of the orchestrator's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputForm {
    /// One entry per question
    #[default]
    List,
    /// Answers joined by a single blank line
    Joined,
}

/// The answers to a query, in question order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CombinedAnswer {
    List(Vec<String>),
    Joined(String),
}

impl CombinedAnswer {
    fn from_answers(answers: Vec<String>, form: OutputForm) -> Self {
        match form {
            OutputForm::List => CombinedAnswer::List(answers),
            OutputForm::Joined => CombinedAnswer::Joined(answers.join(ANSWER_SEPARATOR)),
        }
    }

    /// The answers as a list; a joined answer becomes a single entry.
    pub fn into_list(self) -> Vec<String> {
        match self {
            CombinedAnswer::List(answers) => answers,
            CombinedAnswer::Joined(text) => vec![text],
        }
    }
}

impl fmt::Display for CombinedAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombinedAnswer::List(answers) => write!(f, "{}", answers.join(ANSWER_SEPARATOR)),
            CombinedAnswer::Joined(text) => write!(f, "{}", text),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    Splitting,
    Extracting,
    Done,
}

impl Stage {
    fn as_str(&self) -> &'static str {
        match self {
            Stage::Splitting => "splitting",
            Stage::Extracting => "extracting",
            Stage::Done => "done",
        }
    }
}

/// Fans an [`AnswerExtractor`] out over every question in a query.
#[derive(Clone)]
pub struct AnswerOrchestrator {
    extractor: Arc<AnswerExtractor>,
    policy: SplitPolicy,
    form: OutputForm,
}

impl AnswerOrchestrator {
    pub fn new(extractor: Arc<AnswerExtractor>, policy: SplitPolicy, form: OutputForm) -> Self {
        Self {
            extractor,
            policy,
            form,
        }
    }

    pub fn policy(&self) -> SplitPolicy {
        self.policy
    }

    pub fn form(&self) -> OutputForm {
        self.form
    }

    /// Same extractor and policy, different output form.
    pub fn with_form(&self, form: OutputForm) -> Self {
        Self {
            extractor: self.extractor.clone(),
            policy: self.policy,
            form,
        }
    }

    /// Answer every question in `query` from `chunks`.
    ///
    /// Extractions run concurrently on the calling task. Answers come back in
    /// question order regardless of completion order. A query with no
    /// question yields [`FALLBACK_MESSAGE`] without calling the model.
    ///
    /// # Errors
    /// The first extraction failure; no partial answers are returned.
    pub async fn answer(&self, query: &Query, chunks: &[String]) -> AppResult<CombinedAnswer> {
        trace_stage(Stage::Splitting, 0);
        let questions = resolve_questions(query, self.policy);

        if questions.is_empty() {
            tracing::info!("No question found in query, returning fallback message");
            trace_stage(Stage::Done, 0);
            return Ok(CombinedAnswer::from_answers(
                vec![FALLBACK_MESSAGE.to_string()],
                self.form,
            ));
        }

        trace_stage(Stage::Extracting, questions.len());

        let extractions = questions
            .iter()
            .map(|question| self.extractor.extract(question, chunks));

        let answers = try_join_all(extractions).await.inspect_err(|e| {
            tracing::warn!("Answer batch failed: {}", e);
        })?;

        trace_stage(Stage::Done, answers.len());

        Ok(CombinedAnswer::from_answers(answers, self.form))
    }
}

fn trace_stage(stage: Stage, questions: usize) {
    tracing::debug!(stage = stage.as_str(), questions, "Orchestrator state");
}
