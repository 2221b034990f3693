//! Question splitting.
//!
//! Turns one free-text query into the ordered list of questions the
//! orchestrator answers. Both policies are pure functions of their input.

use policyqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// A caller's query: free text, or questions already separated by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Query {
    /// Free text that may hold several questions
    Single(String),
    /// Questions used verbatim, in order
    Many(Vec<String>),
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Query::Single(text.to_string())
    }
}

impl From<String> for Query {
    fn from(text: String) -> Self {
        Query::Single(text)
    }
}

impl From<Vec<String>> for Query {
    fn from(questions: Vec<String>) -> Self {
        Query::Many(questions)
    }
}

/// How a single free-text query is split into questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitPolicy {
    /// Lines first, then `?` within each line, de-duplicated
    #[default]
    LineQuestionMark,
    /// One pass over `\n` and `?`, dropping fragments of one character
    Delimiter,
}

impl SplitPolicy {
    /// Parse a policy from a configuration string.
    pub fn parse(s: &str) -> AppResult<Self> {
        match s.to_lowercase().as_str() {
            "line" | "line-question-mark" => Ok(Self::LineQuestionMark),
            "delimiter" | "regex" => Ok(Self::Delimiter),
            other => Err(AppError::Config(format!(
                "Unknown split policy: {}. Expected 'line' or 'delimiter'",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LineQuestionMark => "line",
            Self::Delimiter => "delimiter",
        }
    }
}

/// Split free text into questions, each re-terminated with `?`.
///
/// # Example
/// ```
/// use policyqa_answer::{split_questions, SplitPolicy};
///
/// let questions = split_questions("Leave days? Remote work?", SplitPolicy::LineQuestionMark);
/// assert_eq!(questions, vec!["Leave days?", "Remote work?"]);
/// ```
pub fn split_questions(text: &str, policy: SplitPolicy) -> Vec<String> {
    match policy {
        SplitPolicy::LineQuestionMark => split_lines_then_marks(text),
        SplitPolicy::Delimiter => split_on_delimiters(text),
    }
}

/// Resolve a query into the questions to answer.
///
/// `Query::Many` bypasses splitting entirely.
pub fn resolve_questions(query: &Query, policy: SplitPolicy) -> Vec<String> {
    match query {
        Query::Single(text) => split_questions(text, policy),
        Query::Many(questions) => questions.clone(),
    }
}

fn split_lines_then_marks(text: &str) -> Vec<String> {
    let mut questions: Vec<String> = Vec::new();

    for line in text.lines() {
        for fragment in line.trim().split('?') {
            let fragment = fragment.trim();
            if fragment.is_empty() {
                continue;
            }

            let question = format!("{}?", fragment);
            if !questions.contains(&question) {
                questions.push(question);
            }
        }
    }

    questions
}

fn split_on_delimiters(text: &str) -> Vec<String> {
    text.split(['\n', '?'])
        .map(str::trim)
        .filter(|fragment| fragment.chars().count() > 1)
        .map(|fragment| format!("{}?", fragment))
        .collect()
}
