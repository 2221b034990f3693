//! Question answering over policy documents.
//!
//! - [`splitter`]: free-text query to ordered questions
//! - [`extractor`]: one question to one answer through the model
//! - [`orchestrator`]: concurrent fan-out with an ordered, all-or-nothing join
//! - [`verifier`]: check a document against criteria
//! - [`corpus`]: document sources

pub mod corpus;
pub mod extractor;
pub mod orchestrator;
pub mod splitter;
pub mod verifier;

pub use corpus::{DocumentSource, StaticCorpus};
pub use extractor::AnswerExtractor;
pub use orchestrator::{
    AnswerOrchestrator, CombinedAnswer, OutputForm, ANSWER_SEPARATOR, FALLBACK_MESSAGE,
};
pub use splitter::{resolve_questions, split_questions, Query, SplitPolicy};
pub use verifier::{validate_criteria, DocumentVerifier, Verification, MIN_CRITERIA_CHARS};
