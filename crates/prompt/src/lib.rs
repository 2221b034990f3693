//! Prompt system for PolicyQA.
//!
//! Structured prompt management with:
//! - YAML prompt definitions, built in and overridable per workspace
//! - Handlebars template rendering
//! - JSON response schemas for structured model output

pub mod builder;
pub mod loader;
pub mod types;

pub use builder::build_prompt;
pub use loader::{builtin_prompt, load_prompt, EXTRACT_ANSWER_PROMPT, VERIFY_DOCUMENT_PROMPT};
pub use types::{
    BuiltPrompt, BuiltPromptMetadata, PromptBehavior, PromptDefinition, PromptInputSpec,
    PromptOutputSpec,
};
