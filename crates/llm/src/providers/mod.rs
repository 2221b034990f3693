//! LLM provider implementations.

pub mod gemini;
pub mod mock;
pub mod ollama;

pub use gemini::GeminiClient;
pub use mock::MockLlmClient;
pub use ollama::OllamaClient;
