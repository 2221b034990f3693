//! LLM integration crate for PolicyQA.
//!
//! Provider-agnostic access to generative models through the `LlmClient`
//! trait.
//!
//! # Providers
//! - **Ollama**: local runtime (default)
//! - **Gemini**: Google Generative Language API
//! - **Mock**: scripted responses for tests
//!
//! # Example
//! ```no_run
//! use policyqa_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("What is the notice period?", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::{create_client, ClientOptions};
pub use providers::{GeminiClient, MockLlmClient, OllamaClient};
pub use types::ProviderType;
