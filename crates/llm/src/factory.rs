//! LLM provider factory.
//!
//! Resolves a provider name plus optional endpoint, secret and timeout into a
//! shared client.

use crate::client::LlmClient;
use crate::providers::{GeminiClient, OllamaClient};
use crate::types::ProviderType;
use std::sync::Arc;
use std::time::Duration;

/// Connection settings for building a client.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions<'a> {
    /// Custom endpoint URL
    pub endpoint: Option<&'a str>,

    /// API key for providers that require one
    pub api_key: Option<&'a str>,

    /// HTTP timeout per request
    pub timeout: Option<Duration>,
}

/// Create an LLM client based on the provider name.
///
/// # Errors
/// Returns an error if the provider is unknown or a required secret is missing.
pub fn create_client(
    provider: &str,
    options: ClientOptions<'_>,
) -> Result<Arc<dyn LlmClient>, String> {
    let provider_type =
        ProviderType::parse(provider).ok_or_else(|| format!("Unknown provider: {}", provider))?;

    let api_key = options.api_key.filter(|key| !key.is_empty());
    if provider_type.requires_api_key() && api_key.is_none() {
        return Err(format!("Provider {} requires API key", provider_type.as_str()));
    }

    match provider_type {
        ProviderType::Ollama => {
            let mut client = match options.endpoint {
                Some(endpoint) => OllamaClient::with_base_url(endpoint),
                None => OllamaClient::new(),
            };
            if let Some(timeout) = options.timeout {
                client = client.with_timeout(timeout);
            }
            Ok(Arc::new(client))
        }
        ProviderType::Gemini => {
            let api_key = api_key.unwrap_or_default();

            let mut client = match options.endpoint {
                Some(endpoint) => GeminiClient::with_base_url(endpoint, api_key),
                None => GeminiClient::new(api_key),
            };
            if let Some(timeout) = options.timeout {
                client = client.with_timeout(timeout);
            }
            Ok(Arc::new(client))
        }
    }
}
