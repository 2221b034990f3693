//! Shared LLM client setup for commands.

use policyqa_core::{config::AppConfig, AppError, AppResult};
use policyqa_llm::{create_client, ClientOptions, LlmClient};
use std::sync::Arc;
use std::time::Duration;

/// Create the configured provider's client.
pub fn build_client(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    let provider_config = config.get_provider_config(&config.provider);
    let api_key = config.resolve_api_key(&config.provider);

    let options = ClientOptions {
        endpoint: provider_config.and_then(|pc| pc.endpoint()),
        api_key: api_key.as_deref(),
        timeout: provider_config
            .and_then(|pc| pc.timeout())
            .map(Duration::from_secs),
    };

    let client = create_client(&config.provider, options).map_err(AppError::Config)?;

    tracing::debug!(provider = client.provider_name(), model = %config.model, "LLM client ready");

    Ok(client)
}
