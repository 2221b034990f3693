//! Shared application state for the HTTP server.

use policyqa_answer::{
    AnswerExtractor, AnswerOrchestrator, DocumentSource, DocumentVerifier, OutputForm,
    SplitPolicy, StaticCorpus,
};
use policyqa_core::{AppConfig, AppError, AppResult};
use policyqa_llm::LlmClient;
use policyqa_prompt::{load_prompt, EXTRACT_ANSWER_PROMPT, VERIFY_DOCUMENT_PROMPT};
use std::sync::Arc;

/// Shared, cheaply cloned handler state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Answers in list form, one entry per question
    orchestrator: AnswerOrchestrator,
    verifier: DocumentVerifier,
    documents: Arc<dyn DocumentSource>,
    /// Shared secret expected in the bearer header
    auth_token: String,
}

impl AppState {
    /// Assemble state from parts. The orchestrator is switched to list form.
    pub fn new(
        orchestrator: AnswerOrchestrator,
        verifier: DocumentVerifier,
        documents: Arc<dyn DocumentSource>,
        auth_token: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                orchestrator: orchestrator.with_form(OutputForm::List),
                verifier,
                documents,
                auth_token: auth_token.into(),
            }),
        }
    }

    /// Build state from configuration, the static policy corpus and `client`.
    pub fn from_config(config: &AppConfig, client: Arc<dyn LlmClient>) -> AppResult<Self> {
        let auth_token = config
            .server
            .auth_token
            .clone()
            .ok_or_else(|| AppError::Config("Server auth token is not configured".to_string()))?;

        let policy = SplitPolicy::parse(&config.answering.split_policy)?;
        let timeout = config.answering.call_timeout();

        let extractor = AnswerExtractor::new(
            client.clone(),
            &config.model,
            load_prompt(&config.workspace, EXTRACT_ANSWER_PROMPT)?,
        )
        .with_timeout(timeout)
        .with_sampling(config.answering.temperature, config.answering.max_tokens);

        let verifier = DocumentVerifier::new(
            client,
            &config.model,
            load_prompt(&config.workspace, VERIFY_DOCUMENT_PROMPT)?,
        )
        .with_timeout(timeout);

        tracing::info!(
            split_policy = policy.as_str(),
            model = %config.model,
            "Server state initialized"
        );

        Ok(Self::new(
            AnswerOrchestrator::new(Arc::new(extractor), policy, OutputForm::List),
            verifier,
            Arc::new(StaticCorpus::policy_passages()),
            auth_token,
        ))
    }

    pub fn orchestrator(&self) -> &AnswerOrchestrator {
        &self.inner.orchestrator
    }

    pub fn verifier(&self) -> &DocumentVerifier {
        &self.inner.verifier
    }

    pub fn documents(&self) -> &dyn DocumentSource {
        self.inner.documents.as_ref()
    }

    pub fn auth_token(&self) -> &str {
        &self.inner.auth_token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use policyqa_answer::OutputForm;
    use policyqa_llm::MockLlmClient;
    use std::time::Duration;

    #[test]
    fn test_from_config_requires_token() {
        let result = AppState::from_config(&AppConfig::default(), Arc::new(MockLlmClient::fixed("{}")));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_from_config_uses_list_form_and_policy() {
        let mut config = AppConfig::default();
        config.server.auth_token = Some("secret".to_string());
        config.answering.split_policy = "delimiter".to_string();

        let state = AppState::from_config(&config, Arc::new(MockLlmClient::fixed("{}"))).unwrap();

        assert_eq!(state.auth_token(), "secret");
        assert_eq!(state.orchestrator().form(), OutputForm::List);
        assert_eq!(state.orchestrator().policy(), SplitPolicy::Delimiter);
    }

    #[tokio::test(start_paused = true)]
    async fn test_from_config_applies_call_settings() {
        let mut config = AppConfig::default();
        config.server.auth_token = Some("secret".to_string());
        config.answering.extraction_timeout_secs = Some(5);
        config.answering.temperature = Some(0.3);
        config.answering.max_tokens = Some(200);

        let client = MockLlmClient::new(|request| {
            assert_eq!(request.temperature, Some(0.3));
            assert_eq!(request.max_tokens, Some(200));
            Ok(r#"{"answer": "Yes."}"#.to_string())
        });
        let state = AppState::from_config(&config, Arc::new(client)).unwrap();
        let answers = state
            .orchestrator()
            .answer(&"Is it covered?".into(), &["Covered.".to_string()])
            .await
            .unwrap()
            .into_list();
        assert_eq!(answers, vec!["Yes.".to_string()]);

        let slow = MockLlmClient::fixed(r#"{"isValid": true, "reason": "late"}"#)
            .with_latency(|_| Duration::from_secs(60));
        let state = AppState::from_config(&config, Arc::new(slow)).unwrap();
        let result = state
            .verifier()
            .verify("Covered.", "long enough criteria")
            .await;
        assert!(matches!(result, Err(AppError::Generation(_))));
    }

    #[test]
    fn test_from_config_rejects_unknown_policy() {
        let mut config = AppConfig::default();
        config.server.auth_token = Some("secret".to_string());
        config.answering.split_policy = "sentences".to_string();

        assert!(AppState::from_config(&config, Arc::new(MockLlmClient::fixed("{}"))).is_err());
    }
}
