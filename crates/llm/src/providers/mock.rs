//! Scripted LLM provider for tests and offline runs.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use policyqa_core::AppResult;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

type Responder = dyn Fn(&LlmRequest) -> AppResult<String> + Send + Sync;
type Latency = dyn Fn(&LlmRequest) -> Duration + Send + Sync;

/// Mock provider whose output is computed by a closure.
///
/// The responder sees the fully built request, so a test can answer per
/// question, fail selectively, or assert on the prompt. An optional latency
/// function delays each call on the Tokio timer before responding.
pub struct MockLlmClient {
    responder: Arc<Responder>,
    latency: Option<Arc<Latency>>,
    calls: AtomicUsize,
}

impl MockLlmClient {
    /// Create a mock driven by `responder`.
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&LlmRequest) -> AppResult<String> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            latency: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a mock that always returns `content`.
    pub fn fixed(content: impl Into<String>) -> Self {
        let content = content.into();
        Self::new(move |_| Ok(content.clone()))
    }

    /// Delay every call by the duration computed from its request.
    pub fn with_latency<F>(mut self, latency: F) -> Self
    where
        F: Fn(&LlmRequest) -> Duration + Send + Sync + 'static,
    {
        self.latency = Some(Arc::new(latency));
        self
    }

    /// Number of completions requested so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlmClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = &self.latency {
            tokio::time::sleep(latency(request)).await;
        }

        let content = (self.responder)(request)?;

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::default(),
            done: true,
        })
    }
}
