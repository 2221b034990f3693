//! HTTP server for PolicyQA.
//!
//! Serves the authenticated batch-answer endpoint, document verification and
//! health checks over axum.

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::{middleware, routing::get, Router};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use policyqa_core::{AppConfig, AppError, AppResult};

pub use error::{ApiError, ValidationDetails};
pub use state::AppState;

/// PolicyQA HTTP server
pub struct PolicyQaServer {
    host: String,
    port: u16,
    state: AppState,
}

impl PolicyQaServer {
    pub fn new(config: &AppConfig, state: AppState) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            state,
        }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let protected = routes::api_routes().route_layer(middleware::from_fn_with_state(
            self.state.clone(),
            auth::require_bearer,
        ));

        Router::new()
            .route("/health", get(health_check))
            .route("/api/info", get(routes::info))
            .nest("/api/v1", protected)
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Bind and serve until the process stops.
    pub async fn start(self) -> AppResult<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid address: {}", e)))?;

        let router = self.build_router();

        tracing::info!("Starting PolicyQA server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", addr, e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| AppError::Other(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use policyqa_answer::{
        AnswerExtractor, AnswerOrchestrator, DocumentVerifier, OutputForm, SplitPolicy,
        StaticCorpus,
    };
    use policyqa_llm::{LlmRequest, MockLlmClient};
    use policyqa_prompt::{builtin_prompt, EXTRACT_ANSWER_PROMPT, VERIFY_DOCUMENT_PROMPT};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    const TOKEN: &str = "test-token";
    const DOC: &str = "https://example.com/policy.pdf";

    fn question_of(request: &LlmRequest) -> String {
        request
            .prompt
            .lines()
            .skip_while(|line| !line.starts_with("User's Question:"))
            .nth(1)
            .unwrap_or_default()
            .to_string()
    }

    fn respond(request: &LlmRequest) -> policyqa_core::AppResult<String> {
        if request.prompt.contains("verification criteria") {
            return Ok(json!({ "isValid": true, "reason": "Matches." }).to_string());
        }
        let question = question_of(request);
        if question.contains("explode") {
            return Err(AppError::Llm("model unavailable".to_string()));
        }
        Ok(json!({ "answer": format!("Answer to {}", question) }).to_string())
    }

    fn test_router(client: Arc<MockLlmClient>) -> Router {
        let extractor = AnswerExtractor::new(
            client.clone(),
            "test-model",
            builtin_prompt(EXTRACT_ANSWER_PROMPT).unwrap(),
        );
        let verifier = DocumentVerifier::new(
            client,
            "test-model",
            builtin_prompt(VERIFY_DOCUMENT_PROMPT).unwrap(),
        );
        let state = AppState::new(
            AnswerOrchestrator::new(
                Arc::new(extractor),
                SplitPolicy::LineQuestionMark,
                OutputForm::Joined,
            ),
            verifier,
            Arc::new(StaticCorpus::policy_passages()),
            TOKEN,
        );

        PolicyQaServer::new(&AppConfig::default(), state).build_router()
    }

    fn post(uri: &str, auth: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(auth) = auth {
            builder = builder.header("authorization", auth);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn bearer() -> String {
        format!("Bearer {}", TOKEN)
    }

    #[tokio::test]
    async fn test_health() {
        let router = test_router(Arc::new(MockLlmClient::new(respond)));
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_info() {
        let router = test_router(Arc::new(MockLlmClient::new(respond)));
        let request = Request::builder().uri("/api/info").body(Body::empty()).unwrap();
        let (status, body) = send(router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "policyqa");
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let client = Arc::new(MockLlmClient::new(respond));
        let body = json!({ "documents": DOC, "questions": ["Q?"] }).to_string();

        let (status, json) = send(test_router(client.clone()), post("/api/v1/hackrx/run", None, &body)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "Unauthorized: Missing or invalid token");
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_wrong_token_is_unauthorized() {
        let client = Arc::new(MockLlmClient::new(respond));
        let body = json!({ "documents": DOC, "questions": ["Q?"] }).to_string();

        let (status, json) = send(
            test_router(client.clone()),
            post("/api/v1/hackrx/run", Some("Bearer wrong"), &body),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "Unauthorized: Invalid token");
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_auth_checked_before_body() {
        let router = test_router(Arc::new(MockLlmClient::new(respond)));
        let (status, _) = send(router, post("/api/v1/hackrx/run", None, "not json")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_questions_is_bad_request() {
        let client = Arc::new(MockLlmClient::new(respond));
        let body = json!({ "documents": DOC }).to_string();

        let (status, json) = send(
            test_router(client.clone()),
            post("/api/v1/hackrx/run", Some(&bearer()), &body),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid request body");
        assert_eq!(json["details"]["fieldErrors"]["questions"][0], "Required");
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_fields_are_reported() {
        let router = test_router(Arc::new(MockLlmClient::new(respond)));
        let body = json!({ "documents": "not a url", "questions": [] }).to_string();

        let (status, json) = send(router, post("/api/v1/hackrx/run", Some(&bearer()), &body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields = &json["details"]["fieldErrors"];
        assert_eq!(fields["documents"][0], "Invalid url");
        assert_eq!(
            fields["questions"][0],
            "Array must contain at least 1 element(s)"
        );
    }

    #[tokio::test]
    async fn test_empty_question_string_is_rejected() {
        let router = test_router(Arc::new(MockLlmClient::new(respond)));
        let body = json!({ "documents": DOC, "questions": ["Q?", ""] }).to_string();

        let (status, json) = send(router, post("/api/v1/hackrx/run", Some(&bearer()), &body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["details"]["fieldErrors"]["questions"].is_array());
    }

    #[tokio::test]
    async fn test_malformed_json_is_form_error() {
        let router = test_router(Arc::new(MockLlmClient::new(respond)));

        let (status, json) =
            send(router, post("/api/v1/hackrx/run", Some(&bearer()), "{\"questions\": 5")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["details"]["formErrors"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_single_question_returns_one_answer() {
        let client = Arc::new(MockLlmClient::new(respond));
        let body = json!({ "documents": DOC, "questions": ["What is the grace period?"] }).to_string();

        let (status, json) = send(
            test_router(client.clone()),
            post("/api/v1/hackrx/run", Some(&bearer()), &body),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "answers": ["Answer to What is the grace period?"] }));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_answers_follow_question_order() {
        let router = test_router(Arc::new(MockLlmClient::new(respond)));
        let body = json!({
            "documents": DOC,
            "questions": ["Is cataract covered?", "What is the NCD?", "Is AYUSH covered?"]
        })
        .to_string();

        let (status, json) = send(router, post("/api/v1/hackrx/run", Some(&bearer()), &body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["answers"],
            json!([
                "Answer to Is cataract covered?",
                "Answer to What is the NCD?",
                "Answer to Is AYUSH covered?"
            ])
        );
    }

    #[tokio::test]
    async fn test_duplicate_questions_each_get_an_answer() {
        let client = Arc::new(MockLlmClient::new(respond));
        let body = json!({
            "documents": DOC,
            "questions": ["What is the grace period?", "What is the grace period?"]
        })
        .to_string();

        let (status, json) = send(
            test_router(client.clone()),
            post("/api/v1/hackrx/run", Some(&bearer()), &body),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["answers"].as_array().unwrap().len(), 2);
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_question_with_two_marks_gets_one_answer() {
        let router = test_router(Arc::new(MockLlmClient::new(respond)));
        let body = json!({
            "documents": DOC,
            "questions": ["Is cataract covered? How long is the wait?"]
        })
        .to_string();

        let (status, json) = send(router, post("/api/v1/hackrx/run", Some(&bearer()), &body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["answers"],
            json!(["Answer to Is cataract covered? How long is the wait?"])
        );
    }

    #[tokio::test]
    async fn test_extraction_failure_is_internal_error() {
        let router = test_router(Arc::new(MockLlmClient::new(respond)));
        let body = json!({ "documents": DOC, "questions": ["Fine?", "Will this explode?"] }).to_string();

        let (status, json) = send(router, post("/api/v1/hackrx/run", Some(&bearer()), &body)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error = json["error"].as_str().unwrap();
        assert!(error.starts_with("An unexpected error occurred: "));
        assert!(error.contains("model unavailable"));
    }

    #[tokio::test]
    async fn test_verify_endpoint() {
        let router = test_router(Arc::new(MockLlmClient::new(respond)));
        let body = json!({ "documents": DOC, "criteria": "Must describe annual leave" }).to_string();

        let (status, json) = send(router, post("/api/v1/verify", Some(&bearer()), &body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "isValid": true, "reason": "Matches." }));
    }

    #[tokio::test]
    async fn test_verify_rejects_short_criteria() {
        let client = Arc::new(MockLlmClient::new(respond));
        let body = json!({ "documents": DOC, "criteria": "short" }).to_string();

        let (status, json) =
            send(test_router(client.clone()), post("/api/v1/verify", Some(&bearer()), &body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["details"]["fieldErrors"]["criteria"].is_array());
        assert_eq!(client.calls(), 0);
    }
}
