//! Common test utilities for in-process API testing with mocks.
//!
//! This module provides a test fixture that builds the router around a
//! pipeline wired to mock generator and publisher, an in-memory ledger and
//! a static catalog.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use dailydose_core::{
    testing::{MemoryLedgerStore, MockContentGenerator, MockPublisher, StaticTopicCatalog},
    ContentGenerator, ExhaustionPolicy, LedgerStore, Pipeline, PipelineError, PromptTemplate, PublishTarget,
    Publisher, RunMode, TopicCatalog, TopicRotator,
};
use dailydose_server::state::AppState;

/// Re-export fixtures for test convenience
pub use dailydose_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_preview() {
///     let fixture = TestFixture::new();
///     let response = fixture.post("/api/v1/generate").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    pub router: Router,
    pub generator: Arc<MockContentGenerator>,
    pub publisher: Arc<MockPublisher>,
    pub ledger: Arc<MemoryLedgerStore>,
    pub catalog: Arc<StaticTopicCatalog>,
}

/// Options for [`TestFixture::with_options`].
pub struct TestOptions {
    pub topics: Vec<&'static str>,
    pub published: Vec<&'static str>,
    pub run_mode: RunMode,
    pub on_exhausted: ExhaustionPolicy,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            topics: fixtures::devops_topics(),
            published: Vec::new(),
            run_mode: RunMode::Preview,
            on_exhausted: ExhaustionPolicy::Fail,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    pub fn new() -> Self {
        Self::with_options(TestOptions::default())
    }

    pub fn with_options(options: TestOptions) -> Self {
        let generator = Arc::new(MockContentGenerator::new());
        let publisher = Arc::new(MockPublisher::new());
        let ledger = Arc::new(MemoryLedgerStore::with_topics(&options.published));
        let catalog = Arc::new(StaticTopicCatalog::new(&options.topics));

        let rotator = TopicRotator::new(
            Arc::clone(&catalog) as Arc<dyn TopicCatalog>,
            Arc::clone(&ledger) as Arc<dyn LedgerStore>,
        )
        .with_policy(options.on_exhausted);
        let pipeline = Pipeline::new(
            rotator,
            Arc::clone(&generator) as Arc<dyn ContentGenerator>,
            PromptTemplate::default(),
        )
        .with_publisher(
            Arc::clone(&publisher) as Arc<dyn Publisher>,
            PublishTarget {
                publication_id: "pub-test".to_string(),
                title_template: "Daily Dose of DevOps: {topic}".to_string(),
                tags: vec!["DevOps".to_string()],
            },
        );

        let state = AppState::new(fixtures::offline_config(), Ok(pipeline))
            .with_run_mode(options.run_mode);

        Self {
            router: dailydose_server::api::create_router(Arc::new(state)),
            generator,
            publisher,
            ledger,
            catalog,
        }
    }

    /// A router whose pipeline failed to build.
    pub fn unavailable(error: PipelineError) -> Router {
        let state = AppState::new(fixtures::offline_config(), Err(error));
        dailydose_server::api::create_router(Arc::new(state))
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        send(&self.router, "GET", path).await
    }

    /// Send a POST request without a body.
    pub async fn post(&self, path: &str) -> TestResponse {
        send(&self.router, "POST", path).await
    }
}

/// Send a request through `router` and collect the response.
pub async fn send(router: &Router, method: &str, path: &str) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .unwrap();

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");

    let status = response.status();
    let body_bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect body")
        .to_bytes();

    let text = String::from_utf8_lossy(&body_bytes).into_owned();
    let body = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    TestResponse { status, body, text }
}
