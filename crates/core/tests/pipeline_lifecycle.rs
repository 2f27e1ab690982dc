//! Pipeline lifecycle integration tests.
//!
//! These tests run the full pipeline with mock generator and publisher over
//! a file-backed catalog and ledger:
//! - Preview runs leave the ledger untouched
//! - Publish runs record exactly one topic each
//! - Failures at each stage and what they leave behind

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use dailydose_core::{
    generator::GenerationError,
    publisher::PublicationError,
    testing::{fixtures, MockContentGenerator, MockPublisher},
    ContentGenerator, ErrorKind, ExhaustionPolicy, JsonLedgerStore, LedgerStore, Pipeline,
    PipelineStage, PromptTemplate, PublishTarget, Publisher, RunMode, TopicRotator,
    YamlTopicCatalog,
};

/// Test helper wiring a pipeline to mocks and temp files.
struct TestHarness {
    pipeline: Pipeline,
    generator: Arc<MockContentGenerator>,
    publisher: Arc<MockPublisher>,
    ledger: Arc<JsonLedgerStore>,
    _dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_policy(ExhaustionPolicy::Fail)
    }

    fn with_policy(policy: ExhaustionPolicy) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let catalog_path = dir.path().join("topics.yaml");
        fs::write(&catalog_path, fixtures::devops_catalog_yaml()).unwrap();

        let ledger = Arc::new(JsonLedgerStore::new(dir.path().join("published.json")));
        let generator = Arc::new(MockContentGenerator::new());
        let publisher = Arc::new(MockPublisher::new());

        let rotator = TopicRotator::new(
            Arc::new(YamlTopicCatalog::new(catalog_path)),
            Arc::clone(&ledger) as Arc<dyn LedgerStore>,
        )
        .with_policy(policy);

        let pipeline = Pipeline::new(
            rotator,
            Arc::clone(&generator) as Arc<dyn ContentGenerator>,
            PromptTemplate::default(),
        )
        .with_publisher(
            Arc::clone(&publisher) as Arc<dyn Publisher>,
            PublishTarget {
                publication_id: "pub-123".to_string(),
                title_template: "Daily Dose of DevOps: {topic}".to_string(),
                tags: vec!["DevOps".to_string()],
            },
        );

        Self {
            pipeline,
            generator,
            publisher,
            ledger,
            _dir: dir,
        }
    }

    fn recorded(&self) -> Vec<String> {
        self.ledger
            .load()
            .unwrap()
            .published
            .iter()
            .map(|t| t.as_str().to_string())
            .collect()
    }
}

#[tokio::test]
async fn test_repeated_previews_select_same_topic() {
    let h = TestHarness::new();

    let first = h.pipeline.run(RunMode::Preview).await.unwrap();
    let second = h.pipeline.run(RunMode::Preview).await.unwrap();

    assert_eq!(first.topic, second.topic);
    assert_eq!(first.topic.as_str(), "CI/CD fundamentals");
    assert!(h.recorded().is_empty());
    assert_ne!(first.run_id, second.run_id);
}

#[tokio::test]
async fn test_publish_runs_walk_the_catalog() {
    let h = TestHarness::new();
    let topics = fixtures::devops_topics();

    for expected in &topics {
        let outcome = h.pipeline.run(RunMode::Publish).await.unwrap();
        assert_eq!(outcome.topic.as_str(), *expected);
        assert!(outcome.url().unwrap().starts_with("https://mock.blog.dev/"));
    }

    assert_eq!(h.recorded(), topics);
    assert_eq!(h.publisher.published().len(), topics.len());

    let err = h.pipeline.run(RunMode::Publish).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Exhausted);
    assert_eq!(h.publisher.published().len(), topics.len());
}

#[tokio::test]
async fn test_published_document_is_generated_text() {
    let h = TestHarness::new();
    h.generator.set_response("# Hello\n\nbody");

    let outcome = h.pipeline.run(RunMode::Publish).await.unwrap();

    let published = h.publisher.published();
    assert_eq!(published[0].document.markdown, "# Hello\n\nbody");
    assert_eq!(outcome.document.markdown, "# Hello\n\nbody");
    assert_eq!(
        published[0].metadata.title,
        "Daily Dose of DevOps: CI/CD fundamentals"
    );
}

#[tokio::test]
async fn test_failed_generation_retries_same_topic() {
    let h = TestHarness::new();
    h.generator.fail_next(GenerationError::Api {
        status: 503,
        raw: "model loading".to_string(),
    });

    let err = h.pipeline.run(RunMode::Publish).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Generation);
    assert_eq!(err.raw_payload(), Some("model loading"));

    let outcome = h.pipeline.run(RunMode::Publish).await.unwrap();
    assert_eq!(outcome.topic.as_str(), "CI/CD fundamentals");
    assert_eq!(h.recorded(), vec!["CI/CD fundamentals"]);
}

#[tokio::test]
async fn test_failed_publication_records_nothing() {
    let h = TestHarness::new();
    h.publisher.fail_next(PublicationError::Api {
        status: 401,
        raw: r#"{"errors":[{"message":"Unauthorized"}]}"#.to_string(),
    });

    let err = h.pipeline.run(RunMode::Publish).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Publication);
    assert!(h.recorded().is_empty());
}

#[tokio::test]
async fn test_reset_policy_republishes_from_start() {
    let h = TestHarness::with_policy(ExhaustionPolicy::Reset);
    for _ in fixtures::devops_topics() {
        h.pipeline.run(RunMode::Publish).await.unwrap();
    }

    let outcome = h.pipeline.run(RunMode::Publish).await.unwrap();
    assert_eq!(outcome.topic.as_str(), "CI/CD fundamentals");
    assert_eq!(h.recorded(), vec!["CI/CD fundamentals"]);
}

#[tokio::test]
async fn test_stage_trace_for_publish() {
    let h = TestHarness::new();
    let outcome = h.pipeline.run(RunMode::Publish).await.unwrap();
    assert_eq!(
        outcome.stages,
        vec![
            PipelineStage::Idle,
            PipelineStage::Selecting,
            PipelineStage::Generating,
            PipelineStage::PublishDecision,
            PipelineStage::Publishing,
            PipelineStage::Recording,
            PipelineStage::Done,
        ]
    );
}
