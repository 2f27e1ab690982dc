//! The generate-then-publish pipeline.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

use super::{PipelineError, PipelineOutcome, PipelineStage, RunMode};
use crate::generator::{ContentGenerator, PromptTemplate};
use crate::metrics;
use crate::publisher::{PublicationMetadata, PublicationResult, Publisher};
use crate::topics::{Topic, TopicRotator};

/// Where and how posts are published.
#[derive(Debug, Clone)]
pub struct PublishTarget {
    pub publication_id: String,
    /// `{topic}` is replaced with the topic text.
    pub title_template: String,
    pub tags: Vec<String>,
}

impl PublishTarget {
    pub fn metadata_for(&self, topic: &Topic) -> PublicationMetadata {
        PublicationMetadata {
            title: self.title_template.replace("{topic}", topic.as_str()),
            publication_id: self.publication_id.clone(),
            tags: self.tags.clone(),
        }
    }
}

enum PublisherSlot {
    Ready {
        publisher: Arc<dyn Publisher>,
        target: PublishTarget,
    },
    Unavailable(String),
}

/// Sequences topic selection, generation, publishing and recording.
///
/// One topic per [`Pipeline::run`]; any failure ends the run. Whether to
/// publish is decided by the caller through [`RunMode`].
pub struct Pipeline {
    rotator: TopicRotator,
    generator: Arc<dyn ContentGenerator>,
    template: PromptTemplate,
    publisher: PublisherSlot,
}

/// Records visited stages and logs transitions.
struct StageTracker {
    stages: Vec<PipelineStage>,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            stages: vec![PipelineStage::Idle],
        }
    }

    fn current(&self) -> PipelineStage {
        self.stages
            .last()
            .copied()
            .unwrap_or(PipelineStage::Idle)
    }

    fn advance(&mut self, next: PipelineStage) {
        debug!("Pipeline stage {} -> {}", self.current(), next);
        self.stages.push(next);
    }

    fn fail(&mut self, error: impl Into<PipelineError>) -> PipelineError {
        let error = error.into();
        error!(
            "Pipeline failed during {} ({}): {}",
            self.current(),
            error.kind().as_str(),
            error
        );
        self.stages.push(PipelineStage::Failed);
        error
    }
}

impl Pipeline {
    pub fn new(
        rotator: TopicRotator,
        generator: Arc<dyn ContentGenerator>,
        template: PromptTemplate,
    ) -> Self {
        Self {
            rotator,
            generator,
            template,
            publisher: PublisherSlot::Unavailable("publisher not configured".to_string()),
        }
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn Publisher>, target: PublishTarget) -> Self {
        self.publisher = PublisherSlot::Ready { publisher, target };
        self
    }

    /// Keep the publisher unavailable, with the reason reported if a publish is attempted.
    pub fn without_publisher(mut self, reason: impl Into<String>) -> Self {
        self.publisher = PublisherSlot::Unavailable(reason.into());
        self
    }

    pub fn can_publish(&self) -> bool {
        matches!(self.publisher, PublisherSlot::Ready { .. })
    }

    pub fn rotator(&self) -> &TopicRotator {
        &self.rotator
    }

    /// Run the pipeline once.
    pub async fn run(&self, mode: RunMode) -> Result<PipelineOutcome, PipelineError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline", run_id = %run_id, mode = mode.as_str());
        let start = Instant::now();

        let result = self.run_stages(run_id, mode).instrument(span).await;

        let label = match &result {
            Ok(_) => "success",
            Err(e) => e.kind().as_str(),
        };
        metrics::PIPELINE_RUNS
            .with_label_values(&[mode.as_str(), label])
            .inc();
        metrics::PIPELINE_DURATION
            .with_label_values(&[mode.as_str()])
            .observe(start.elapsed().as_secs_f64());

        result
    }

    async fn run_stages(
        &self,
        run_id: Uuid,
        mode: RunMode,
    ) -> Result<PipelineOutcome, PipelineError> {
        let mut tracker = StageTracker::new();

        tracker.advance(PipelineStage::Selecting);
        let selected = match mode {
            RunMode::Preview => self.rotator.peek_next(),
            RunMode::Publish => self.rotator.select_next(),
        };
        let topic = selected.map_err(|e| tracker.fail(e))?;
        info!("Selected topic: {}", topic);

        tracker.advance(PipelineStage::Generating);
        let document = self
            .generator
            .generate(&topic, &self.template)
            .await
            .map_err(|e| tracker.fail(e))?;
        info!(
            "Generated {} characters with {}",
            document.char_len(),
            self.generator.name()
        );

        tracker.advance(PipelineStage::PublishDecision);
        if mode == RunMode::Preview {
            info!("Preview run, skipping publish");
            tracker.advance(PipelineStage::Done);
            return Ok(PipelineOutcome {
                run_id,
                topic,
                document,
                publication: None,
                stages: tracker.stages,
            });
        }

        let (publisher, target) = match &self.publisher {
            PublisherSlot::Ready { publisher, target } => (publisher, target),
            PublisherSlot::Unavailable(reason) => {
                return Err(tracker.fail(PipelineError::Configuration(reason.clone())))
            }
        };

        tracker.advance(PipelineStage::Publishing);
        let metadata = target.metadata_for(&topic);
        let post = publisher
            .publish(&document, &metadata)
            .await
            .map_err(|e| tracker.fail(e))?;
        info!("Published {:?} via {} at {}", metadata.title, publisher.name(), post.url);

        tracker.advance(PipelineStage::Recording);
        if let Err(source) = self.rotator.mark_published(&topic) {
            return Err(tracker.fail(PipelineError::Unrecorded {
                topic: topic.as_str().to_string(),
                url: post.url,
                source,
            }));
        }

        tracker.advance(PipelineStage::Done);
        Ok(PipelineOutcome {
            run_id,
            publication: Some(PublicationResult {
                topic: topic.clone(),
                url: post.url,
            }),
            topic,
            document,
            stages: tracker.stages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ErrorKind;
    use crate::publisher::PublicationError;
    use crate::testing::{MemoryLedgerStore, MockContentGenerator, MockPublisher, StaticTopicCatalog};
    use crate::topics::{ExhaustionPolicy, LedgerStore, TopicError};

    struct Harness {
        pipeline: Pipeline,
        generator: Arc<MockContentGenerator>,
        publisher: Arc<MockPublisher>,
        ledger: Arc<MemoryLedgerStore>,
    }

    fn harness(catalog: &[&str], ledger: &[&str]) -> Harness {
        let ledger = Arc::new(MemoryLedgerStore::with_topics(ledger));
        let generator = Arc::new(MockContentGenerator::new());
        let publisher = Arc::new(MockPublisher::new());
        let rotator = TopicRotator::new(
            Arc::new(StaticTopicCatalog::new(catalog)),
            Arc::clone(&ledger) as Arc<dyn LedgerStore>,
        );
        let pipeline = Pipeline::new(
            rotator,
            Arc::clone(&generator) as Arc<dyn ContentGenerator>,
            PromptTemplate::default(),
        )
        .with_publisher(
            Arc::clone(&publisher) as Arc<dyn Publisher>,
            PublishTarget {
                publication_id: "pub-1".to_string(),
                title_template: "Daily Dose: {topic}".to_string(),
                tags: vec!["DevOps".to_string()],
            },
        );
        Harness {
            pipeline,
            generator,
            publisher,
            ledger,
        }
    }

    #[tokio::test]
    async fn test_preview_does_not_publish_or_record() {
        let h = harness(&["CI/CD fundamentals", "Container basics"], &[]);

        let outcome = h.pipeline.run(RunMode::Preview).await.unwrap();

        assert_eq!(outcome.topic.as_str(), "CI/CD fundamentals");
        assert!(!outcome.published());
        assert_eq!(outcome.url(), None);
        assert!(h.publisher.published().is_empty());
        assert!(h.ledger.snapshot().is_empty());
        assert_eq!(
            outcome.stages,
            vec![
                PipelineStage::Idle,
                PipelineStage::Selecting,
                PipelineStage::Generating,
                PipelineStage::PublishDecision,
                PipelineStage::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_publish_records_topic() {
        let h = harness(&["CI/CD fundamentals", "Container basics"], &[]);

        let outcome = h.pipeline.run(RunMode::Publish).await.unwrap();

        assert!(outcome.published());
        let publication = outcome.publication.as_ref().unwrap();
        assert_eq!(publication.topic.as_str(), "CI/CD fundamentals");
        assert_eq!(h.ledger.snapshot(), vec![Topic::from("CI/CD fundamentals")]);

        let published = h.publisher.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].metadata.title, "Daily Dose: CI/CD fundamentals");
        assert_eq!(published[0].metadata.publication_id, "pub-1");
        assert_eq!(*outcome.stages.last().unwrap(), PipelineStage::Done);
        assert!(outcome.stages.contains(&PipelineStage::Recording));

        let next = h.pipeline.run(RunMode::Preview).await.unwrap();
        assert_eq!(next.topic.as_str(), "Container basics");
    }

    #[tokio::test]
    async fn test_generation_failure_stops_before_publish() {
        let h = harness(&["a"], &[]);
        h.generator.fail_next(crate::generator::GenerationError::NoText {
            raw: "[]".to_string(),
        });

        let err = h.pipeline.run(RunMode::Publish).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Generation);
        assert_eq!(err.raw_payload(), Some("[]"));
        assert!(h.publisher.published().is_empty());
        assert!(h.ledger.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_publication_failure_leaves_ledger_untouched() {
        let h = harness(&["a"], &[]);
        h.publisher.fail_next(PublicationError::NoUrl {
            errors: vec![],
            raw: r#"{"data":{"publishPost":{"post":null}}}"#.to_string(),
        });

        let err = h.pipeline.run(RunMode::Publish).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Publication);
        assert!(h.ledger.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_record_failure_reports_url() {
        let h = harness(&["a"], &[]);
        h.ledger.fail_next_append();

        let err = h.pipeline.run(RunMode::Publish).await.unwrap_err();

        match err {
            PipelineError::Unrecorded { topic, url, source } => {
                assert_eq!(topic, "a");
                assert!(url.starts_with("https://"));
                assert!(matches!(source, TopicError::Persistence(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_exhausted_catalog_fails_without_generating() {
        let h = harness(&["a"], &["a"]);

        let err = h.pipeline.run(RunMode::Preview).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Exhausted);
        assert!(h.generator.requests().is_empty());
    }

    #[tokio::test]
    async fn test_preview_of_exhausted_catalog_keeps_ledger() {
        let h = harness(&["a", "b"], &["a", "b"]);
        let pipeline = Pipeline {
            rotator: TopicRotator::new(
                Arc::new(StaticTopicCatalog::new(&["a", "b"])),
                Arc::clone(&h.ledger) as Arc<dyn LedgerStore>,
            )
            .with_policy(ExhaustionPolicy::Reset),
            ..h.pipeline
        };

        let outcome = pipeline.run(RunMode::Preview).await.unwrap();
        assert_eq!(outcome.topic.as_str(), "a");
        assert_eq!(h.ledger.snapshot().len(), 2);
        assert_eq!(h.ledger.reset_count(), 0);

        let outcome = pipeline.run(RunMode::Publish).await.unwrap();
        assert_eq!(outcome.topic.as_str(), "a");
        assert_eq!(h.ledger.snapshot(), vec![Topic::from("a")]);
        assert_eq!(h.ledger.reset_count(), 1);
    }

    #[tokio::test]
    async fn test_publish_without_publisher_is_configuration_error() {
        let h = harness(&["a"], &[]);
        let pipeline = h.pipeline.without_publisher("HASHNODE_API_TOKEN not set");
        assert!(!pipeline.can_publish());

        let err = pipeline.run(RunMode::Publish).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("HASHNODE_API_TOKEN"));
        assert!(h.ledger.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_generator_receives_template() {
        let h = harness(&["GitOps"], &[]);
        h.pipeline.run(RunMode::Preview).await.unwrap();

        let requests = h.generator.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].topic.as_str(), "GitOps");
        assert_eq!(requests[0].template.max_tokens, 400);
    }

    #[test]
    fn test_publish_target_metadata() {
        let target = PublishTarget {
            publication_id: "p".to_string(),
            title_template: "{topic} explained".to_string(),
            tags: vec![],
        };
        assert_eq!(
            target.metadata_for(&Topic::from("GitOps")).title,
            "GitOps explained"
        );
    }
}
