//! HTTP client for hosted text-generation endpoints.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use super::response::extract_text;
use super::{ContentGenerator, Document, GenerationError, PromptTemplate};
use crate::config::{GeneratorConfig, GeneratorProvider};
use crate::metrics;
use crate::topics::Topic;

/// Generator that issues a single POST per topic and waits for the full response.
///
/// No streaming, no retries.
pub struct HttpContentGenerator {
    client: Client,
    provider: GeneratorProvider,
    endpoint: String,
    model: String,
    api_token: String,
    timeout: Duration,
}

impl HttpContentGenerator {
    /// Build a client from config. `api_token` is the resolved secret.
    pub fn new(config: &GeneratorConfig, api_token: impl Into<String>) -> Result<Self, GenerationError> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(GenerationError::NotConfigured(format!(
                "{} not set",
                config.api_token_env
            )));
        }

        let timeout = Duration::from_secs(u64::from(config.timeout_secs));
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Http(e.to_string()))?;

        Ok(Self {
            client,
            provider: config.provider.clone(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_token,
            timeout,
        })
    }

    fn request_body(&self, topic: &Topic, template: &PromptTemplate) -> RequestBody {
        match self.provider {
            GeneratorProvider::HuggingFace => RequestBody::Inference(InferenceRequest {
                inputs: template.render_single(topic),
                parameters: InferenceParameters {
                    max_new_tokens: template.max_tokens,
                    temperature: template.temperature,
                },
            }),
            GeneratorProvider::OpenAi => {
                let mut messages = Vec::with_capacity(2);
                if !template.system.is_empty() {
                    messages.push(ChatMessage {
                        role: "system",
                        content: template.system.clone(),
                    });
                }
                messages.push(ChatMessage {
                    role: "user",
                    content: template.render(topic),
                });
                RequestBody::Chat(ChatRequest {
                    model: self.model.clone(),
                    messages,
                    max_tokens: template.max_tokens,
                    temperature: template.temperature,
                })
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestBody {
    Inference(InferenceRequest),
    Chat(ChatRequest),
}

#[derive(Debug, Serialize)]
struct InferenceRequest {
    inputs: String,
    parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[async_trait]
impl ContentGenerator for HttpContentGenerator {
    fn name(&self) -> &str {
        match self.provider {
            GeneratorProvider::HuggingFace => "hugging_face",
            GeneratorProvider::OpenAi => "open_ai",
        }
    }

    async fn generate(
        &self,
        topic: &Topic,
        template: &PromptTemplate,
    ) -> Result<Document, GenerationError> {
        let start = Instant::now();
        debug!(
            "Requesting post for {:?} from {} (max_tokens={}, temperature={})",
            topic.as_str(),
            self.endpoint,
            template.max_tokens,
            template.temperature
        );

        let result: Result<Document, GenerationError> = async {
            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_token)
                .header("content-type", "application/json")
                .json(&self.request_body(topic, template))
                .send()
                .await
                .map_err(|e| GenerationError::from_reqwest(e, self.timeout))?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| GenerationError::from_reqwest(e, self.timeout))?;

            let (text, shape) = extract_text(status, &body)?;
            debug!("Extracted {} chars using {} shape", text.len(), shape.name());
            Ok::<_, GenerationError>(Document::new(text, self.model.clone()))
        }
        .await;

        metrics::record_external_call(
            "text_generation",
            "generate",
            start.elapsed(),
            result.is_ok(),
        );
        if let Err(e) = &result {
            warn!("Text generation failed: {}", e);
            if let Some(raw) = e.raw_payload() {
                debug!("Raw generation response: {}", raw);
            }
        }
        result
    }
}
