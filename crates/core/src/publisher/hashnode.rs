//! Hashnode GraphQL publishing client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{PublicationError, PublicationMetadata, PublishedPost, Publisher};
use crate::config::PublisherConfig;
use crate::generator::Document;
use crate::metrics;
use crate::topics::slugify;

const PUBLISH_POST_MUTATION: &str = "mutation PublishPost($input: PublishPostInput!) { publishPost(input: $input) { post { id slug url } } }";

/// Publishes markdown through the `publishPost` mutation.
pub struct HashnodeClient {
    client: Client,
    endpoint: String,
    api_token: String,
    timeout: Duration,
}

impl HashnodeClient {
    pub fn new(config: &PublisherConfig, api_token: impl Into<String>) -> Result<Self, PublicationError> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(PublicationError::NotConfigured(format!(
                "{} not set",
                config.api_token_env
            )));
        }

        let timeout = Duration::from_secs(u64::from(config.timeout_secs));
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PublicationError::Http(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_token,
            timeout,
        })
    }
}

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'static str,
    variables: PublishVariables<'a>,
}

#[derive(Debug, Serialize)]
struct PublishVariables<'a> {
    input: PublishPostInput<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PublishPostInput<'a> {
    title: &'a str,
    content_markdown: &'a str,
    publication_id: &'a str,
    tags: Vec<TagInput>,
}

#[derive(Debug, Serialize)]
struct TagInput {
    name: String,
    slug: String,
}

fn build_request<'a>(document: &'a Document, metadata: &'a PublicationMetadata) -> GraphqlRequest<'a> {
    GraphqlRequest {
        query: PUBLISH_POST_MUTATION,
        variables: PublishVariables {
            input: PublishPostInput {
                title: &metadata.title,
                content_markdown: &document.markdown,
                publication_id: &metadata.publication_id,
                tags: metadata
                    .tags
                    .iter()
                    .map(|name| TagInput {
                        name: name.clone(),
                        slug: slugify(name),
                    })
                    .collect(),
            },
        },
    }
}

/// Resolve the post URL from a `publishPost` response body.
pub fn parse_publish_response(status: u16, body: &str) -> Result<PublishedPost, PublicationError> {
    if !(200..300).contains(&status) {
        return Err(PublicationError::Api {
            status,
            raw: body.to_string(),
        });
    }

    let value: Value = serde_json::from_str(body).map_err(|e| PublicationError::InvalidJson {
        message: e.to_string(),
        raw: body.to_string(),
    })?;

    let post = value.pointer("/data/publishPost/post");
    let url = post
        .and_then(|p| p.get("url"))
        .and_then(Value::as_str)
        .filter(|u| !u.is_empty());

    match url {
        Some(url) => Ok(PublishedPost {
            url: url.to_string(),
            id: post
                .and_then(|p| p.get("id"))
                .and_then(Value::as_str)
                .map(str::to_string),
        }),
        None => Err(PublicationError::NoUrl {
            errors: value
                .get("errors")
                .and_then(Value::as_array)
                .map(|errors| {
                    errors
                        .iter()
                        .filter_map(|e| e.get("message").and_then(Value::as_str))
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            raw: body.to_string(),
        }),
    }
}

#[async_trait]
impl Publisher for HashnodeClient {
    fn name(&self) -> &str {
        "hashnode"
    }

    async fn publish(
        &self,
        document: &Document,
        metadata: &PublicationMetadata,
    ) -> Result<PublishedPost, PublicationError> {
        let start = Instant::now();
        debug!(
            "Publishing {:?} ({} chars) to publication {}",
            metadata.title,
            document.char_len(),
            metadata.publication_id
        );

        let result: Result<PublishedPost, PublicationError> = async {
            let response = self
                .client
                .post(&self.endpoint)
                .header("Authorization", &self.api_token)
                .header("content-type", "application/json")
                .json(&build_request(document, metadata))
                .send()
                .await
                .map_err(|e| PublicationError::from_reqwest(e, self.timeout))?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| PublicationError::from_reqwest(e, self.timeout))?;

            parse_publish_response(status, &body)
        }
        .await;

        metrics::record_external_call("publisher", "publish_post", start.elapsed(), result.is_ok());
        if let Err(e) = &result {
            warn!("Publishing failed: {}", e);
            if let Some(raw) = e.raw_payload() {
                debug!("Raw publish response: {}", raw);
            }
        }
        result
    }
}
