use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::generator::PromptTemplate;
use crate::topics::ExhaustionPolicy;

/// Root configuration. Every section has defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub topics: TopicsConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub publisher: PublisherConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Characters of generated text returned by the HTTP entrypoint.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            preview_chars: default_preview_chars(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

fn default_preview_chars() -> usize {
    500
}

/// Where the catalog and the ledger live.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TopicsConfig {
    /// YAML file with a `topics:` list.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,
    /// Ledger location; see [`TopicsConfig::ledger_path()`] for the default.
    #[serde(default)]
    pub ledger_path: Option<PathBuf>,
    #[serde(default)]
    pub ledger_backend: LedgerBackend,
    /// Behaviour once every topic has been published.
    #[serde(default)]
    pub on_exhausted: ExhaustionPolicy,
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            ledger_path: None,
            ledger_backend: LedgerBackend::default(),
            on_exhausted: ExhaustionPolicy::default(),
        }
    }
}

impl TopicsConfig {
    /// The configured ledger path, or `content/published.json`
    /// (`content/published.db` for the SQLite backend).
    pub fn ledger_path(&self) -> PathBuf {
        self.ledger_path
            .clone()
            .unwrap_or_else(|| match self.ledger_backend {
                LedgerBackend::Json => PathBuf::from("content/published.json"),
                LedgerBackend::Sqlite => PathBuf::from("content/published.db"),
            })
    }
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("content/topics.yaml")
}

/// Available ledger backends
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LedgerBackend {
    #[default]
    Json,
    Sqlite,
}

/// Text-generation provider; selects the request body format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorProvider {
    /// Hosted inference: `{inputs, parameters}`.
    #[default]
    HuggingFace,
    /// OpenAI-compatible chat completions: `{model, messages}`.
    OpenAi,
}

/// Text-generation client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub provider: GeneratorProvider,
    /// Full URL the request is POSTed to.
    #[serde(default = "default_generator_endpoint")]
    pub endpoint: String,
    /// Model name/identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// API token. Falls back to the `api_token_env` environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default = "default_generator_token_env")]
    pub api_token_env: String,
    /// Request timeout in seconds.
    #[serde(default = "default_generator_timeout")]
    pub timeout_secs: u32,
    #[serde(default)]
    pub prompt: PromptTemplate,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: GeneratorProvider::default(),
            endpoint: default_generator_endpoint(),
            model: default_model(),
            api_token: None,
            api_token_env: default_generator_token_env(),
            timeout_secs: default_generator_timeout(),
            prompt: PromptTemplate::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn resolve_api_token(&self) -> Option<String> {
        resolve_secret(self.api_token.as_deref(), &self.api_token_env)
    }
}

fn default_generator_endpoint() -> String {
    "https://api-inference.huggingface.co/models/mistralai/Mistral-7B-Instruct-v0.2".to_string()
}

fn default_model() -> String {
    "mistralai/Mistral-7B-Instruct-v0.2".to_string()
}

fn default_generator_token_env() -> String {
    "HUGGINGFACE_API_TOKEN".to_string()
}

fn default_generator_timeout() -> u32 {
    60
}

/// Publishing client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// GraphQL endpoint.
    #[serde(default = "default_publisher_endpoint")]
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default = "default_publisher_token_env")]
    pub api_token_env: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_id: Option<String>,
    #[serde(default = "default_publication_id_env")]
    pub publication_id_env: String,
    /// Post title; `{topic}` is replaced with the topic.
    #[serde(default = "default_title_template")]
    pub title_template: String,
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,
    #[serde(default = "default_publisher_timeout")]
    pub timeout_secs: u32,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            endpoint: default_publisher_endpoint(),
            api_token: None,
            api_token_env: default_publisher_token_env(),
            publication_id: None,
            publication_id_env: default_publication_id_env(),
            title_template: default_title_template(),
            tags: default_tags(),
            timeout_secs: default_publisher_timeout(),
        }
    }
}

impl PublisherConfig {
    pub fn resolve_api_token(&self) -> Option<String> {
        resolve_secret(self.api_token.as_deref(), &self.api_token_env)
    }

    pub fn resolve_publication_id(&self) -> Option<String> {
        resolve_secret(self.publication_id.as_deref(), &self.publication_id_env)
    }
}

fn default_publisher_endpoint() -> String {
    "https://gql.hashnode.com".to_string()
}

fn default_publisher_token_env() -> String {
    "HASHNODE_API_TOKEN".to_string()
}

fn default_publication_id_env() -> String {
    "HASHNODE_PUBLICATION_ID".to_string()
}

fn default_title_template() -> String {
    "Daily Dose of DevOps: {topic}".to_string()
}

fn default_tags() -> Vec<String> {
    vec!["DevOps".to_string()]
}

fn default_publisher_timeout() -> u32 {
    30
}

/// Entrypoint behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Environment variable that marks a batch/CI context. The HTTP
    /// entrypoint publishes only when it is set to `true` or `1`.
    #[serde(default = "default_publish_env_var")]
    pub publish_env_var: String,
    /// Directory the batch entrypoint writes generated markdown to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            publish_env_var: default_publish_env_var(),
            output_dir: None,
        }
    }
}

impl PipelineConfig {
    /// Whether the current process runs in the batch/CI context.
    pub fn publish_context_active(&self) -> bool {
        std::env::var(&self.publish_env_var)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1"))
            .unwrap_or(false)
    }
}

fn default_publish_env_var() -> String {
    "GITHUB_ACTIONS".to_string()
}

/// Explicit value if non-empty, otherwise the named environment variable if non-empty.
pub fn resolve_secret(explicit: Option<&str>, env_name: &str) -> Option<String> {
    explicit
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| std::env::var(env_name).ok().filter(|v| !v.is_empty()))
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub topics: TopicsConfig,
    pub generator: SanitizedGeneratorConfig,
    pub publisher: SanitizedPublisherConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedGeneratorConfig {
    pub provider: GeneratorProvider,
    pub endpoint: String,
    pub model: String,
    pub api_token_configured: bool,
    pub timeout_secs: u32,
    pub max_tokens: u32,
    pub temperature: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedPublisherConfig {
    pub endpoint: String,
    pub api_token_configured: bool,
    pub publication_id_configured: bool,
    pub title_template: String,
    pub tags: Vec<String>,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            topics: config.topics.clone(),
            generator: SanitizedGeneratorConfig {
                provider: config.generator.provider.clone(),
                endpoint: config.generator.endpoint.clone(),
                model: config.generator.model.clone(),
                api_token_configured: config.generator.resolve_api_token().is_some(),
                timeout_secs: config.generator.timeout_secs,
                max_tokens: config.generator.prompt.max_tokens,
                temperature: config.generator.prompt.temperature,
            },
            publisher: SanitizedPublisherConfig {
                endpoint: config.publisher.endpoint.clone(),
                api_token_configured: config.publisher.resolve_api_token().is_some(),
                publication_id_configured: config.publisher.resolve_publication_id().is_some(),
                title_template: config.publisher.title_template.clone(),
                tags: config.publisher.tags.clone(),
                timeout_secs: config.publisher.timeout_secs,
            },
            pipeline: config.pipeline.clone(),
        }
    }
}
