//! Text generation clients
//!
//! The engine depends only on `generate(prompt) -> text`. [`HttpGenerator`]
//! implements it over two wire formats:
//!
//! ```text
//! openai:    POST {base_url}/chat/completions   -> choices[0].message.content
//! anthropic: POST {base_url}/messages           -> content[*].text
//! ```

use crate::config::{GeneratorConfig, Provider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taxon_core::{Error, Result};
use tokio::sync::OnceCell;
use tracing::{debug, info};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Longest slice of an error body kept in error messages
const ERROR_BODY_PREVIEW: usize = 200;

/// Black-box text generation
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce a completion for `prompt`
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier, for logs
    fn model(&self) -> &str;
}

/// HTTP client for hosted text-generation APIs
pub struct HttpGenerator {
    config: GeneratorConfig,
    api_key: String,
    client: OnceCell<reqwest::Client>,
}

impl std::fmt::Debug for HttpGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGenerator")
            .field("provider", &self.config.provider)
            .field("base_url", &self.config.base_url())
            .field("model", &self.config.model)
            .finish_non_exhaustive()
    }
}

impl HttpGenerator {
    /// Create a generator, failing fast when no API key is available
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;

        info!(
            "Configured {} generator: model={} base_url={}",
            config.provider.as_str(),
            config.model,
            config.base_url()
        );

        Ok(Self {
            config,
            api_key,
            client: OnceCell::new(),
        })
    }

    /// Shared HTTP client, built on first use
    async fn client(&self) -> Result<&reqwest::Client> {
        self.client
            .get_or_try_init(|| async {
                debug!("Building HTTP client for {} generator", self.config.provider.as_str());
                reqwest::Client::builder()
                    .build()
                    .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))
            })
            .await
    }

    async fn generate_openai(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url());
        let body = OpenAiRequest {
            model: &self.config.model,
            messages: vec![WireMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client()
            .await?
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let parsed: OpenAiResponse = read_json(response).await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::generator("Completion response has no content"))
    }

    async fn generate_anthropic(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/messages", self.config.base_url());
        let body = AnthropicRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![WireMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client()
            .await?
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let parsed: AnthropicResponse = read_json(response).await?;
        let text: String = parsed
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect();

        if text.is_empty() {
            return Err(Error::generator("Messages response has no text content"));
        }
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for HttpGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        match self.config.provider {
            Provider::OpenAi => self.generate_openai(prompt).await,
            Provider::Anthropic => self.generate_anthropic(prompt).await,
        }
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout
    } else {
        Error::generator(format!("HTTP request failed: {}", err))
    }
}

async fn read_json<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let preview: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
        return Err(Error::generator(format!("API error {}: {}", status, preview)));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| Error::generator(format!("Failed to decode API response: {}", e)))
}

// =============================================================================
// Wire Structures
// =============================================================================

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicBlock {
    #[serde(default)]
    text: Option<String>,
}
