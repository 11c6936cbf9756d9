//! The `default` player: calls an external model provider using the
//! configured presentation function to build the prompt, retrying
//! transient failures with exponential backoff per spec.md §7.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use xent_core::{ApiError, RegisterValue, TokenUsage, XentError, XentEvent};
use xent_presentation::PresentationFn;

use crate::envelope::strip_move_tags;
use crate::local_view::LocalView;
use crate::player::{MoveResult, Player};

/// The enumerated provider set from spec.md §4.E. Each maps to a
/// chat-completions-shaped HTTP endpoint; the request/response shapes
/// differ slightly, which `ProviderClient` normalizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Gemini,
    Grok,
    Ollama,
    HuggingFace,
    DeepSeek,
    Moonshot,
}

impl Provider {
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "openai" => Some(Self::OpenAi),
            "anthropic" => Some(Self::Anthropic),
            "gemini" => Some(Self::Gemini),
            "grok" => Some(Self::Grok),
            "ollama" => Some(Self::Ollama),
            "huggingface" => Some(Self::HuggingFace),
            "deepseek" => Some(Self::DeepSeek),
            "moonshot" => Some(Self::Moonshot),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
            Self::Grok => "grok",
            Self::Ollama => "ollama",
            Self::HuggingFace => "huggingface",
            Self::DeepSeek => "deepseek",
            Self::Moonshot => "moonshot",
        }
    }

    /// Every provider besides `ollama` (assumed local) speaks an
    /// OpenAI-compatible chat-completions endpoint for this harness's
    /// purposes; a production deployment would special-case Anthropic's and
    /// Gemini's native wire formats here.
    fn default_endpoint(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1/chat/completions",
            Self::Anthropic => "https://api.anthropic.com/v1/messages",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions",
            Self::Grok => "https://api.x.ai/v1/chat/completions",
            Self::Ollama => "http://localhost:11434/v1/chat/completions",
            Self::HuggingFace => "https://api-inference.huggingface.co/v1/chat/completions",
            Self::DeepSeek => "https://api.deepseek.com/v1/chat/completions",
            Self::Moonshot => "https://api.moonshot.cn/v1/chat/completions",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize, Default)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

/// Talks to one configured provider endpoint, retrying retryable failures
/// with exponential backoff.
pub struct ProviderClient {
    provider: Provider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    http: reqwest::Client,
    max_retries: u32,
    base_backoff: Duration,
}

impl ProviderClient {
    pub fn new(provider: Provider, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: provider.default_endpoint().to_string(),
            provider,
            model: model.into(),
            api_key,
            http: reqwest::Client::new(),
            max_retries: 3,
            base_backoff: Duration::from_millis(250),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn send_once(&self, prompt: &str, max_tokens: u32) -> Result<(String, TokenUsage), ApiError> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "messages": [{"role": "user", "content": prompt}],
        });

        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::transport(self.provider.as_str(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            let kind = xent_core::ApiErrorKind::from_status(status.as_u16());
            return Err(ApiError {
                provider: self.provider.as_str().to_string(),
                kind,
                status_code: Some(status.as_u16()),
                message,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ApiError::transport(self.provider.as_str(), format!("malformed provider response: {e}")))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ApiError::invalid_request(self.provider.as_str(), "provider returned no choices"))?;

        let usage = parsed
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok((text, usage))
    }

    /// Send `prompt`, retrying retryable `ApiError` kinds with exponential
    /// backoff up to `max_retries` times.
    pub async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<(String, TokenUsage), XentError> {
        let mut attempt = 0;
        loop {
            match self.send_once(prompt, max_tokens).await {
                Ok(result) => return Ok(result),
                Err(err) if err.kind.is_retryable() && attempt < self.max_retries => {
                    let backoff = self.base_backoff * 2u32.pow(attempt);
                    tracing::warn!(provider = self.provider.as_str(), attempt, ?backoff, "retrying provider call after transient error");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                },
                Err(err) => return Err(XentError::from(err)),
            }
        }
    }
}

pub struct DefaultPlayer {
    client: ProviderClient,
    view: LocalView,
}

impl DefaultPlayer {
    pub fn new(client: ProviderClient, present: PresentationFn) -> Self {
        Self {
            client,
            view: LocalView::new(present),
        }
    }
}

#[async_trait::async_trait]
impl Player for DefaultPlayer {
    async fn make_move(&self, _var_name: char, register_snapshot: BTreeMap<char, RegisterValue>, max_tokens: u32) -> Result<MoveResult, XentError> {
        let prompt = self.view.render(&register_snapshot);
        let (full_response, usage) = self.client.complete(&prompt, max_tokens).await?;
        Ok(MoveResult {
            response: strip_move_tags(&full_response),
            token_usage: usage,
            prompts: vec![prompt],
            full_response,
        })
    }

    fn post(&self, event: XentEvent) {
        self.view.post(event);
    }

    fn player_type(&self) -> &'static str {
        "default"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_round_trips_through_its_wire_name() {
        for name in ["openai", "anthropic", "gemini", "grok", "ollama", "huggingface", "deepseek", "moonshot"] {
            let provider = Provider::from_str_opt(name).unwrap();
            assert_eq!(provider.as_str(), name);
        }
    }

    #[test]
    fn unknown_provider_name_is_none() {
        assert!(Provider::from_str_opt("not-a-provider").is_none());
    }
}
