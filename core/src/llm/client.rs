use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

use super::adapter::{chat_request_to_body, extract_text_from_chat_completions, ChatMessage};
use crate::config::EffectiveConfig;
use crate::{EnhanceError, Result};

/// Everything one chat-completion call needs; provider parameters travel per request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub system_prompt: String,
    pub user_content: String,
}

impl ChatRequest {
    pub fn new(
        cfg: &EffectiveConfig,
        system_prompt: impl Into<String>,
        user_content: impl Into<String>,
    ) -> Self {
        Self {
            api_key: cfg.api_key.clone(),
            base_url: cfg.base_url.clone(),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            system_prompt: system_prompt.into(),
            user_content: user_content.into(),
        }
    }

    pub fn messages(&self) -> [ChatMessage; 2] {
        [
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(self.user_content.clone()),
        ]
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// The single suspension point of an enhancement: one request, one answer.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Returns the text of the first choice.
    /// Errors are always `EnhanceError::Upstream`.
    async fn complete(&self, request: ChatRequest) -> Result<String>;
}

/// Configuration for LlmClient loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct LlmClientConfig {
    /// `None` keeps reqwest's default (no timeout)
    pub request_timeout_ms: Option<u64>,
}

impl LlmClientConfig {
    pub fn from_env() -> Self {
        Self {
            request_timeout_ms: std::env::var("LLM_REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok()),
        }
    }
}

/// HTTP client for OpenAI-compatible Chat Completions endpoints
#[derive(Clone)]
pub struct LlmClient {
    http: Client,
}

impl LlmClient {
    pub fn new(cfg: LlmClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(ms) = cfg.request_timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let http = builder
            .build()
            .map_err(|e| EnhanceError::Upstream(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(LlmClientConfig::from_env())
    }
}

#[async_trait]
impl ChatCompletion for LlmClient {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        let url = request.endpoint();
        debug!(
            target: "llm_client",
            model = %request.model,
            "POST {} via Chat Completions", url
        );

        let body = chat_request_to_body(&request);
        let resp = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .bearer_auth(&request.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(target: "llm_client", url = %url, error = %e, "Chat Completions transport failure");
                // The endpoint host must not leak into the text the caller's error is classified from.
                let timed_out = e.is_timeout();
                let e = e.without_url();
                if timed_out {
                    EnhanceError::Upstream(format!("Chat Completions request timeout: {e}"))
                } else {
                    EnhanceError::Upstream(format!("Chat Completions HTTP error: {e}"))
                }
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            error!(target: "llm_client", %status, body = %text, "Chat Completions error");
            return Err(EnhanceError::Upstream(format!(
                "Chat Completions error: status={} body={}",
                status, text
            )));
        }

        let val: serde_json::Value = resp.json().await.map_err(|e| {
            EnhanceError::Upstream(format!(
                "Failed to parse Chat Completions JSON: {}",
                e.without_url()
            ))
        })?;
        extract_text_from_chat_completions(&val).ok_or_else(|| {
            EnhanceError::Upstream("Missing choices[0].message.content in chat completions".into())
        })
    }
}
