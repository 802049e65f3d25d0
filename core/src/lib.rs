// md-enhance Core Library
// Markdown enhancement: request validation, provider configuration, task dispatch

pub mod config;
pub mod envelope;
pub mod llm;
pub mod service;
pub mod task;

// Export core types
pub use config::{AiConfig, EffectiveConfig, PromptOverrides, ProviderDefaults};
pub use envelope::{CssConfig, EnhanceRequest, EnhanceResponse, TaskType};
pub use llm::{ChatCompletion, ChatRequest, LlmClient, LlmClientConfig};
pub use service::EnhanceService;

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnhanceError {
    /// Malformed, oversized or out-of-range input
    #[error("参数错误: {0}")]
    Validation(String),

    /// Missing or malformed provider credentials / endpoint
    #[error("{0}")]
    Config(String),

    /// Any failure reported by (or while reaching) the LLM provider
    #[error("{0}")]
    Upstream(String),
}

pub type Result<T> = std::result::Result<T, EnhanceError>;

/// User-facing category of an upstream failure.
///
/// Classification is a substring heuristic over the failure text; it is a UX
/// hint only and cannot tell a rejected key from an unreachable provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamCategory {
    Timeout,
    RateLimit,
    Auth,
    Generic,
}

impl UpstreamCategory {
    pub fn classify(description: &str) -> Self {
        let lower = description.to_lowercase();

        if contains_any(&lower, &["timeout", "timed out"]) {
            UpstreamCategory::Timeout
        } else if contains_any(
            &lower,
            &["rate limit", "rate_limit", "quota", "429", "too many requests"],
        ) {
            UpstreamCategory::RateLimit
        } else if contains_any(&lower, &["api", "openai", "key", "401", "403", "unauthorized"]) {
            UpstreamCategory::Auth
        } else {
            UpstreamCategory::Generic
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            UpstreamCategory::Timeout => "请求超时，请稍后重试或检查网络连接。",
            UpstreamCategory::RateLimit => "API调用频率限制或配额不足，请稍后重试。",
            UpstreamCategory::Auth => "AI服务调用失败，请检查API配置和网络连接。",
            UpstreamCategory::Generic => "处理过程中发生错误，请稍后重试。",
        }
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

impl EnhanceError {
    /// Text placed in `EnhanceResponse.error`
    pub fn user_message(&self) -> String {
        match self {
            EnhanceError::Upstream(detail) => {
                let category = UpstreamCategory::classify(detail);
                format!("{} 详细信息: {}", category.hint(), detail)
            }
            other => other.to_string(),
        }
    }
}
