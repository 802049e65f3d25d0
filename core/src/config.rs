//! Provider configuration: per-request `AiConfig` merged over startup defaults.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{EnhanceError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: i64 = 2000;

/// Key prefix the provider issues
pub const API_KEY_PREFIX: &str = "sk-";
pub const API_KEY_MIN_LEN: usize = 20;

/// Fragments of template values that were never filled in
pub const PLACEHOLDER_FRAGMENTS: [&str; 4] = ["your_", "sk-xxx", "placeholder", "example"];

pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=2.0;
pub const MAX_TOKENS_RANGE: std::ops::RangeInclusive<i64> = 1..=4000;

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model_name() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> i64 {
    DEFAULT_MAX_TOKENS
}

/// AI settings supplied by the caller with each request. Never persisted.
///
/// Endpoint and model stay `None` when omitted so `resolve` can fall back to
/// the process defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub custom_model_name: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: i64,
    /// segment_text
    #[serde(default)]
    pub page_break_prompt: Option<String>,
    /// beautify_table
    #[serde(default)]
    pub table_beautify_prompt: Option<String>,
    /// auto_image
    #[serde(default)]
    pub image_generation_prompt: Option<String>,
    /// auto_css_style
    #[serde(default)]
    pub css_style_prompt: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: String::new(),
            model_name: None,
            custom_model_name: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            page_break_prompt: None,
            table_beautify_prompt: None,
            image_generation_prompt: None,
            css_style_prompt: None,
        }
    }
}

impl AiConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn prompts(&self) -> PromptOverrides {
        PromptOverrides {
            page_break: non_blank(self.page_break_prompt.as_deref()),
            table_beautify: non_blank(self.table_beautify_prompt.as_deref()),
            image_generation: non_blank(self.image_generation_prompt.as_deref()),
            css_style: non_blank(self.css_style_prompt.as_deref()),
        }
    }
}

/// Caller-supplied prompt themes, one per task. Blank strings are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptOverrides {
    pub page_break: Option<String>,
    pub table_beautify: Option<String>,
    pub image_generation: Option<String>,
    pub css_style: Option<String>,
}

/// Process-level defaults, built once at startup and handed to the service.
#[derive(Debug, Clone)]
pub struct ProviderDefaults {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for ProviderDefaults {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model_name(),
        }
    }
}

impl ProviderDefaults {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            base_url: std::env::var("OPENAI_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(default_base_url),
            model: std::env::var("OPENAI_MODEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(default_model_name),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

/// Fully resolved provider parameters for one call
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub prompts: PromptOverrides,
}

/// Merge the request's `AiConfig` (if any) over `defaults` and check every field.
pub fn resolve(
    ai_config: Option<&AiConfig>,
    defaults: &ProviderDefaults,
) -> Result<EffectiveConfig> {
    let request_key = ai_config.and_then(|c| non_blank(Some(c.api_key.as_str())));
    let api_key = match request_key {
        Some(key) => key,
        None => {
            let env_key = defaults.api_key.clone().filter(|k| !k.trim().is_empty());
            if let Some(key) = &env_key {
                info!(target: "config", api_key = %redact_key(key), "Using API key from environment");
            }
            env_key.ok_or_else(|| {
                config_error("OpenAI API密钥未配置。请在设置中配置有效的API密钥。".into())
            })?
        }
    };

    check_api_key(&api_key)?;

    let base_url = ai_config
        .and_then(|c| non_blank(c.base_url.as_deref()))
        .unwrap_or_else(|| defaults.base_url.clone());
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(config_error(format!("API基础URL格式不正确: {}", base_url)));
    }

    let model = ai_config
        .and_then(|c| {
            non_blank(c.custom_model_name.as_deref())
                .or_else(|| non_blank(c.model_name.as_deref()))
        })
        .unwrap_or_else(|| defaults.model.clone());

    let temperature = ai_config.map_or(DEFAULT_TEMPERATURE, |c| c.temperature);
    if !TEMPERATURE_RANGE.contains(&temperature) {
        return Err(EnhanceError::Validation(format!(
            "温度参数必须在0.0-2.0之间，当前值: {:?}",
            temperature
        )));
    }

    let max_tokens = ai_config.map_or(DEFAULT_MAX_TOKENS, |c| c.max_tokens);
    if !MAX_TOKENS_RANGE.contains(&max_tokens) {
        return Err(EnhanceError::Validation(format!(
            "最大令牌数必须在1-4000之间，当前值: {}",
            max_tokens
        )));
    }

    info!(
        target: "config",
        api_key = %redact_key(&api_key),
        base_url = %base_url,
        model = %model,
        temperature,
        max_tokens,
        "Resolved AI configuration"
    );

    Ok(EffectiveConfig {
        api_key,
        base_url,
        model,
        temperature,
        // range-checked above
        max_tokens: max_tokens as u32,
        prompts: ai_config.map(AiConfig::prompts).unwrap_or_default(),
    })
}

fn check_api_key(api_key: &str) -> Result<()> {
    let lower = api_key.to_lowercase();
    if PLACEHOLDER_FRAGMENTS.iter().any(|p| lower.contains(p)) {
        error!(target: "config", api_key = %redact_key(api_key), "Placeholder API key rejected");
        return Err(EnhanceError::Config(
            "检测到占位符API密钥，请配置真实有效的OpenAI API密钥。".into(),
        ));
    }

    if !api_key.starts_with(API_KEY_PREFIX) || api_key.chars().count() < API_KEY_MIN_LEN {
        error!(target: "config", api_key = %redact_key(api_key), "Malformed API key rejected");
        return Err(EnhanceError::Config(format!(
            "API密钥格式不正确。OpenAI API密钥应以'{}'开头且长度足够。",
            API_KEY_PREFIX
        )));
    }

    Ok(())
}

fn config_error(msg: String) -> EnhanceError {
    error!(target: "config", "{}", msg);
    EnhanceError::Config(msg)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty()).map(str::to_string)
}

/// Log-friendly form of a secret: only the last four characters survive.
pub fn redact_key(key: &str) -> String {
    let count = key.chars().count();
    if count <= 4 {
        return "***".to_string();
    }
    let tail: String = key.chars().skip(count - 4).collect();
    format!("***{}", tail)
}
