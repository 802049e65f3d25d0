use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::AiConfig;
use crate::{EnhanceError, Result};

/// Upper bound on `content`, counted in characters
pub const MAX_CONTENT_CHARS: usize = 50_000;

/// One of the four content transformations a caller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
    /// Insert image placeholders at topically relevant points
    AutoImage,
    /// Reformat tables, convert suitable lists to tables
    BeautifyTable,
    /// Insert headings and page breaks for readability
    SegmentText,
    /// Produce a stylesheet matching the document
    AutoCssStyle,
}

impl TaskType {
    /// Wire names in the order they are reported back to callers
    pub const ALL: [TaskType; 4] = [
        TaskType::SegmentText,
        TaskType::AutoImage,
        TaskType::BeautifyTable,
        TaskType::AutoCssStyle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::AutoImage => "auto_image",
            TaskType::BeautifyTable => "beautify_table",
            TaskType::SegmentText => "segment_text",
            TaskType::AutoCssStyle => "auto_css_style",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = EnhanceError;

    fn from_str(s: &str) -> Result<Self> {
        TaskType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = TaskType::ALL.iter().map(|t| t.as_str()).collect();
                EnhanceError::Validation(format!(
                    "不支持的任务类型: {}，支持的类型: {}",
                    s,
                    valid.join(", ")
                ))
            })
    }
}

/// Stylesheet preferences sent alongside a request by the web front-end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssConfig {
    #[serde(default, rename = "customCSS")]
    pub custom_css: Option<String>,
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub line_height: Option<f64>,
    #[serde(default)]
    pub text_color: Option<String>,
}

/// Inbound body of `POST /enhance`.
///
/// `task_type` stays a plain string on the wire so that an unknown value is
/// reported through the response envelope rather than rejected while decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhanceRequest {
    pub content: String,
    pub task_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, rename = "aiConfig", skip_serializing_if = "Option::is_none")]
    pub ai_config: Option<AiConfig>,
    #[serde(default, rename = "cssConfig", skip_serializing_if = "Option::is_none")]
    pub css_config: Option<CssConfig>,
}

impl EnhanceRequest {
    pub fn new(content: impl Into<String>, task_type: TaskType) -> Self {
        Self {
            content: content.into(),
            task_type: task_type.as_str().to_string(),
            options: None,
            ai_config: None,
            css_config: None,
        }
    }

    pub fn with_ai_config(mut self, ai_config: AiConfig) -> Self {
        self.ai_config = Some(ai_config);
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options
            .get_or_insert_with(serde_json::Map::new)
            .insert(key.into(), value);
        self
    }

    /// Checks content and task selector; pure, and safe to call repeatedly.
    pub fn validate(&self) -> Result<TaskType> {
        if self.content.trim().is_empty() {
            return Err(EnhanceError::Validation(
                "输入内容不能为空 (content is empty)".into(),
            ));
        }

        let length = self.content.chars().count();
        if length > MAX_CONTENT_CHARS {
            return Err(EnhanceError::Validation(format!(
                "输入内容过长，最大支持{}字符，当前{}字符",
                MAX_CONTENT_CHARS, length
            )));
        }

        self.task_type.parse()
    }

    /// Literal stylesheet supplied by the caller, if any.
    ///
    /// `options.customCSS` wins over `cssConfig.customCSS`; blank values count as absent.
    pub fn preset_stylesheet(&self) -> Option<&str> {
        let from_options = self
            .options
            .as_ref()
            .and_then(|o| o.get("customCSS"))
            .and_then(|v| v.as_str());
        let from_css_config = self
            .css_config
            .as_ref()
            .and_then(|c| c.custom_css.as_deref());

        from_options
            .into_iter()
            .chain(from_css_config)
            .find(|css| !css.trim().is_empty())
    }
}

/// Uniform result envelope returned by `POST /enhance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhanceResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EnhanceResponse {
    pub fn ok(enhanced_content: impl Into<String>) -> Self {
        Self {
            success: true,
            enhanced_content: Some(enhanced_content.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            enhanced_content: None,
            error: Some(error.into()),
        }
    }
}

impl From<Result<String>> for EnhanceResponse {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(content) => EnhanceResponse::ok(content),
            Err(e) => EnhanceResponse::failure(e.user_message()),
        }
    }
}
