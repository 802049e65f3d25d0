//! Task dispatch: one prompt recipe per `TaskType`, one chat call per task.

use tracing::{error, info};

use crate::config::{EffectiveConfig, PromptOverrides};
use crate::envelope::{EnhanceRequest, TaskType};
use crate::llm::{ChatCompletion, ChatRequest};
use crate::{EnhanceError, Result};

pub const AUTO_IMAGE_THEME: &str =
    "根据文档内容生成相关的配图，图片应该与内容主题相关，风格统一，有助于理解文档内容。";
pub const BEAUTIFY_TABLE_THEME: &str =
    "请优化表格格式，确保表格美观、对齐良好，并添加适当的样式。保持数据的准确性和可读性。";
pub const SEGMENT_TEXT_THEME: &str =
    "请在适当的位置插入分页符，确保每页内容完整且易于阅读。考虑标题层级、段落完整性和逻辑结构。";
pub const AUTO_CSS_STYLE_THEME: &str =
    "根据文档内容和结构，生成适合的CSS样式，提升文档的视觉效果和可读性。";

const AUTO_IMAGE_INSTRUCTION: &str = "你是一个Markdown内容增强助手。请为给定的Markdown内容自动添加相关的图片占位符。在适当的位置插入 ![图片描述](https://via.placeholder.com/600x300?text=相关图片) 格式的图片。保持原有内容不变，只添加图片。";
const BEAUTIFY_TABLE_INSTRUCTION: &str = "你是一个Markdown表格美化专家。请优化给定内容中的表格格式，使其更加美观和易读。如果内容中没有表格，请将适合的列表或数据转换为表格格式。保持其他内容不变。";
const SEGMENT_TEXT_INSTRUCTION: &str = "请将给定的Markdown内容进行智能分段，添加适当的标题、子标题和段落分隔，使文档结构更清晰。保持原有信息完整，只优化结构和格式。";
const AUTO_CSS_STYLE_INSTRUCTION: &str = "你是一个CSS样式生成专家。请根据给定的Markdown内容，生成适合的CSS样式代码，包括字体、颜色、间距、布局等。样式应该简洁美观，适合文档展示。只返回CSS代码，不要包含其他内容。";

impl TaskType {
    /// Built-in theme used when the caller supplies no override
    pub fn default_theme(self) -> &'static str {
        match self {
            TaskType::AutoImage => AUTO_IMAGE_THEME,
            TaskType::BeautifyTable => BEAUTIFY_TABLE_THEME,
            TaskType::SegmentText => SEGMENT_TEXT_THEME,
            TaskType::AutoCssStyle => AUTO_CSS_STYLE_THEME,
        }
    }

    /// Fixed role text appended after the theme
    pub fn instruction(self) -> &'static str {
        match self {
            TaskType::AutoImage => AUTO_IMAGE_INSTRUCTION,
            TaskType::BeautifyTable => BEAUTIFY_TABLE_INSTRUCTION,
            TaskType::SegmentText => SEGMENT_TEXT_INSTRUCTION,
            TaskType::AutoCssStyle => AUTO_CSS_STYLE_INSTRUCTION,
        }
    }

    fn failure_label(self) -> &'static str {
        match self {
            TaskType::AutoImage => "自动图片生成失败",
            TaskType::BeautifyTable => "表格美化失败",
            TaskType::SegmentText => "文本分段失败",
            TaskType::AutoCssStyle => "CSS样式生成失败",
        }
    }

    fn override_from(self, prompts: &PromptOverrides) -> Option<&str> {
        let custom = match self {
            TaskType::AutoImage => &prompts.image_generation,
            TaskType::BeautifyTable => &prompts.table_beautify,
            TaskType::SegmentText => &prompts.page_break,
            TaskType::AutoCssStyle => &prompts.css_style,
        };
        custom.as_deref()
    }
}

/// System message for `task`: the caller's theme (or the default) followed by the fixed instruction.
pub fn system_prompt(task: TaskType, prompts: &PromptOverrides) -> String {
    let theme = task
        .override_from(prompts)
        .unwrap_or_else(|| task.default_theme());
    format!("{} {}", theme, task.instruction())
}

/// Output that needs no model call: a literal stylesheet for `auto_css_style`.
pub fn preset_output(task: TaskType, request: &EnhanceRequest) -> Option<String> {
    match task {
        TaskType::AutoCssStyle => request.preset_stylesheet().map(str::to_string),
        TaskType::AutoImage | TaskType::BeautifyTable | TaskType::SegmentText => None,
    }
}

/// Run `task` over `content` with one chat-completion call.
pub async fn dispatch(
    task: TaskType,
    content: &str,
    cfg: &EffectiveConfig,
    client: &dyn ChatCompletion,
) -> Result<String> {
    info!(target: "task", task = %task, "Processing AI task");

    let request = ChatRequest::new(cfg, system_prompt(task, &cfg.prompts), content);
    match client.complete(request).await {
        Ok(text) => {
            info!(target: "task", task = %task, "AI task completed");
            Ok(text)
        }
        Err(e) => {
            let detail = match e {
                EnhanceError::Upstream(msg) => msg,
                other => other.to_string(),
            };
            let msg = format!("{}: {}", task.failure_label(), detail);
            error!(target: "task", task = %task, error = %msg, "AI task failed");
            Err(EnhanceError::Upstream(msg))
        }
    }
}
