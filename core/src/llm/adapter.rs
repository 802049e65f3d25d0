use serde::{Deserialize, Serialize};
use serde_json::json;

use super::client::ChatRequest;

/// One entry of the chat `messages` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Build the Chat Completions body: exactly one system and one user message.
pub fn chat_request_to_body(request: &ChatRequest) -> serde_json::Value {
    json!({
        "model": request.model,
        "messages": request.messages(),
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
    })
}

/// Text of the first choice, `choices[0].message.content`
pub fn extract_text_from_chat_completions(v: &serde_json::Value) -> Option<String> {
    v.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(|s| s.to_string())
}
