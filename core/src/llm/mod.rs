//! LLM module: chat-completion seam, HTTP client, and payload adapter
//!
//! This module provides:
//! - `ChatCompletion`, the trait the service calls (stubbed in tests)
//! - `LlmClientConfig`, `LlmClient` for talking to OpenAI-compatible backends
//! - `chat_request_to_body` adapter for turning a `ChatRequest` into a payload

mod adapter;
mod client;

pub use adapter::{chat_request_to_body, extract_text_from_chat_completions, ChatMessage};
pub use client::{ChatCompletion, ChatRequest, LlmClient, LlmClientConfig};
