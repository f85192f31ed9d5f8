//! Anthropic API data models
//!
//! Defines Anthropic messages and model-listing wire structures. The
//! messages API separates the system prompt from the conversation turns
//! and carries turn content as arrays of typed blocks.

use serde::{Deserialize, Serialize};

/// Anthropic messages request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicRequest {
    /// Model name
    pub model: String,
    /// System prompt, separate from the turn list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Conversation turns
    pub messages: Vec<AnthropicMessage>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Temperature parameter (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A single conversation turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicMessage {
    /// Role (user/assistant)
    pub role: String,
    /// Turn content
    pub content: AnthropicContent,
}

impl AnthropicMessage {
    pub fn user(content: AnthropicContent) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }
}

/// Turn content, either a bare string or an array of typed blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnthropicContent {
    /// Simple text content
    Text(String),
    /// Ordered content blocks
    Blocks(Vec<AnthropicContentBlock>),
}

impl AnthropicContent {
    /// Number of blocks this content serializes to
    pub fn block_count(&self) -> usize {
        match self {
            AnthropicContent::Text(_) => 1,
            AnthropicContent::Blocks(blocks) => blocks.len(),
        }
    }
}

/// A typed content block inside a turn
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnthropicContentBlock {
    /// Text block
    #[serde(rename = "text")]
    Text { text: String },
}

/// Anthropic messages response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicResponse {
    /// Response ID
    pub id: String,
    /// Model that produced the completion
    pub model: String,
    /// Generated content blocks
    pub content: Vec<AnthropicResponseBlock>,
    /// Stop reason (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    /// Token usage
    pub usage: AnthropicUsage,
}

/// A content block in the response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicResponseBlock {
    /// Block type, "text" for generated text
    #[serde(rename = "type")]
    pub block_type: String,
    /// Block text when the type is "text"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Anthropic usage block; no combined total is reported
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnthropicUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Anthropic model-listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicModelList {
    /// Listed models
    pub data: Vec<AnthropicModel>,
}

/// A single model-listing entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicModel {
    /// Model identifier
    pub id: String,
    /// Vendor display name (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Anthropic error response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicErrorResponse {
    pub error: AnthropicErrorDetail,
}

/// Anthropic error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicErrorDetail {
    /// Error type
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    /// Error message
    pub message: String,
}
