//! OpenAI API data models
//!
//! Defines OpenAI chat-completion and model-listing wire structures

use serde::{Deserialize, Serialize};

/// OpenAI chat-completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIRequest {
    /// Model name
    pub model: String,
    /// Message list
    pub messages: Vec<OpenAIMessage>,
    /// Maximum tokens to generate (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Temperature parameter (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// OpenAI message structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
    /// Role (system/user/assistant)
    pub role: String,
    /// Message content
    pub content: String,
}

impl OpenAIMessage {
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

/// OpenAI chat-completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIResponse {
    /// Response ID
    pub id: String,
    /// Model that produced the completion
    pub model: String,
    /// Generated choices
    pub choices: Vec<OpenAIChoice>,
    /// Token usage
    pub usage: OpenAIUsage,
}

/// A single completion choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIChoice {
    /// Choice index
    pub index: u32,
    /// Generated message
    pub message: OpenAIResponseMessage,
    /// Finish reason (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Message inside a completion choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIResponseMessage {
    /// Role, always "assistant" for completions
    pub role: String,
    /// Generated text (may be absent for refusals)
    #[serde(default)]
    pub content: Option<String>,
}

/// OpenAI usage block; the vendor reports a combined total directly
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OpenAIUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// OpenAI model-listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIModelList {
    /// Listed models
    pub data: Vec<OpenAIModel>,
}

/// A single model-listing entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIModel {
    /// Model identifier
    pub id: String,
    /// Owning organization (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owned_by: Option<String>,
}

/// OpenAI error response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIErrorResponse {
    pub error: OpenAIErrorDetail,
}

/// OpenAI error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIErrorDetail {
    /// Error message
    pub message: String,
    /// Error type (optional)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}
