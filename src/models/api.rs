//! Proxy API data models
//!
//! Defines the request and response structures exchanged with the
//! assistant client. Field names follow the client's camelCase wire format.

use serde::{Deserialize, Serialize};

/// Upstream vendor a model belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    /// OpenAI chat-completion API
    Openai,
    /// Anthropic messages API
    Anthropic,
}

impl std::fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelProvider::Openai => write!(f, "openai"),
            ModelProvider::Anthropic => write!(f, "anthropic"),
        }
    }
}

/// Model listing entry consumed by the client settings UI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Vendor-specific model identifier
    pub id: String,
    /// Owning vendor
    pub provider: ModelProvider,
    /// Human-readable display name
    pub name: String,
    /// Context window size in tokens
    pub max_tokens: u32,
    /// Input price per token
    pub input_price_per_token: f64,
    /// Output price per token
    pub output_price_per_token: f64,
}

/// Uploaded document forwarded as completion context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAttachment {
    /// File name shown to the model
    pub name: String,
    /// Extracted document text
    pub content: String,
}

/// Completion request body (`action: "complete"`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    /// User prompt text
    #[serde(default)]
    pub prompt: String,
    /// Target model identifier; also selects the provider adapter
    #[serde(default)]
    pub model_id: String,
    /// Sampling temperature in [0, 1] (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens to generate (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Documents to include as context, in order (optional)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<DocumentAttachment>,
    /// Caller-supplied system message (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,
}

/// Token usage statistics normalized across vendors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    /// Tokens consumed by the prompt
    pub prompt_tokens: u32,
    /// Tokens generated by the model
    pub completion_tokens: u32,
    /// Combined total
    pub total_tokens: u32,
}

/// Normalized completion result returned to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text
    pub content: String,
    /// Token usage reported by the vendor
    pub usage: TokenUsage,
}

/// Response body for the `models` action
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelListResponse {
    /// Combined model list across all providers
    pub models: Vec<ModelInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_camel_case() {
        let json = r#"{
            "action": "complete",
            "prompt": "Summarize plate tectonics",
            "modelId": "claude-3-sonnet-20240229",
            "temperature": 0.5,
            "maxTokens": 500,
            "systemMessage": "Be terse",
            "documents": [{"name": "notes.txt", "content": "subduction zones"}]
        }"#;

        let request: CompletionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.prompt, "Summarize plate tectonics");
        assert_eq!(request.model_id, "claude-3-sonnet-20240229");
        assert_eq!(request.temperature, Some(0.5));
        assert_eq!(request.max_tokens, Some(500));
        assert_eq!(request.system_message.as_deref(), Some("Be terse"));
        assert_eq!(request.documents.len(), 1);
        assert_eq!(request.documents[0].name, "notes.txt");
    }

    #[test]
    fn test_completion_request_defaults() {
        let request: CompletionRequest = serde_json::from_str(r#"{"action": "complete"}"#).unwrap();
        assert!(request.prompt.is_empty());
        assert!(request.model_id.is_empty());
        assert!(request.documents.is_empty());
        assert!(request.temperature.is_none());
    }

    #[test]
    fn test_model_info_serialization() {
        let info = ModelInfo {
            id: "gpt-4".to_string(),
            provider: ModelProvider::Openai,
            name: "gpt-4".to_string(),
            max_tokens: 8192,
            input_price_per_token: 0.03,
            output_price_per_token: 0.06,
        };

        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["provider"], "openai");
        assert_eq!(value["maxTokens"], 8192);
        assert_eq!(value["inputPricePerToken"], 0.03);
        assert_eq!(value["outputPricePerToken"], 0.06);
    }

    #[test]
    fn test_usage_serialization() {
        let usage = TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 20,
            total_tokens: 30,
        };

        let value = serde_json::to_value(usage).unwrap();
        assert_eq!(value["promptTokens"], 10);
        assert_eq!(value["completionTokens"], 20);
        assert_eq!(value["totalTokens"], 30);
    }
}
