//! OpenAI provider implementation
//!
//! Standard chat-completion adapter with a single-turn message format;
//! the vendor reports combined token totals directly

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

use super::{context, Provider};
use crate::config::OpenAIConfig;
use crate::models::api::{
    CompletionRequest, CompletionResponse, ModelInfo, ModelProvider, TokenUsage,
};
use crate::models::openai::{
    OpenAIErrorResponse, OpenAIMessage, OpenAIModel, OpenAIModelList, OpenAIRequest,
    OpenAIResponse,
};
use crate::utils::error::{AppError, AppResult};

/// Default generation budget when the caller sets none
const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Default sampling temperature when the caller sets none
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Model family included in listings
const MODEL_FAMILY_PREFIX: &str = "gpt-";

/// Instruction-tuned variants excluded from listings
const EXCLUDED_VARIANT: &str = "instruct";

/// Top-tier family with the larger context window and pricing
const TOP_TIER_PREFIX: &str = "gpt-4";

/// Fixed system instruction for completion calls
const SYSTEM_PROMPT: &str = "You are an assistant helping researchers draft and review Earth \
    science papers.";

/// Appended to the system turn when documents accompany the request
const DOCUMENT_SYSTEM_NOTE: &str = "The user's message includes attached document content; \
    ground your answer in it.";

/// Placeholder returned when the vendor response carries no message content
const EMPTY_CONTENT_PLACEHOLDER: &str = "No response content";

/// OpenAI chat-completion API adapter
#[derive(Debug, Clone)]
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    /// Create a new adapter instance
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.config.base_url.trim_end_matches('/'))
    }

    /// Build the vendor request: one system turn and one user turn. Documents
    /// are folded into the user turn as plain text since this message format
    /// carries no content blocks.
    pub fn build_request(&self, request: &CompletionRequest) -> OpenAIRequest {
        let mut system = request
            .system_message
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| SYSTEM_PROMPT.to_string());

        let user_content = if request.documents.is_empty() {
            request.prompt.clone()
        } else {
            system = format!("{} {}", system, DOCUMENT_SYSTEM_NOTE);
            context::inline_document_context(&request.documents, &request.prompt)
        };

        OpenAIRequest {
            model: request.model_id.clone(),
            messages: vec![
                OpenAIMessage::system(system),
                OpenAIMessage::user(user_content),
            ],
            max_tokens: Some(request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)),
            temperature: Some(request.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
        }
    }

    /// Map a vendor listing entry to a ModelInfo, filtering out other model
    /// families and instruction-tuned variants
    pub fn map_model(model: &OpenAIModel) -> Option<ModelInfo> {
        if !model.id.starts_with(MODEL_FAMILY_PREFIX) || model.id.contains(EXCLUDED_VARIANT) {
            return None;
        }

        let (max_tokens, input_price, output_price) = if model.id.starts_with(TOP_TIER_PREFIX) {
            (8192, 0.03, 0.06)
        } else {
            (4096, 0.0015, 0.002)
        };

        Some(ModelInfo {
            id: model.id.clone(),
            provider: ModelProvider::Openai,
            name: model.id.clone(),
            max_tokens,
            input_price_per_token: input_price,
            output_price_per_token: output_price,
        })
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> AppResult<CompletionResponse> {
        debug!(
            "Sending OpenAI chat completion request for model: {}",
            request.model_id
        );

        let body = self.build_request(request);

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<OpenAIErrorResponse>(&error_text) {
                Ok(parsed) => parsed.error.message,
                Err(_) => error_text,
            };
            error!("OpenAI API request failed: {} - {}", status, message);
            return Err(AppError::Vendor {
                provider: "openai",
                status: status.as_u16(),
                message,
            });
        }

        let vendor_response: OpenAIResponse =
            response.json().await.map_err(|e| AppError::Vendor {
                provider: "openai",
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })?;

        let content = vendor_response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_else(|| EMPTY_CONTENT_PLACEHOLDER.to_string());

        // The vendor already reports a combined total; pass the fields through
        let usage = TokenUsage {
            prompt_tokens: vendor_response.usage.prompt_tokens,
            completion_tokens: vendor_response.usage.completion_tokens,
            total_tokens: vendor_response.usage.total_tokens,
        };

        debug!("OpenAI request completed successfully");

        Ok(CompletionResponse { content, usage })
    }

    async fn list_models(&self) -> AppResult<Vec<ModelInfo>> {
        debug!("Fetching OpenAI model list");

        let response = self
            .client
            .get(self.models_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Vendor {
                provider: "openai",
                status: status.as_u16(),
                message: error_text,
            });
        }

        let listing: OpenAIModelList = response.json().await.map_err(|e| AppError::Vendor {
            provider: "openai",
            status: status.as_u16(),
            message: format!("Failed to parse model list: {}", e),
        })?;

        let models: Vec<ModelInfo> = listing.data.iter().filter_map(Self::map_model).collect();
        debug!("OpenAI listing returned {} models", models.len());
        Ok(models)
    }
}
