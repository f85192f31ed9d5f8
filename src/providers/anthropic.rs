//! Anthropic provider implementation
//!
//! Translates generic completion requests into the messages API format
//! (separate system prompt, content-block turns) and normalizes responses

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::{context, Provider};
use crate::config::AnthropicConfig;
use crate::models::anthropic::{
    AnthropicContent, AnthropicContentBlock, AnthropicErrorResponse, AnthropicMessage,
    AnthropicModel, AnthropicModelList, AnthropicRequest, AnthropicResponse, AnthropicUsage,
};
use crate::models::api::{
    CompletionRequest, CompletionResponse, ModelInfo, ModelProvider, TokenUsage,
};
use crate::utils::error::{AppError, AppResult};

/// Messages API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default generation budget when the caller sets none
const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Default sampling temperature when the caller sets none
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Context window advertised for listed models
const MODEL_CONTEXT_WINDOW: u32 = 200_000;

/// Model generation included in listings
const MODEL_FAMILY_PREFIX: &str = "claude-3";

/// System prompt used when the caller does not supply one
const DEFAULT_SYSTEM_PROMPT: &str = "You are an assistant helping researchers draft and review \
    Earth science papers. When documents are provided with a request, ground your answer in \
    their content.";

/// Placeholder returned when the vendor response carries no content blocks
const EMPTY_CONTENT_PLACEHOLDER: &str = "No response content";

/// Per-token pricing (input, output) keyed by model-id prefix
static MODEL_PRICING: Lazy<HashMap<&'static str, (f64, f64)>> = Lazy::new(|| {
    HashMap::from([
        ("claude-3-opus", (0.0015, 0.075)),
        ("claude-3-sonnet", (0.0003, 0.0015)),
        ("claude-3-haiku", (0.000025, 0.000125)),
    ])
});

/// Fallback pricing for identifiers missing from the table
const DEFAULT_PRICING: (f64, f64) = (0.0003, 0.0015);

/// Anthropic messages API adapter
#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicProvider {
    /// Create a new adapter instance
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }

    fn models_url(&self) -> String {
        format!("{}/v1/models", self.config.base_url.trim_end_matches('/'))
    }

    /// Build the vendor request: system prompt split out, documents folded
    /// into one user turn of ordered content blocks
    pub fn build_request(&self, request: &CompletionRequest) -> AnthropicRequest {
        let system = request
            .system_message
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        let content = if request.documents.is_empty() {
            AnthropicContent::Text(request.prompt.clone())
        } else {
            match Self::document_turn(request) {
                Ok(blocks) => AnthropicContent::Blocks(blocks),
                Err(e) => {
                    // Completion must not fail because of malformed document
                    // content; degrade to the prompt alone.
                    warn!("Document context assembly failed, sending prompt only: {}", e);
                    AnthropicContent::Text(context::fallback_text(&request.prompt))
                }
            }
        };

        AnthropicRequest {
            model: request.model_id.clone(),
            system: Some(system),
            messages: vec![AnthropicMessage::user(content)],
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: Some(request.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
        }
    }

    fn document_turn(
        request: &CompletionRequest,
    ) -> Result<Vec<AnthropicContentBlock>, std::fmt::Error> {
        let blocks = context::document_block_texts(&request.documents, &request.prompt)?
            .into_iter()
            .map(|text| AnthropicContentBlock::Text { text })
            .collect();
        Ok(blocks)
    }

    /// The messages API reports input and output counts but no combined total
    pub fn normalize_usage(usage: AnthropicUsage) -> TokenUsage {
        TokenUsage {
            prompt_tokens: usage.input_tokens,
            completion_tokens: usage.output_tokens,
            total_tokens: usage.input_tokens + usage.output_tokens,
        }
    }

    /// Map a vendor listing entry to a ModelInfo, filtering out older
    /// generations
    pub fn map_model(model: &AnthropicModel) -> Option<ModelInfo> {
        if !model.id.starts_with(MODEL_FAMILY_PREFIX) {
            return None;
        }

        let (input_price, output_price) = pricing_for(&model.id);

        Some(ModelInfo {
            id: model.id.clone(),
            provider: ModelProvider::Anthropic,
            name: model
                .display_name
                .clone()
                .unwrap_or_else(|| display_name_from_id(&model.id)),
            max_tokens: MODEL_CONTEXT_WINDOW,
            input_price_per_token: input_price,
            output_price_per_token: output_price,
        })
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn complete(&self, request: &CompletionRequest) -> AppResult<CompletionResponse> {
        debug!(
            "Sending Anthropic messages request for model: {}",
            request.model_id
        );

        let body = self.build_request(request);

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<AnthropicErrorResponse>(&error_text) {
                Ok(parsed) => parsed.error.message,
                Err(_) => error_text,
            };
            error!("Anthropic API request failed: {} - {}", status, message);
            return Err(AppError::Vendor {
                provider: "anthropic",
                status: status.as_u16(),
                message,
            });
        }

        let vendor_response: AnthropicResponse =
            response.json().await.map_err(|e| AppError::Vendor {
                provider: "anthropic",
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })?;

        let content = vendor_response
            .content
            .first()
            .and_then(|block| block.text.clone())
            .unwrap_or_else(|| EMPTY_CONTENT_PLACEHOLDER.to_string());

        debug!("Anthropic request completed successfully");

        Ok(CompletionResponse {
            content,
            usage: Self::normalize_usage(vendor_response.usage),
        })
    }

    async fn list_models(&self) -> AppResult<Vec<ModelInfo>> {
        debug!("Fetching Anthropic model list");

        let response = self
            .client
            .get(self.models_url())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Vendor {
                provider: "anthropic",
                status: status.as_u16(),
                message: error_text,
            });
        }

        let listing: AnthropicModelList = response.json().await.map_err(|e| AppError::Vendor {
            provider: "anthropic",
            status: status.as_u16(),
            message: format!("Failed to parse model list: {}", e),
        })?;

        let models: Vec<ModelInfo> = listing.data.iter().filter_map(Self::map_model).collect();
        debug!("Anthropic listing returned {} models", models.len());
        Ok(models)
    }
}

/// Derive a display name by title-casing the hyphen-separated id tokens
fn display_name_from_id(id: &str) -> String {
    id.split('-')
        .map(|token| {
            let mut chars = token.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn pricing_for(id: &str) -> (f64, f64) {
    MODEL_PRICING
        .iter()
        .find(|(prefix, _)| id.starts_with(*prefix))
        .map(|(_, prices)| *prices)
        .unwrap_or(DEFAULT_PRICING)
}
