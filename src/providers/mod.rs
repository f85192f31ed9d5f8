//! Provider module
//!
//! Defines the Provider trait, the two vendor adapters, and the model-id
//! prefix rule that selects between them

pub mod anthropic;
pub mod context;
pub mod openai;

use async_trait::async_trait;

use crate::models::api::{CompletionRequest, CompletionResponse, ModelInfo};
use crate::utils::error::AppResult;

/// Model identifiers with this prefix route to the Anthropic adapter
pub const ANTHROPIC_MODEL_PREFIX: &str = "claude";

/// Provider trait for upstream LLM vendors
///
/// Adapters translate the generic completion request into their vendor's
/// wire format and normalize the vendor response. Adapters hold only a
/// reqwest client and read-only configuration; they are constructed once
/// at startup and shared across requests.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &'static str;

    /// Send a completion request
    async fn complete(&self, request: &CompletionRequest) -> AppResult<CompletionResponse>;

    /// List the vendor's available models
    async fn list_models(&self) -> AppResult<Vec<ModelInfo>>;
}

/// Adapter selected by the model-id prefix rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Anthropic,
    OpenAI,
}

/// Select the adapter for a model identifier. Identifiers prefixed with the
/// Anthropic family token route to Anthropic; everything else to OpenAI.
/// This prefix convention is the sole dispatch mechanism.
pub fn select_provider(model_id: &str) -> ProviderKind {
    if model_id.starts_with(ANTHROPIC_MODEL_PREFIX) {
        ProviderKind::Anthropic
    } else {
        ProviderKind::OpenAI
    }
}

pub use anthropic::AnthropicProvider;
pub use openai::OpenAIProvider;
