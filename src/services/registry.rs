//! Model registry and provider dispatch
//!
//! Holds the two provider adapters, aggregates their model listings, and
//! resolves completion requests to an adapter via the model-id prefix rule

use futures::future;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::api::ModelInfo;
use crate::providers::{select_provider, Provider, ProviderKind};

/// Provider registry shared across requests
#[derive(Clone)]
pub struct ModelRegistry {
    anthropic: Arc<dyn Provider>,
    openai: Arc<dyn Provider>,
}

impl ModelRegistry {
    /// Create a registry from adapter instances constructed at startup
    pub fn new(anthropic: Arc<dyn Provider>, openai: Arc<dyn Provider>) -> Self {
        Self { anthropic, openai }
    }

    /// Aggregate both vendors' model listings.
    ///
    /// The listings run concurrently and fail independently: a vendor whose
    /// listing call errors contributes zero entries and the error is logged,
    /// never surfaced to the caller. Results are concatenated Anthropic
    /// first, then OpenAI; no sorting.
    pub async fn list_all(&self) -> Vec<ModelInfo> {
        let (anthropic_result, openai_result) =
            future::join(self.anthropic.list_models(), self.openai.list_models()).await;

        let mut models = Vec::new();

        match anthropic_result {
            Ok(listed) => models.extend(listed),
            Err(e) => warn!("Anthropic model listing failed: {}", e),
        }

        match openai_result {
            Ok(listed) => models.extend(listed),
            Err(e) => warn!("OpenAI model listing failed: {}", e),
        }

        debug!("Aggregated {} models across providers", models.len());
        models
    }

    /// Resolve the adapter for a completion request
    pub fn provider_for(&self, model_id: &str) -> Arc<dyn Provider> {
        match select_provider(model_id) {
            ProviderKind::Anthropic => Arc::clone(&self.anthropic),
            ProviderKind::OpenAI => Arc::clone(&self.openai),
        }
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("anthropic", &self.anthropic.name())
            .field("openai", &self.openai.name())
            .finish()
    }
}
