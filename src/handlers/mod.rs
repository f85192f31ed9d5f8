//! HTTP handlers module
//!
//! Contains all HTTP endpoint handling logic

pub mod health;
pub mod llm;

use crate::config::Settings;
use crate::middleware::{auth, logging};
use crate::providers::{AnthropicProvider, OpenAIProvider};
use crate::services::{IdentityClient, ModelRegistry};
use anyhow::Result;
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Settings,
    pub identity: IdentityClient,
    pub registry: ModelRegistry,
}

/// Create application router
///
/// Constructs the provider adapters and identity client once from the
/// settings and injects them into the handlers via shared state.
pub async fn create_router(settings: Settings) -> Result<Router> {
    let identity = IdentityClient::new(settings.identity.clone())?;
    let anthropic = AnthropicProvider::new(settings.anthropic.clone())?;
    let openai = OpenAIProvider::new(settings.openai.clone())?;
    let registry = ModelRegistry::new(Arc::new(anthropic), Arc::new(openai));

    let app_state = Arc::new(AppState {
        settings,
        identity,
        registry,
    });

    // Create middleware stack
    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(axum_middleware::from_fn(logging::request_logging));

    // Auth applies to the proxy endpoint only; health stays open
    let router = Router::new()
        .route("/llm", post(llm::handle_llm).options(llm::preflight))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth::require_session,
        ))
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .fallback(llm::fallback)
        .with_state(app_state)
        .layer(middleware_stack);

    Ok(router)
}
