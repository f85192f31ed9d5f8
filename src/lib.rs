//! LLM Proxy Library
//!
//! Multi-provider completion proxy backing the Earth science paper
//! assistant: authenticates callers, normalizes requests across the OpenAI
//! and Anthropic APIs, and aggregates their model listings

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod providers;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::Settings;
pub use handlers::{create_router, AppState};
pub use models::{CompletionRequest, CompletionResponse, ModelInfo, TokenUsage};
pub use providers::{AnthropicProvider, OpenAIProvider, Provider};
pub use services::{IdentityClient, ModelRegistry};
pub use utils::error::{AppError, AppResult};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{}", NAME, VERSION)
}
