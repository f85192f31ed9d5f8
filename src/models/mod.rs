//! Data models module
//!
//! Defines the proxy's client-facing request/response structures and the
//! vendor wire formats for the OpenAI and Anthropic APIs

pub mod anthropic;
pub mod api;
pub mod openai;

pub use api::{
    CompletionRequest, CompletionResponse, DocumentAttachment, ModelInfo, ModelListResponse,
    ModelProvider, TokenUsage,
};
