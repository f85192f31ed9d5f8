//! LLM proxy handler
//!
//! Single entry point dispatching `models` and `complete` actions to the
//! provider adapters

use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Extension, Json,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::handlers::AppState;
use crate::models::api::{CompletionRequest, ModelListResponse};
use crate::services::identity::AuthenticatedUser;
use crate::utils::error::{AppError, AppResult, ErrorBody};
use crate::utils::logging::create_completion_log_summary;

/// Characters of request body shown around a JSON parse failure
const EXCERPT_RADIUS: usize = 20;

/// Handle LLM proxy requests
///
/// POST /llm with a JSON body whose `action` field selects the operation:
/// `"models"` aggregates the vendors' model listings, `"complete"` forwards
/// a completion request to the adapter selected by the model id.
pub async fn handle_llm(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    body: String,
) -> AppResult<Response> {
    let payload = parse_request_body(&body)?;

    let action = payload
        .get("action")
        .and_then(|value| value.as_str())
        .unwrap_or_default()
        .to_string();

    match action.as_str() {
        "models" => {
            debug!("Listing models for user: {}", user.id);
            let models = state.registry.list_all().await;
            Ok(Json(ModelListResponse { models }).into_response())
        }
        "complete" => {
            let request: CompletionRequest = serde_json::from_value(payload)
                .map_err(|e| AppError::Validation(format!("Invalid completion request: {}", e)))?;

            if request.prompt.is_empty() || request.model_id.is_empty() {
                return Err(AppError::Validation(
                    "Missing required parameters: prompt and modelId".to_string(),
                ));
            }

            debug!(
                "Completion request: {}",
                create_completion_log_summary(&request)
            );

            let provider = state.registry.provider_for(&request.model_id);
            info!(
                "Dispatching completion for model {} to {}",
                request.model_id,
                provider.name()
            );

            let response = provider.complete(&request).await?;
            Ok(Json(response).into_response())
        }
        "" => Err(AppError::Validation(
            "Missing required field: action".to_string(),
        )),
        other => {
            warn!("Rejected unknown action: {}", other);
            Err(AppError::Validation(format!("Invalid action: {}", other)))
        }
    }
}

/// Answer pre-flight requests immediately with a plain-text body
pub async fn preflight() -> Response {
    "ok".into_response()
}

/// Fallback handler: pre-flight succeeds on any path, everything else is an
/// unknown route
pub async fn fallback(method: Method, uri: Uri) -> Response {
    if method == Method::OPTIONS {
        return "ok".into_response();
    }

    warn!("Unknown route requested: {} {}", method, uri.path());
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Not Found".to_string(),
            details: None,
            error_position: None,
        }),
    )
        .into_response()
}

/// Parse the raw request body, reporting the byte offset and surrounding
/// excerpt on failure
fn parse_request_body(body: &str) -> AppResult<serde_json::Value> {
    serde_json::from_str(body).map_err(|e| {
        let position = byte_offset(body, e.line(), e.column());
        AppError::MalformedRequest {
            message: format!("Invalid JSON: {}", e),
            position,
            excerpt: excerpt_around(body, position),
        }
    })
}

/// Convert the parser's 1-based line/column to a byte offset into the body
fn byte_offset(input: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (index, text) in input.split('\n').enumerate() {
        if index + 1 == line {
            return offset + column.saturating_sub(1).min(text.len());
        }
        offset += text.len() + 1;
    }
    input.len()
}

/// Short body excerpt around an offset, clamped to character boundaries
fn excerpt_around(input: &str, offset: usize) -> String {
    let mut start = offset.saturating_sub(EXCERPT_RADIUS);
    while start > 0 && !input.is_char_boundary(start) {
        start -= 1;
    }

    let mut end = (offset + EXCERPT_RADIUS).min(input.len());
    while end < input.len() && !input.is_char_boundary(end) {
        end += 1;
    }

    input[start..end].to_string()
}
