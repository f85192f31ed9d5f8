//! Logging utilities
//!
//! Builds filtered request summaries for debug logs

use crate::models::api::CompletionRequest;

/// Truncate a string with a note about original length
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() > max_len {
        let cut = s
            .char_indices()
            .take_while(|(i, _)| *i <= max_len)
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0);
        format!("{}... ({} chars truncated)", &s[..cut], s.len() - cut)
    } else {
        s.to_string()
    }
}

/// Create a filtered summary of a completion request for logging.
/// Document contents are reduced to names and sizes; the prompt is truncated.
pub fn create_completion_log_summary(request: &CompletionRequest) -> serde_json::Value {
    let documents: Vec<serde_json::Value> = request
        .documents
        .iter()
        .map(|doc| {
            serde_json::json!({
                "name": doc.name,
                "content_chars": doc.content.chars().count(),
            })
        })
        .collect();

    serde_json::json!({
        "modelId": request.model_id,
        "prompt": truncate_for_log(&request.prompt, 200),
        "temperature": request.temperature,
        "maxTokens": request.max_tokens,
        "systemMessage": request.system_message.as_deref().map(|s| truncate_for_log(s, 100)),
        "documents": documents,
    })
}
