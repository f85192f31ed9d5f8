//! Document context assembly
//!
//! Shared by both provider adapters. Documents are folded into the outgoing
//! prompt in array order, each one truncated independently before
//! transmission; no reordering or deduplication.

use std::borrow::Cow;
use std::fmt::Write;

use crate::models::api::DocumentAttachment;

/// Maximum characters of a single document forwarded upstream
pub const DOCUMENT_CONTENT_LIMIT: usize = 10_000;

/// Marker appended when a document is cut at the limit
pub const TRUNCATION_MARKER: &str = "... [truncated]";

/// Prefix of the final block carrying the literal user prompt
pub const PROMPT_PREFIX: &str = "User request:";

/// Introductory block preceding the document blocks
pub const DOCUMENT_INTRO: &str =
    "The user attached the following documents as context for their request:";

/// Sent instead of the document blocks when assembly fails
pub const DOCUMENT_FALLBACK_NOTE: &str =
    "The attached documents could not be included with this request.";

/// Truncate document content to the transmission limit.
/// Content at or under the limit passes through unmodified.
pub fn truncate_content(content: &str) -> Cow<'_, str> {
    match content.char_indices().nth(DOCUMENT_CONTENT_LIMIT) {
        Some((byte_index, _)) => {
            let mut truncated = content[..byte_index].to_string();
            truncated.push_str(TRUNCATION_MARKER);
            Cow::Owned(truncated)
        }
        None => Cow::Borrowed(content),
    }
}

/// Build the ordered block texts for a document-bearing request: the intro,
/// one block per document, then the prompt block. Always `documents.len() + 2`
/// entries.
pub fn document_block_texts(
    documents: &[DocumentAttachment],
    prompt: &str,
) -> Result<Vec<String>, std::fmt::Error> {
    let mut blocks = Vec::with_capacity(documents.len() + 2);
    blocks.push(DOCUMENT_INTRO.to_string());

    for (index, document) in documents.iter().enumerate() {
        let mut block = String::new();
        write!(
            block,
            "Document {}: {}\n{}",
            index + 1,
            document.name,
            truncate_content(&document.content)
        )?;
        blocks.push(block);
    }

    let mut request_block = String::new();
    write!(request_block, "{} {}", PROMPT_PREFIX, prompt)?;
    blocks.push(request_block);

    Ok(blocks)
}

/// Single-block fallback used when document assembly fails
pub fn fallback_text(prompt: &str) -> String {
    format!("{}\n\n{} {}", DOCUMENT_FALLBACK_NOTE, PROMPT_PREFIX, prompt)
}

/// Flatten the block texts into one user-turn string for providers whose
/// message format carries no content blocks
pub fn inline_document_context(documents: &[DocumentAttachment], prompt: &str) -> String {
    match document_block_texts(documents, prompt) {
        Ok(blocks) => blocks.join("\n\n"),
        Err(_) => fallback_text(prompt),
    }
}
