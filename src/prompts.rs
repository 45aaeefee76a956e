//! Prompt templates and display helpers for retrieved text.

use crate::retrieval::RetrievedChunk;

/// Text preceding the pasted report in the summarization prompt.
pub const SUMMARY_PROMPT_PREFIX: &str =
    "Please provide a concise summary of the following chest X-ray findings:\n\n";
/// Text following the pasted report in the summarization prompt.
pub const SUMMARY_PROMPT_SUFFIX: &str = "\n\nSummary:";

const QA_PROMPT_PREAMBLE: &str = "Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.";

/// Maximum number of characters of a source chunk shown to the user.
pub const EXCERPT_CHARS: usize = 300;

/// Substitute `report` verbatim into the summarization template.
pub fn summarization_prompt(report: &str) -> String {
    format!("{SUMMARY_PROMPT_PREFIX}{report}{SUMMARY_PROMPT_SUFFIX}")
}

/// Build the single-request QA prompt, stuffing every retrieved chunk in as context.
pub fn qa_prompt(question: &str, chunks: &[RetrievedChunk]) -> String {
    let context = chunks
        .iter()
        .map(|hit| hit.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{QA_PROMPT_PREAMBLE}\n\n{context}\n\nQuestion: {question}\nHelpful Answer:")
}

/// First [`EXCERPT_CHARS`] characters of `text`, and whether anything was cut.
///
/// Counts Unicode scalar values so multi-byte characters are never split.
pub fn excerpt(text: &str) -> (&str, bool) {
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((byte_offset, _)) => (&text[..byte_offset], true),
        None => (text, false),
    }
}
