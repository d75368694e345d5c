//! Prompt templates for the editor's AI actions.
//!
//! Context is clipped with a hard character cutoff before templating; no
//! ellipsis, no token counting. The system and user parts are joined with a
//! blank line and sent as a single user message, which keeps the request
//! shape identical across all provider families.

use genstudio_config::constants::defaults;

pub const CODE_SYSTEM_PROMPT: &str = "You are an Expert Software Architect.";
pub const DOCUMENT_SYSTEM_PROMPT: &str = "You are an Expert Professor and Tutor.";

/// Clip to the first `limit` characters. Operates on characters, not bytes,
/// so multi-byte content never splits mid-codepoint.
pub fn truncate_chars(content: &str, limit: usize) -> &str {
    match content.char_indices().nth(limit) {
        Some((byte_index, _)) => &content[..byte_index],
        None => content,
    }
}

/// Prompt for transforming the active code buffer.
pub fn code_prompt(instruction: &str, content: &str) -> String {
    let context = truncate_chars(content, defaults::CODE_CONTEXT_CHAR_LIMIT);
    let user = format!("Instruction: {instruction}\n\nCode Context:\n{context}");
    format!("{CODE_SYSTEM_PROMPT}\n\n{user}")
}

/// Prompt for analyzing lecture notes or other document material.
pub fn document_prompt(instruction: &str, content: &str) -> String {
    let material = truncate_chars(content, defaults::DOCUMENT_CONTEXT_CHAR_LIMIT);
    let user = format!(
        "Instruction: {instruction}\n\n\
         Source Material (Lecture/Notes):\n{material}\n\n\
         Task: Explain clearly, summarize key points, or create a quiz as requested.\n\
         Output: Markdown formatted."
    );
    format!("{DOCUMENT_SYSTEM_PROMPT}\n\n{user}")
}

/// Prompt for whole-buffer refactoring. No truncation: the refactored code
/// must cover the entire buffer or the output is useless.
pub fn refactor_prompt(language: &str, code: &str) -> String {
    format!(
        "Refactor this {language} code:\n\n\
         ```{language}\n{code}\n```\n\n\
         Provide:\n\
         1. Summary\n\
         2. Complete refactored code\n\
         3. Key improvements"
    )
}
