//! Prompt context assembly.
//!
//! `build_prompt` renders stored history plus the current message into the
//! exact text sent to the generation backend. Pure and deterministic: the
//! orchestrator owns all IO.

use quill_types::chat::Turn;

/// Maximum number of historical turns included in a prompt.
///
/// Older turns fall out of the context window but stay in persisted history.
pub const CONTEXT_WINDOW_TURNS: usize = 10;

/// Header prefixing rendered history.
const HISTORY_HEADER: &str = "Previous conversation:";

/// Build the prompt for a generation call.
///
/// With no history, the prompt is exactly `current_message`. Otherwise the
/// last [`CONTEXT_WINDOW_TURNS`] turns are rendered as `"<role>: <content>"`
/// lines under a fixed header, followed by a blank line and
/// `"User: <current_message>"`.
pub fn build_prompt(history: &[Turn], current_message: &str) -> String {
    if history.is_empty() {
        return current_message.to_string();
    }

    let window_start = history.len().saturating_sub(CONTEXT_WINDOW_TURNS);
    let context = history[window_start..]
        .iter()
        .map(|turn| format!("{}: {}", turn.role, turn.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{HISTORY_HEADER}\n{context}\n\nUser: {current_message}")
}
