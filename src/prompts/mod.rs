//! Prompt assembly for model requests
//!
//! This module holds the NEXUS persona and renders the per-turn prompt that
//! carries recent conversation history to a stateless model backend.

pub mod persona;

pub use persona::NEXUS_PERSONA;

use crate::storage::{ChatMessage, Role};

/// Label used for a message author inside the rendered prompt
fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "User",
        Role::Assistant => "NEXUS",
    }
}

/// Renders the prompt for one turn
///
/// `history` must already be bounded and in chronological order. Each prior
/// message becomes a `User:` or `NEXUS:` line, followed by the new request.
///
/// # Examples
///
/// ```
/// use nexus::prompts::build_prompt;
/// use nexus::storage::ChatMessage;
///
/// let history = vec![
///     ChatMessage::user("s1", "hi"),
///     ChatMessage::assistant("s1", "hello", None),
/// ];
/// let prompt = build_prompt(&history, "scan example.com");
/// assert_eq!(
///     prompt,
///     "Previous conversation:\nUser: hi\nNEXUS: hello\n\n\nCurrent request: scan example.com"
/// );
/// ```
pub fn build_prompt(history: &[ChatMessage], user_message: &str) -> String {
    let context: String = history
        .iter()
        .map(|msg| format!("{}: {}\n", speaker(msg.role), msg.content))
        .collect();

    format!("Previous conversation:\n{context}\n\nCurrent request: {user_message}")
}
