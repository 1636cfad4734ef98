//! Prompt rendering for MediBot.

use askama::Template;
use thiserror::Error;

use medicart_core::ChatSender;

use crate::models::{PromptEntry, StoredMessage};

/// Errors that can occur while building a prompt.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("history serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("template error: {0}")]
    Template(#[from] askama::Error),
}

/// The full prompt sent to the model for one user message.
#[derive(Template)]
#[template(path = "gemini/prompt.txt")]
struct MedicalPrompt<'a> {
    history_json: &'a str,
    message: &'a str,
}

/// Render the prompt for `message` given the stored transcript before it.
///
/// `message` is not stored yet; it is appended to `earlier` as the newest
/// history entry.
///
/// # Errors
///
/// Returns `PromptError` if the history cannot be serialized or the template
/// fails to render.
pub fn render_prompt(earlier: &[StoredMessage], message: &str) -> Result<String, PromptError> {
    let entries: Vec<PromptEntry<'_>> = earlier
        .iter()
        .map(PromptEntry::from)
        .chain(std::iter::once(PromptEntry {
            sender: ChatSender::User,
            content: message,
        }))
        .collect();
    let history_json = serde_json::to_string(&entries)?;

    let prompt = MedicalPrompt {
        history_json: &history_json,
        message,
    }
    .render()?;
    Ok(prompt)
}
