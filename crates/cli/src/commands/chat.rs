//! MediBot chat commands.
//!
//! ```bash
//! medicart chat send "Can I take ibuprofen with food?"
//! medicart chat history
//! ```

use std::fmt::Write as _;

use clap::Subcommand;

use medicart_client::AppContext;
use medicart_client::chat::{HistoryOutcome, SendOutcome};
use medicart_core::{ChatMessage, ChatRole};

use super::CliError;

#[derive(Debug, Subcommand)]
pub enum ChatAction {
    /// Send a message and print MediBot's reply
    Send {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Print the stored transcript
    History,
}

pub async fn run(ctx: &AppContext, action: ChatAction) -> Result<String, CliError> {
    let identity = ctx.auth().identity().ok_or(CliError::NotSignedIn)?;
    let chat = ctx.chat();

    match action {
        ChatAction::Send { message } => {
            match chat.send_message(&message.join(" "), Some(identity)).await {
                SendOutcome::Delivered => Ok(chat
                    .messages()
                    .last()
                    .map(|m| m.content.clone())
                    .unwrap_or_default()),
                SendOutcome::Skipped => Err(CliError::Invalid("message is empty".to_string())),
                SendOutcome::TooLong { max, len } => Err(CliError::Invalid(format!(
                    "message is {len} characters; the limit is {max}"
                ))),
                SendOutcome::Busy => Err(CliError::Invalid(
                    "a message is already being sent".to_string(),
                )),
                SendOutcome::Failed { error } => Err(CliError::Chat(error)),
            }
        }
        ChatAction::History => match chat.fetch_history(Some(identity)).await {
            HistoryOutcome::Loaded(_) => Ok(render(&chat.messages())),
            HistoryOutcome::Failed(error) => Err(CliError::Chat(error)),
            HistoryOutcome::Skipped | HistoryOutcome::Busy => Err(CliError::Invalid(
                "history is not available right now".to_string(),
            )),
        },
    }
}

fn render(messages: &[ChatMessage]) -> String {
    let mut out = String::new();
    for message in messages {
        let who = match message.role {
            ChatRole::User => "You",
            ChatRole::Assistant => "MediBot",
        };
        match message.timestamp {
            Some(at) => {
                let _ = writeln!(out, "[{}] {who}: {}", at.format("%Y-%m-%d %H:%M"), message.content);
            }
            None => {
                let _ = writeln!(out, "{who}: {}", message.content);
            }
        }
    }
    out.trim_end().to_string()
}
