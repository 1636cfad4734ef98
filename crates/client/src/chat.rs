//! MediBot chat session.
//!
//! [`ChatStore`] owns the running transcript for one session. It appends the
//! user's message optimistically, waits for the server's reply and then either
//! appends it or adopts the server's transcript wholesale.
//!
//! At most one request is in flight at a time. State lives behind a short-held
//! mutex that is released before every network call, so the UI can render
//! `AwaitingReply` while a request is pending.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, instrument, warn};

use medicart_core::{ChatMessage, ChatRole, Email};

use crate::api::ChatApi;
use crate::config::DEFAULT_CHAT_MAX_LENGTH;

/// First message of every fresh session.
pub const GREETING: &str = "Hello! I'm MediBot, your medical assistant. How can I help you today?";

/// Shown in the transcript when a send fails.
pub const SEND_FAILED_MESSAGE: &str =
    "Sorry, I encountered an error processing your request. Please try again later.";

/// Replaces the transcript when a history fetch fails.
pub const HISTORY_FAILED_MESSAGE: &str =
    "Sorry, I couldn't load your chat history. Please check your connection and try again.";

/// Request state of the session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChatState {
    /// No request is in flight.
    #[default]
    Idle,
    /// A send or history fetch is in flight.
    AwaitingReply,
    /// The last request failed. The store stays usable.
    Error(String),
}

/// Result of [`ChatStore::send_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank text or no identity; nothing happened.
    Skipped,
    /// Text is longer than the configured maximum; nothing was sent.
    TooLong { max: usize, len: usize },
    /// Another request is in flight; nothing happened.
    Busy,
    /// The reply (or the server transcript) was recorded.
    Delivered,
    /// The request failed; an error message was appended.
    Failed { error: String },
}

/// Result of [`ChatStore::fetch_history`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryOutcome {
    /// No identity; nothing happened.
    Skipped,
    /// Another request is in flight; nothing happened.
    Busy,
    /// The transcript now holds this many server messages.
    Loaded(usize),
    /// The fetch failed; the transcript was replaced by an error message.
    Failed(String),
}

#[derive(Debug)]
struct ChatInner {
    messages: Vec<ChatMessage>,
    state: ChatState,
    is_open: bool,
}

/// Conversation transcript plus request state.
pub struct ChatStore {
    api: Arc<dyn ChatApi>,
    max_length: usize,
    inner: Mutex<ChatInner>,
}

impl std::fmt::Debug for ChatStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatStore")
            .field("max_length", &self.max_length)
            .field("inner", &*self.lock())
            .finish_non_exhaustive()
    }
}

/// Marks a request in flight. Dropping it without [`InFlight::finish`]
/// (for example when the caller's future is cancelled) returns the store to
/// `Idle` and appends `on_cancel`, if set, so the optimistic user message
/// still gets a visible answer.
struct InFlight<'a> {
    store: &'a ChatStore,
    on_cancel: Option<&'static str>,
    finished: bool,
}

impl InFlight<'_> {
    fn finish(mut self, update: impl FnOnce(&mut ChatInner)) {
        let mut inner = self.store.lock();
        update(&mut inner);
        self.finished = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            let mut inner = self.store.lock();
            if inner.state == ChatState::AwaitingReply {
                if let Some(message) = self.on_cancel {
                    inner.messages.push(ChatMessage::assistant(message));
                }
                inner.state = ChatState::Idle;
            }
        }
    }
}

impl ChatStore {
    /// Create a session with the greeting and the default length limit.
    #[must_use]
    pub fn new(api: Arc<dyn ChatApi>) -> Self {
        Self::with_max_length(api, DEFAULT_CHAT_MAX_LENGTH)
    }

    /// Create a session with the greeting and a custom length limit.
    #[must_use]
    pub fn with_max_length(api: Arc<dyn ChatApi>, max_length: usize) -> Self {
        Self {
            api,
            max_length,
            inner: Mutex::new(ChatInner {
                messages: vec![ChatMessage::assistant(GREETING)],
                state: ChatState::Idle,
                is_open: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChatInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enter `AwaitingReply`, or `None` if a request is already in flight.
    /// `prepare` runs under the same lock, before any other caller can observe
    /// the new state. `on_cancel` is appended if the request is abandoned.
    fn begin(
        &self,
        on_cancel: Option<&'static str>,
        prepare: impl FnOnce(&mut ChatInner),
    ) -> Option<InFlight<'_>> {
        let mut inner = self.lock();
        if inner.state == ChatState::AwaitingReply {
            return None;
        }
        prepare(&mut inner);
        inner.state = ChatState::AwaitingReply;
        Some(InFlight {
            store: self,
            on_cancel,
            finished: false,
        })
    }

    /// Longest accepted message, in characters.
    #[must_use]
    pub const fn max_length(&self) -> usize {
        self.max_length
    }

    /// Snapshot of the transcript.
    #[must_use]
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock().messages.clone()
    }

    /// Current request state.
    #[must_use]
    pub fn state(&self) -> ChatState {
        self.lock().state.clone()
    }

    /// Error text of the last failed request, if the store is in `Error`.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        match &self.lock().state {
            ChatState::Error(message) => Some(message.clone()),
            _ => None,
        }
    }

    /// Append a message stamped now.
    pub fn add_message(&self, content: impl Into<String>, role: ChatRole) {
        self.lock().messages.push(ChatMessage::now(role, content));
    }

    /// Show the chat window.
    pub fn open(&self) {
        self.lock().is_open = true;
    }

    /// Hide the chat window.
    pub fn close(&self) {
        self.lock().is_open = false;
    }

    /// Flip the chat window between shown and hidden.
    pub fn toggle(&self) {
        let mut inner = self.lock();
        inner.is_open = !inner.is_open;
    }

    /// Whether the chat window is shown.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.lock().is_open
    }

    /// Send a user message and record the reply.
    ///
    /// Blank text and a missing identity are ignored. Text longer than the
    /// limit is rejected before anything is appended. Transport and server
    /// failures never escape: they append [`SEND_FAILED_MESSAGE`] and leave
    /// the store in `Error`. A cancelled send also appends
    /// [`SEND_FAILED_MESSAGE`], but returns the store to `Idle`.
    #[instrument(skip(self, text), fields(len = text.chars().count()))]
    pub async fn send_message(&self, text: &str, identity: Option<&Email>) -> SendOutcome {
        let text = text.trim();
        let Some(email) = identity else {
            return SendOutcome::Skipped;
        };
        if text.is_empty() {
            return SendOutcome::Skipped;
        }
        let len = text.chars().count();
        if len > self.max_length {
            return SendOutcome::TooLong {
                max: self.max_length,
                len,
            };
        }

        let Some(guard) = self.begin(Some(SEND_FAILED_MESSAGE), |inner| {
            inner.messages.push(ChatMessage::user(text));
        }) else {
            debug!("send rejected, request already in flight");
            return SendOutcome::Busy;
        };

        match self.api.send_chat(email, text).await {
            Ok(reply) => {
                guard.finish(|inner| {
                    match reply.history {
                        Some(history) => inner.messages = history,
                        None => inner.messages.push(ChatMessage::assistant(reply.response)),
                    }
                    inner.state = ChatState::Idle;
                });
                SendOutcome::Delivered
            }
            Err(e) => {
                warn!(error = %e, "chat request failed");
                let error = e.to_string();
                guard.finish(|inner| {
                    inner
                        .messages
                        .push(ChatMessage::assistant(SEND_FAILED_MESSAGE));
                    inner.state = ChatState::Error(error.clone());
                });
                SendOutcome::Failed { error }
            }
        }
    }

    /// Replace the transcript with the server's history for `identity`.
    ///
    /// Server history always wins, even when it is empty. On failure
    /// the transcript becomes exactly one [`HISTORY_FAILED_MESSAGE`], and
    /// earlier local messages are lost.
    #[instrument(skip(self))]
    pub async fn fetch_history(&self, identity: Option<&Email>) -> HistoryOutcome {
        let Some(email) = identity else {
            return HistoryOutcome::Skipped;
        };

        let Some(guard) = self.begin(None, |_| {}) else {
            debug!("history fetch rejected, request already in flight");
            return HistoryOutcome::Busy;
        };

        match self.api.fetch_history(email).await {
            Ok(history) => {
                let count = history.len();
                guard.finish(|inner| {
                    inner.messages = history;
                    inner.state = ChatState::Idle;
                });
                HistoryOutcome::Loaded(count)
            }
            Err(e) => {
                warn!(error = %e, "chat history fetch failed");
                let error = e.to_string();
                guard.finish(|inner| {
                    inner.messages = vec![ChatMessage::assistant(HISTORY_FAILED_MESSAGE)];
                    inner.state = ChatState::Error(error.clone());
                });
                HistoryOutcome::Failed(error)
            }
        }
    }
}
