//! Status and role enums shared by the client and the server.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role of a message in the client-side transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// Sender tag stored by the server and sent over the wire.
///
/// The server records AI replies as `"ai"`; the client renders them with
/// [`ChatRole::Assistant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "medicart.chat_sender", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ChatSender {
    User,
    Ai,
}

impl From<ChatSender> for ChatRole {
    fn from(sender: ChatSender) -> Self {
        match sender {
            ChatSender::User => Self::User,
            ChatSender::Ai => Self::Assistant,
        }
    }
}

impl From<ChatRole> for ChatSender {
    fn from(role: ChatRole) -> Self {
        match role {
            ChatRole::User => Self::User,
            ChatRole::Assistant => Self::Ai,
        }
    }
}

impl fmt::Display for ChatSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Ai => write!(f, "ai"),
        }
    }
}

impl FromStr for ChatSender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "ai" => Ok(Self::Ai),
            _ => Err(format!("invalid chat sender: {s}")),
        }
    }
}

/// Steps of the simulated checkout wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Shipping,
    Payment,
    Review,
    Complete,
}

impl CheckoutStep {
    /// The step after this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Shipping => Some(Self::Payment),
            Self::Payment => Some(Self::Review),
            Self::Review => Some(Self::Complete),
            Self::Complete => None,
        }
    }

    /// The step before this one. `Shipping` and `Complete` have none.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Payment => Some(Self::Shipping),
            Self::Review => Some(Self::Payment),
            Self::Shipping | Self::Complete => None,
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shipping => write!(f, "shipping"),
            Self::Payment => write!(f, "payment"),
            Self::Review => write!(f, "review"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_role_mapping() {
        assert_eq!(ChatRole::from(ChatSender::Ai), ChatRole::Assistant);
        assert_eq!(ChatRole::from(ChatSender::User), ChatRole::User);
        assert_eq!(ChatSender::from(ChatRole::Assistant), ChatSender::Ai);
    }

    #[test]
    fn test_sender_wire_format() {
        assert_eq!(
            serde_json::to_string(&ChatSender::Ai).expect("serialize"),
            "\"ai\""
        );
        assert_eq!("user".parse::<ChatSender>(), Ok(ChatSender::User));
        assert!("assistant".parse::<ChatSender>().is_err());
    }

    #[test]
    fn test_checkout_step_order() {
        assert_eq!(CheckoutStep::default(), CheckoutStep::Shipping);
        assert_eq!(CheckoutStep::Shipping.next(), Some(CheckoutStep::Payment));
        assert_eq!(CheckoutStep::Review.next(), Some(CheckoutStep::Complete));
        assert_eq!(CheckoutStep::Complete.next(), None);
        assert_eq!(CheckoutStep::Review.previous(), Some(CheckoutStep::Payment));
        assert_eq!(CheckoutStep::Complete.previous(), None);
    }
}
