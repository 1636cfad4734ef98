//! User profile type shared by the API server and the client.

use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::UserId;

/// The public part of a user account.
///
/// Returned by `/login` and `/register` and persisted by the client so the
/// user stays signed in across restarts. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}
