//! Signed-in user session.
//!
//! The profile returned by the server is persisted under [`USER_KEY`] so the
//! user stays signed in across restarts. Its email doubles as the chat
//! identity.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use medicart_core::{Email, EmailError, UserProfile};

use crate::api::{ApiError, AuthApi};
use crate::storage::{LocalStorage, USER_KEY};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Errors returned by [`AuthStore`] operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("name is required")]
    MissingName,

    #[error("password is required")]
    MissingPassword,

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("passwords do not match")]
    PasswordMismatch,

    /// The server rejected the request or could not be reached.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Registration form input.
#[derive(Debug, Clone)]
pub struct Registration<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
}

impl Registration<'_> {
    fn validate(&self) -> Result<Email, AuthError> {
        if self.name.trim().is_empty() {
            return Err(AuthError::MissingName);
        }
        let email = Email::parse(self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }
        if self.password != self.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        Ok(email)
    }
}

/// Holds the signed-in user, if any.
pub struct AuthStore {
    user: Option<UserProfile>,
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn LocalStorage>,
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStore")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl AuthStore {
    /// Restore the persisted session. Missing or unreadable data means
    /// signed out.
    pub fn load(api: Arc<dyn AuthApi>, storage: Arc<dyn LocalStorage>) -> Self {
        let user = match storage.get(USER_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "discarding malformed stored user");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "failed to read stored user");
                None
            }
        };

        Self { user, api, storage }
    }

    #[must_use]
    pub const fn current_user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// The email used to key the chat transcript.
    #[must_use]
    pub fn identity(&self) -> Option<&Email> {
        self.user.as_ref().map(|u| &u.email)
    }

    /// Sign in with existing credentials.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the input is invalid or the server rejects it.
    /// The current session is unchanged on error.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&UserProfile, AuthError> {
        let email = Email::parse(email)?;
        if password.is_empty() {
            return Err(AuthError::MissingPassword);
        }

        let user = self.api.login(&email, password).await?;
        info!(user_id = %user.id, "signed in");
        Ok(self.set_user(user))
    }

    /// Create an account and sign in as it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the form is invalid or the server rejects it.
    #[instrument(skip(self, form), fields(email = form.email))]
    pub async fn register(&mut self, form: &Registration<'_>) -> Result<&UserProfile, AuthError> {
        let email = form.validate()?;
        let user = self
            .api
            .register(form.name.trim(), &email, form.password)
            .await?;
        info!(user_id = %user.id, "registered");
        Ok(self.set_user(user))
    }

    /// Sign out and forget the stored profile.
    pub fn logout(&mut self) {
        self.user = None;
        if let Err(e) = self.storage.remove(USER_KEY) {
            warn!(error = %e, "failed to remove stored user");
        }
        debug!("signed out");
    }

    fn set_user(&mut self, user: UserProfile) -> &UserProfile {
        match serde_json::to_string(&user) {
            Ok(json) => {
                if let Err(e) = self.storage.set(USER_KEY, &json) {
                    warn!(error = %e, "failed to persist user");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize user"),
        }
        self.user.insert(user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use medicart_core::UserId;

    use super::*;
    use crate::storage::MemoryStorage;

    /// Accepts one fixed account.
    #[derive(Default)]
    struct FakeAuth {
        registered: Mutex<Vec<Email>>,
    }

    #[async_trait]
    impl AuthApi for FakeAuth {
        async fn login(&self, email: &Email, password: &str) -> Result<UserProfile, ApiError> {
            if email.as_str() == "abdi@gmail.com" && password == "secret1" {
                Ok(UserProfile {
                    id: UserId::new(1),
                    name: "Abdi".to_string(),
                    email: email.clone(),
                })
            } else {
                Err(ApiError::Server("The Password is not correct!".to_string()))
            }
        }

        async fn register(
            &self,
            name: &str,
            email: &Email,
            _password: &str,
        ) -> Result<UserProfile, ApiError> {
            let mut registered = self.registered.lock().unwrap();
            if registered.contains(email) {
                return Err(ApiError::Server("User already exists".to_string()));
            }
            registered.push(email.clone());
            Ok(UserProfile {
                id: UserId::new(2),
                name: name.to_string(),
                email: email.clone(),
            })
        }
    }

    fn store(storage: &Arc<MemoryStorage>) -> AuthStore {
        AuthStore::load(
            Arc::new(FakeAuth::default()),
            Arc::clone(storage) as Arc<dyn LocalStorage>,
        )
    }

    #[tokio::test]
    async fn test_login_persists_session() {
        let storage = Arc::new(MemoryStorage::new());
        let mut auth = store(&storage);
        assert!(!auth.is_authenticated());

        auth.login(" Abdi@Gmail.com ", "secret1").await.unwrap();
        assert!(auth.is_authenticated());
        assert_eq!(auth.identity().unwrap().as_str(), "abdi@gmail.com");

        let restored = store(&storage);
        assert_eq!(restored.current_user().unwrap().name, "Abdi");
    }

    #[tokio::test]
    async fn test_login_failure_keeps_signed_out() {
        let storage = Arc::new(MemoryStorage::new());
        let mut auth = store(&storage);

        let err = auth.login("abdi@gmail.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::Api(ApiError::Server(_))));
        assert!(!auth.is_authenticated());
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_rejects_bad_input_locally() {
        let storage = Arc::new(MemoryStorage::new());
        let mut auth = store(&storage);

        assert!(matches!(
            auth.login("not-an-email", "secret1").await,
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            auth.login("abdi@gmail.com", "").await,
            Err(AuthError::MissingPassword)
        ));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let storage = Arc::new(MemoryStorage::new());
        let mut auth = store(&storage);
        let base = Registration {
            name: "Sam",
            email: "sam@example.com",
            password: "hunter22",
            confirm_password: "hunter22",
        };

        let form = Registration { name: " ", ..base.clone() };
        assert!(matches!(auth.register(&form).await, Err(AuthError::MissingName)));

        let form = Registration {
            password: "abc",
            confirm_password: "abc",
            ..base.clone()
        };
        assert!(matches!(
            auth.register(&form).await,
            Err(AuthError::PasswordTooShort { min: 6 })
        ));

        let form = Registration {
            confirm_password: "hunter23",
            ..base.clone()
        };
        assert!(matches!(
            auth.register(&form).await,
            Err(AuthError::PasswordMismatch)
        ));

        let user = auth.register(&base).await.unwrap();
        assert_eq!(user.name, "Sam");
        assert!(auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let mut auth = store(&storage);
        auth.login("abdi@gmail.com", "secret1").await.unwrap();

        auth.logout();
        assert!(!auth.is_authenticated());
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }

    #[test]
    fn test_malformed_stored_user_is_signed_out() {
        let storage = Arc::new(MemoryStorage::with_entry(USER_KEY, "{\"id\":"));
        let auth = store(&storage);
        assert!(!auth.is_authenticated());
    }
}
