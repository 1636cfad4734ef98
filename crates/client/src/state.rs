//! Application context.
//!
//! Every store is built once at start-up and handed to consumers by
//! reference. There is no global state.

use std::sync::Arc;

use tracing::debug;

use crate::api::{ApiClient, AuthApi, ChatApi};
use crate::auth::AuthStore;
use crate::cart::CartStore;
use crate::catalog::Catalog;
use crate::chat::ChatStore;
use crate::checkout::CheckoutWizard;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::storage::{FileStorage, LocalStorage};

/// Stores and services for one client session.
#[derive(Debug)]
pub struct AppContext {
    config: ClientConfig,
    catalog: Catalog,
    cart: CartStore,
    auth: AuthStore,
    chat: Arc<ChatStore>,
}

impl AppContext {
    /// Build a context backed by files under `config.data_dir` and the HTTP
    /// API at `config.api_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let api = Arc::new(ApiClient::new(&config)?);
        let storage: Arc<dyn LocalStorage> = Arc::new(FileStorage::new(&config.data_dir));
        debug!(api_url = %config.api_url, data_dir = %config.data_dir.display(), "client context");
        Ok(Self::with_parts(
            config,
            storage,
            Arc::clone(&api) as Arc<dyn ChatApi>,
            api,
        ))
    }

    /// Build a context from explicit parts.
    #[must_use]
    pub fn with_parts(
        config: ClientConfig,
        storage: Arc<dyn LocalStorage>,
        chat_api: Arc<dyn ChatApi>,
        auth_api: Arc<dyn AuthApi>,
    ) -> Self {
        let cart = CartStore::load(Arc::clone(&storage));
        let auth = AuthStore::load(auth_api, storage);
        let chat = Arc::new(ChatStore::with_max_length(chat_api, config.chat_max_length));
        Self {
            config,
            catalog: Catalog::builtin(),
            cart,
            auth,
            chat,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    #[must_use]
    pub const fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub const fn auth_mut(&mut self) -> &mut AuthStore {
        &mut self.auth
    }

    /// Shared handle to the chat session.
    #[must_use]
    pub fn chat(&self) -> Arc<ChatStore> {
        Arc::clone(&self.chat)
    }

    /// A checkout pre-filled with the signed-in user's name and email.
    #[must_use]
    pub fn start_checkout(&self) -> CheckoutWizard {
        self.auth
            .current_user()
            .map_or_else(CheckoutWizard::new, |user| {
                CheckoutWizard::prefilled(&user.name, &user.email)
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;

    use medicart_core::{ChatMessage, Email, ProductId, UserProfile};

    use super::*;
    use crate::api::{ApiError, ChatReply};
    use crate::storage::MemoryStorage;

    struct Offline;

    #[async_trait]
    impl ChatApi for Offline {
        async fn send_chat(&self, _: &Email, _: &str) -> Result<ChatReply, ApiError> {
            Err(ApiError::Status(503))
        }

        async fn fetch_history(&self, _: &Email) -> Result<Vec<ChatMessage>, ApiError> {
            Err(ApiError::Status(503))
        }
    }

    #[async_trait]
    impl AuthApi for Offline {
        async fn login(&self, _: &Email, _: &str) -> Result<UserProfile, ApiError> {
            Err(ApiError::Status(503))
        }

        async fn register(&self, _: &str, _: &Email, _: &str) -> Result<UserProfile, ApiError> {
            Err(ApiError::Status(503))
        }
    }

    fn context(storage: &Arc<MemoryStorage>) -> AppContext {
        AppContext::with_parts(
            ClientConfig::default(),
            Arc::clone(storage) as Arc<dyn LocalStorage>,
            Arc::new(Offline),
            Arc::new(Offline),
        )
    }

    #[test]
    fn test_cart_survives_restart() {
        let storage = Arc::new(MemoryStorage::new());
        let mut ctx = context(&storage);
        let product = ctx.catalog().product(&ProductId::new("4")).unwrap().clone();
        ctx.cart_mut().add_item(&product, 2);

        let ctx = context(&storage);
        assert_eq!(ctx.cart().item_count(), 2);
        assert!(!ctx.auth().is_authenticated());
    }

    #[test]
    fn test_chat_uses_configured_limit() {
        let storage = Arc::new(MemoryStorage::new());
        let ctx = context(&storage);
        assert_eq!(ctx.chat().max_length(), 200);
    }

    #[test]
    fn test_anonymous_checkout_is_blank() {
        let storage = Arc::new(MemoryStorage::new());
        let ctx = context(&storage);
        assert!(ctx.start_checkout().shipping().is_none());
    }
}
