//! Command implementations.
//!
//! Each command returns the text to print; `main` owns stdout.

pub mod account;
pub mod cart;
pub mod chat;
pub mod checkout;
pub mod migrate;
pub mod products;

use thiserror::Error;

use medicart_client::ClientError;
use medicart_client::auth::AuthError;
use medicart_client::checkout::CheckoutError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("checkout failed: {0}")]
    Checkout(#[from] CheckoutError),

    /// Server configuration (database URL) is missing or invalid.
    #[error("configuration error: {0}")]
    ServerConfig(#[from] medicart_server::config::ConfigError),

    /// Database connection error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("unknown product: {0}")]
    UnknownProduct(String),

    #[error("not signed in; run `medicart login` first")]
    NotSignedIn,

    #[error("{0}")]
    Invalid(String),

    /// The chat request reached the network and failed.
    #[error("chat failed: {0}")]
    Chat(String),
}
