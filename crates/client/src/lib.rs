//! MediCart client library.
//!
//! Stores behind the MediCart front end:
//! - [`cart::CartStore`] - persisted shopping cart
//! - [`chat::ChatStore`] - MediBot transcript synchronized with the server
//! - [`auth::AuthStore`] - signed-in user
//! - [`catalog::Catalog`] - built-in medicine list and filters
//! - [`checkout::CheckoutWizard`] - simulated checkout
//!
//! [`state::AppContext`] builds them once and hands them out.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod chat;
pub mod checkout;
pub mod config;
pub mod error;
pub mod state;
pub mod storage;

pub use config::ClientConfig;
pub use error::ClientError;
pub use state::AppContext;
