//! Core types for MediCart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod chat;
pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod status;
pub mod user;

pub use cart::CartLine;
pub use chat::ChatMessage;
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceBucket, PriceError, format_money};
pub use product::Product;
pub use status::*;
pub use user::UserProfile;
