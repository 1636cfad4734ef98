//! MediCart Core - Shared domain types.
//!
//! This crate provides the types used across all MediCart components:
//! - `client` - Cart, chat, auth and checkout stores driven by a front end
//! - `server` - API server persisting users and chat transcripts
//! - `cli` - Command-line front end and database migrations
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, prices, emails, cart lines, chat messages and products

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
