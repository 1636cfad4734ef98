//! MediCart API server library.
//!
//! Accounts and MediBot chat for the MediCart storefront, exposed as a
//! library so the CLI can run migrations and the router can be tested
//! in-process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod gemini;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
