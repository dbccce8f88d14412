//! Core domain + application logic for the Encryptonite greeter bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the HTTP
//! liveness endpoint live in adapter crates; the core talks to the outside world
//! through ports (traits).

pub mod bot;
pub mod broadcast;
pub mod config;
pub mod conversation;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod messaging;
pub mod store;
pub mod texts;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{Error, Result};
