//! Core domain + application logic for the James SAT tutor bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and Gemini live
//! behind ports (traits) implemented in adapter crates.

pub mod addressing;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod model;
pub mod prompt;
pub mod security;
pub mod utils;

pub use errors::{Error, Result};
