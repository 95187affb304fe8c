//! Lyric catalog
//!
//! A catalog of songs and song lists with forgiving lyric search and a
//! single rate-limited admin login guarding edits.
//!
//! - [`search`]: query parsing, fuzzy/exact matching and library ordering
//! - [`auth`]: password hashing, login lockout and admin sessions
//! - [`state`]: catalog persistence (in-memory or sled)
//! - [`api`]: the axum HTTP surface

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod search;
pub mod state;

pub use error::{AppError, Result};
