//! # Pairvote Common Library
//!
//! Shared code for the pairvote survey service including:
//! - Database schema, models and queries
//! - API request/response types
//! - Pairwise matchup selection (champion vs. challenger)
//! - Signed session tokens
//! - Configuration loading
//! - Utility functions

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod pairing;
pub mod time;
pub mod token;
pub mod uuid_utils;

pub use error::{Error, Result};
pub use pairing::{Component, Matchup};
