//! Database schema, models and queries

pub mod access_codes;
pub mod init;
pub mod models;
pub mod participants;
pub mod settings;
pub mod votes;

pub use init::*;
pub use models::*;
