//! HTTP API handlers for pairvote-api

pub mod buildinfo;
pub mod health;
pub mod start;
pub mod vote;

pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use start::start_session;
pub use vote::submit_vote;
