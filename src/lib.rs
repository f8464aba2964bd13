//! TaskPrint backend: a small HTTP service for a household task board.
//!
//! It stores a single task list as a JSON document, accepts image uploads
//! that are kept on the local filesystem and served back over HTTP, and
//! forwards print jobs to a thermal printer (currently a logging stub).
//!
//! [`routes::routes::routes`] builds the router and [`state::AppState`]
//! carries the services; the binary in `main.rs` only adds config, logging,
//! and the listener.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;
