//! # Taskboard Shared Library
//!
//! This crate contains the data layer and board logic used by the Taskboard
//! API server and client.
//!
//! ## Module Organization
//!
//! - `db`: Secret resolution, connection pool and migrations
//! - `models`: Card and task rows with their queries
//! - `board`: Board operations (listing, mutations, task reconciliation)
//! - `auth`: Token validation and ownership checks
//! - `error`: Board error type
//!
//! `auth`, `db`, `error` and the board operations need the default `server`
//! feature. Without it the crate only carries the card and task types and the
//! reconciliation planner, which is what HTTP clients of the board use.

#[cfg(feature = "server")]
pub mod auth;
pub mod board;
#[cfg(feature = "server")]
pub mod db;
#[cfg(feature = "server")]
pub mod error;
pub mod models;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
