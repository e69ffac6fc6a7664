//! # Taskboard Client
//!
//! Client-side pieces of the board:
//!
//! - `session`: the signed-in user's identity display and sign-out control
//! - `board`: typed HTTP client for the board API
//! - `error`: client error type

pub mod board;
pub mod error;
pub mod session;

pub use board::BoardClient;
pub use error::ClientError;
pub use session::{HttpIdentityProvider, IdentityProvider, Session, SessionDisplay};
