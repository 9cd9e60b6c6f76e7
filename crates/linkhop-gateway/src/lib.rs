//! HTTP surface of linkhop.
//!
//! [`App::router`] wires the management API under `/api`, the admin
//! endpoints, and the public `GET /{shortId}` redirect onto an [`AppState`]
//! holding the shortener, redirector and authenticator.

pub mod app;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod model;
pub mod rate_limit;
pub mod state;

pub use app::{App, RateLimits};
pub use error::AppError;
pub use state::AppState;
