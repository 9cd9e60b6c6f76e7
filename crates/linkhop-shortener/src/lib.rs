//! Link management service.
//!
//! This crate provides the owner-scoped [`ShortenerService`] and the
//! [`TokenAllocator`] that hands out unused short tokens. Core types are
//! re-exported from `linkhop_core`.

pub mod allocator;
pub mod service;
pub mod validate;

pub use allocator::TokenAllocator;
pub use linkhop_core::{CreateLink, Shortener, ShortenerError};
pub use service::ShortenerService;
