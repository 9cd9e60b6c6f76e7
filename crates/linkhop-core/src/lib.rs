//! Core types and traits for the linkhop URL shortener.
//!
//! This crate provides the link and user records, the repository contracts
//! implemented by the storage backends, and the [`Shortener`] contract
//! consumed by the HTTP gateway.

pub mod error;
pub mod id;
pub mod link;
pub mod repository;
pub mod shortener;
pub mod token;
pub mod user;

pub use error::{CoreError, ShortenerError, StorageError};
pub use id::{LinkId, UserId};
pub use link::{LinkPatch, LinkQuery, LinkRecord, LinkStats, NewLink, Page};
pub use repository::{LinkRepository, ReadRepository, UserRepository};
pub use shortener::{CreateLink, Shortener};
pub use token::ShortToken;
pub use user::{NewUser, Role, UserRecord};
