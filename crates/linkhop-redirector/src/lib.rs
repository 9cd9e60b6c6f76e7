//! Redirect resolution and click tracking.
//!
//! [`RedirectorService`] turns a short token into the URL to redirect to.
//! A successful [`Redirector::visit`] counts exactly one click on the record
//! before the target is handed back, so every issued redirect is counted.
//!
//! ```rust
//! use linkhop_core::{LinkRepository, NewLink, ShortToken, UserId};
//! use linkhop_redirector::{Redirector, RedirectorService};
//! use linkhop_storage::InMemoryRepository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = InMemoryRepository::new();
//! let token = ShortToken::new("abc12345")?;
//! repo.insert(NewLink {
//!     short_token: token.clone(),
//!     original_url: "https://example.com".into(),
//!     title: String::new(),
//!     tags: Vec::new(),
//!     owner: UserId::new(),
//! })
//! .await?;
//!
//! let service = RedirectorService::new(repo);
//! let target = service.visit(&token).await?;
//! assert_eq!(target, "https://example.com");
//! # Ok(())
//! # }
//! ```

mod error;
mod redirector;
pub mod service;

pub use error::RedirectorError;
pub use redirector::Redirector;
pub use service::RedirectorService;

pub type Result<T> = std::result::Result<T, RedirectorError>;
