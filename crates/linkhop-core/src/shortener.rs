use crate::error::ShortenerError;
use crate::id::{LinkId, UserId};
use crate::link::{LinkPatch, LinkQuery, LinkRecord, LinkStats, Page};
use async_trait::async_trait;

type Result<T> = std::result::Result<T, ShortenerError>;

/// Parameters for creating a shortened URL.
#[derive(Debug, Clone, Default)]
pub struct CreateLink {
    /// The absolute URL to shorten.
    pub original_url: String,
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Owner-scoped link management.
///
/// Every operation taking an `owner` only sees records belonging to that
/// owner; records of other users behave as if they did not exist.
#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Validates the URL, allocates a fresh short token and stores the link.
    async fn create(&self, owner: UserId, params: CreateLink) -> Result<LinkRecord>;

    async fn list(&self, owner: UserId, query: LinkQuery) -> Result<Page<LinkRecord>>;

    async fn get(&self, owner: UserId, id: LinkId) -> Result<LinkRecord>;

    async fn stats(&self, owner: UserId, id: LinkId) -> Result<LinkStats>;

    async fn update(&self, owner: UserId, id: LinkId, patch: LinkPatch) -> Result<LinkRecord>;

    async fn delete(&self, owner: UserId, id: LinkId) -> Result<()>;

    /// Every link of every user, newest first. Admin only.
    async fn list_all(&self) -> Result<Vec<LinkRecord>>;
}
