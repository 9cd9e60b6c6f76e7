use crate::error::StorageError;
use crate::id::{LinkId, UserId};
use crate::link::{LinkPatch, LinkQuery, LinkRecord, NewLink, Page};
use crate::token::ShortToken;
use crate::user::{NewUser, UserRecord};
use async_trait::async_trait;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Token lookups used by the allocator and the redirect path.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the link record for a given short token, active or not.
    /// Returns `None` if the token does not exist.
    async fn find_by_token(&self, token: &ShortToken) -> Result<Option<LinkRecord>>;

    /// Checks whether a short token has ever been assigned.
    async fn exists_by_token(&self, token: &ShortToken) -> Result<bool>;
}

#[async_trait]
pub trait LinkRepository: ReadRepository {
    /// Inserts a new link record.
    ///
    /// The store enforces uniqueness of `short_token` itself: when two callers
    /// race on the same token at most one insert succeeds and the other gets
    /// `Err(StorageError::Conflict)`.
    async fn insert(&self, link: NewLink) -> Result<LinkRecord>;

    /// Fetches a record only if it belongs to `owner`.
    async fn find_owned(&self, id: LinkId, owner: UserId) -> Result<Option<LinkRecord>>;

    /// Lists `owner`'s records newest first, filtered by `query.search`.
    async fn list_owned(&self, owner: UserId, query: &LinkQuery) -> Result<Page<LinkRecord>>;

    /// Lists every record newest first.
    async fn list_all(&self) -> Result<Vec<LinkRecord>>;

    /// Applies `patch` if the record belongs to `owner`.
    /// Returns `Err(StorageError::NotFound)` otherwise.
    async fn update_owned(&self, id: LinkId, owner: UserId, patch: LinkPatch)
        -> Result<LinkRecord>;

    /// Deletes the record if it belongs to `owner`.
    /// Returns `true` if a record was removed.
    async fn delete_owned(&self, id: LinkId, owner: UserId) -> Result<bool>;

    /// Atomically adds one click to an active record and stamps
    /// `last_accessed_at` with the current time, returning the updated record.
    ///
    /// Concurrent calls on the same token never lose an increment.
    /// Returns `Err(StorageError::NotFound)` for unknown or inactive tokens.
    async fn increment_click_and_touch(&self, token: &ShortToken) -> Result<LinkRecord>;
}

#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Inserts a user. Returns `Err(StorageError::Conflict)` if the email is taken.
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord>;

    /// Looks a user up by (lowercased) email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    async fn find_user(&self, id: UserId) -> Result<Option<UserRecord>>;

    /// Lists every user newest first.
    async fn list_users(&self) -> Result<Vec<UserRecord>>;
}
