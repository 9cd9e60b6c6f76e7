use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use jiff::Timestamp;
use linkhop_core::repository::{LinkRepository, ReadRepository, Result, UserRepository};
use linkhop_core::{
    LinkId, LinkPatch, LinkQuery, LinkRecord, NewLink, NewUser, Page, ShortToken, StorageError,
    UserId, UserRecord,
};
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Default)]
struct Inner {
    /// Live records keyed by short token.
    links: DashMap<String, LinkRecord>,
    /// Secondary index from storage id to short token.
    ids: DashMap<LinkId, String>,
    /// Tokens of deleted records. They are never handed out again.
    retired: DashSet<String>,
    users: DashMap<UserId, UserRecord>,
    /// Lowercased email to user id.
    emails: DashMap<String, UserId>,
}

/// In-memory implementation of the repository traits using DashMap.
///
/// DashMap shards its locks, so operations on different tokens proceed in
/// parallel while operations on the same token are serialized by the shard
/// write guard. Clones share the same underlying storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    inner: Arc<Inner>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live link records.
    pub fn len(&self) -> usize {
        self.inner.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.links.is_empty()
    }

    fn token_of(&self, id: LinkId) -> Option<String> {
        self.inner.ids.get(&id).map(|token| token.value().clone())
    }
}

fn newest_first(records: &mut [LinkRecord]) {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn find_by_token(&self, token: &ShortToken) -> Result<Option<LinkRecord>> {
        Ok(self
            .inner
            .links
            .get(token.as_str())
            .map(|entry| entry.value().clone()))
    }

    async fn exists_by_token(&self, token: &ShortToken) -> Result<bool> {
        let key = token.as_str();
        Ok(self.inner.links.contains_key(key) || self.inner.retired.contains(key))
    }
}

#[async_trait]
impl LinkRepository for InMemoryRepository {
    async fn insert(&self, link: NewLink) -> Result<LinkRecord> {
        let key = link.short_token.as_str().to_owned();

        // The entry guard holds the shard lock, so check-and-insert is atomic.
        match self.inner.links.entry(key.clone()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(key)),
            Entry::Vacant(_) if self.inner.retired.contains(&key) => {
                Err(StorageError::Conflict(key))
            }
            Entry::Vacant(vacant) => {
                let now = Timestamp::now();
                let record = LinkRecord {
                    id: LinkId::new(),
                    short_token: link.short_token,
                    original_url: link.original_url,
                    title: link.title,
                    tags: link.tags,
                    owner: link.owner,
                    clicks: 0,
                    last_accessed_at: None,
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                };
                self.inner.ids.insert(record.id, key);
                vacant.insert(record.clone());
                trace!(token = %record.short_token, id = %record.id, "inserted link");
                Ok(record)
            }
        }
    }

    async fn find_owned(&self, id: LinkId, owner: UserId) -> Result<Option<LinkRecord>> {
        let Some(token) = self.token_of(id) else {
            return Ok(None);
        };

        Ok(self
            .inner
            .links
            .get(&token)
            .filter(|entry| entry.owner == owner)
            .map(|entry| entry.value().clone()))
    }

    async fn list_owned(&self, owner: UserId, query: &LinkQuery) -> Result<Page<LinkRecord>> {
        let needle = query.search.as_deref().unwrap_or_default();

        let mut matching: Vec<LinkRecord> = self
            .inner
            .links
            .iter()
            .filter(|entry| entry.owner == owner && entry.matches_search(needle))
            .map(|entry| entry.value().clone())
            .collect();
        newest_first(&mut matching);

        let total_items = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(query.limit as usize)
            .collect();

        Ok(Page {
            items,
            page: query.page,
            limit: query.limit,
            total_items,
        })
    }

    async fn list_all(&self) -> Result<Vec<LinkRecord>> {
        let mut all: Vec<LinkRecord> = self
            .inner
            .links
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        newest_first(&mut all);
        Ok(all)
    }

    async fn update_owned(
        &self,
        id: LinkId,
        owner: UserId,
        patch: LinkPatch,
    ) -> Result<LinkRecord> {
        let token = self.token_of(id).ok_or(StorageError::NotFound)?;

        let mut entry = self
            .inner
            .links
            .get_mut(&token)
            .filter(|entry| entry.owner == owner)
            .ok_or(StorageError::NotFound)?;

        patch.apply(entry.value_mut(), Timestamp::now());
        Ok(entry.value().clone())
    }

    async fn delete_owned(&self, id: LinkId, owner: UserId) -> Result<bool> {
        let Some(token) = self.token_of(id) else {
            return Ok(false);
        };

        let owned = self
            .inner
            .links
            .get(&token)
            .is_some_and(|entry| entry.owner == owner);
        if !owned {
            return Ok(false);
        }

        // Retire first so a concurrent insert never sees the token as free.
        self.inner.retired.insert(token.clone());
        let removed = self
            .inner
            .links
            .remove_if(&token, |_, record| record.owner == owner)
            .is_some();
        if removed {
            self.inner.ids.remove(&id);
        }
        Ok(removed)
    }

    async fn increment_click_and_touch(&self, token: &ShortToken) -> Result<LinkRecord> {
        let mut entry = self
            .inner
            .links
            .get_mut(token.as_str())
            .filter(|entry| entry.is_active)
            .ok_or(StorageError::NotFound)?;

        let record = entry.value_mut();
        record.clicks += 1;
        // Taken under the write guard, so it never goes backwards.
        record.last_accessed_at = Some(Timestamp::now());
        Ok(record.clone())
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord> {
        match self.inner.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(user.email)),
            Entry::Vacant(vacant) => {
                let record = UserRecord {
                    id: UserId::new(),
                    email: user.email,
                    password_hash: user.password_hash,
                    role: user.role,
                    created_at: Timestamp::now(),
                };
                self.inner.users.insert(record.id, record.clone());
                vacant.insert(record.id);
                Ok(record)
            }
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let Some(id) = self.inner.emails.get(email).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        self.find_user(id).await
    }

    async fn find_user(&self, id: UserId) -> Result<Option<UserRecord>> {
        Ok(self.inner.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let mut users: Vec<UserRecord> = self
            .inner
            .users
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }
}
