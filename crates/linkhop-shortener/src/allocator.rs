use linkhop_core::repository::{LinkRepository, ReadRepository};
use linkhop_core::{LinkRecord, NewLink, ShortToken, ShortenerError, StorageError};
use linkhop_generator::Generator;
use std::sync::Arc;
use tracing::{debug, warn};

type Result<T> = std::result::Result<T, ShortenerError>;

pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Hands out short tokens that are not yet present in the repository.
///
/// The existence check does not reserve anything: the insert is the commit
/// point and the repository's own uniqueness constraint is what keeps two
/// racing callers from ending up with the same token. A candidate that loses
/// that race costs one attempt, same as a pre-check collision.
///
/// Candidates that already collided are not remembered, so a generator may
/// repeat one within a single allocation.
#[derive(Debug)]
pub struct TokenAllocator<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
    max_attempts: usize,
}

impl<R, G> Clone for TokenAllocator<R, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            generator: Arc::clone(&self.generator),
            max_attempts: self.max_attempts,
        }
    }
}

impl<R: ReadRepository, G: Generator> TokenAllocator<R, G> {
    pub fn new(repository: Arc<R>, generator: Arc<G>) -> Self {
        Self {
            repository,
            generator,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Overrides the retry bound. Values below one are raised to one.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Returns a token that no record currently uses.
    ///
    /// Fails with [`ShortenerError::AllocationExhausted`] once `max_attempts`
    /// candidates have all collided.
    pub async fn allocate(&self) -> Result<ShortToken> {
        let mut remaining = self.max_attempts;
        self.next_free(&mut remaining).await
    }

    async fn next_free(&self, remaining: &mut usize) -> Result<ShortToken> {
        while *remaining > 0 {
            *remaining -= 1;
            let candidate = self.generator.generate();

            if !self.repository.exists_by_token(&candidate).await? {
                return Ok(candidate);
            }
            debug!(token = %candidate, remaining = *remaining, "short token collision");
        }

        warn!(attempts = self.max_attempts, "short token allocation exhausted");
        Err(ShortenerError::AllocationExhausted {
            attempts: self.max_attempts,
        })
    }
}

impl<R: LinkRepository, G: Generator> TokenAllocator<R, G> {
    /// Allocates a token and inserts the record built from it.
    ///
    /// A [`StorageError::Conflict`] from the insert means another caller
    /// committed the same candidate first; a fresh one is allocated within
    /// the same attempt budget.
    pub async fn insert_with_fresh_token<F>(&self, mut build: F) -> Result<LinkRecord>
    where
        F: FnMut(ShortToken) -> NewLink + Send,
    {
        let mut remaining = self.max_attempts;

        loop {
            let token = self.next_free(&mut remaining).await?;

            match self.repository.insert(build(token)).await {
                Ok(record) => return Ok(record),
                Err(StorageError::Conflict(token)) => {
                    debug!(token = %token, "lost insert race for short token, retrying");
                }
                Err(other) => return Err(other.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use linkhop_core::repository::Result as StorageResult;
    use linkhop_core::{LinkId, LinkPatch, LinkQuery, Page, UserId};
    use linkhop_generator::{RandomGenerator, SeqGenerator};
    use linkhop_storage::InMemoryRepository;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Pretends every candidate is taken.
    #[derive(Default)]
    struct SaturatedRepository {
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl ReadRepository for SaturatedRepository {
        async fn find_by_token(&self, _token: &ShortToken) -> StorageResult<Option<LinkRecord>> {
            Ok(None)
        }

        async fn exists_by_token(&self, _token: &ShortToken) -> StorageResult<bool> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }
    }

    /// Answers every existence check with "free", so only the insert
    /// constraint catches duplicates, as when a concurrent caller wins the race.
    #[derive(Clone, Default)]
    struct StalePrecheck(InMemoryRepository);

    #[async_trait]
    impl ReadRepository for StalePrecheck {
        async fn find_by_token(&self, token: &ShortToken) -> StorageResult<Option<LinkRecord>> {
            self.0.find_by_token(token).await
        }

        async fn exists_by_token(&self, _token: &ShortToken) -> StorageResult<bool> {
            Ok(false)
        }
    }

    #[async_trait]
    impl LinkRepository for StalePrecheck {
        async fn insert(&self, link: NewLink) -> StorageResult<LinkRecord> {
            self.0.insert(link).await
        }

        async fn find_owned(&self, id: LinkId, owner: UserId) -> StorageResult<Option<LinkRecord>> {
            self.0.find_owned(id, owner).await
        }

        async fn list_owned(
            &self,
            owner: UserId,
            query: &LinkQuery,
        ) -> StorageResult<Page<LinkRecord>> {
            self.0.list_owned(owner, query).await
        }

        async fn list_all(&self) -> StorageResult<Vec<LinkRecord>> {
            self.0.list_all().await
        }

        async fn update_owned(
            &self,
            id: LinkId,
            owner: UserId,
            patch: LinkPatch,
        ) -> StorageResult<LinkRecord> {
            self.0.update_owned(id, owner, patch).await
        }

        async fn delete_owned(&self, id: LinkId, owner: UserId) -> StorageResult<bool> {
            self.0.delete_owned(id, owner).await
        }

        async fn increment_click_and_touch(&self, token: &ShortToken) -> StorageResult<LinkRecord> {
            self.0.increment_click_and_touch(token).await
        }
    }

    fn link_for(owner: UserId) -> impl FnMut(ShortToken) -> NewLink + Send {
        move |short_token| NewLink {
            short_token,
            original_url: "https://example.com".to_string(),
            title: String::new(),
            tags: vec![],
            owner,
        }
    }

    #[tokio::test]
    async fn allocates_unused_token() {
        let allocator = TokenAllocator::new(
            Arc::new(InMemoryRepository::new()),
            Arc::new(RandomGenerator::new()),
        );

        let token = allocator.allocate().await.unwrap();
        assert_eq!(token.as_str().len(), 8);
    }

    #[tokio::test]
    async fn skips_tokens_already_in_use() {
        let repo = Arc::new(InMemoryRepository::new());
        let owner = UserId::new();
        repo.insert(link_for(owner)(ShortToken::new_unchecked("lh000000")))
            .await
            .unwrap();

        let allocator = TokenAllocator::new(repo, Arc::new(SeqGenerator::with_prefix("lh")));

        assert_eq!(allocator.allocate().await.unwrap().as_str(), "lh000001");
    }

    #[tokio::test]
    async fn exhausts_after_bounded_attempts() {
        let repo = Arc::new(SaturatedRepository::default());
        let allocator = TokenAllocator::new(Arc::clone(&repo), Arc::new(RandomGenerator::new()));

        let err = allocator.allocate().await.unwrap_err();

        assert!(matches!(
            err,
            ShortenerError::AllocationExhausted { attempts: 10 }
        ));
        assert_eq!(repo.lookups.load(Ordering::SeqCst), DEFAULT_MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn exhausts_when_every_candidate_is_taken() {
        let repo = Arc::new(InMemoryRepository::new());
        let owner = UserId::new();
        for i in 0..3 {
            repo.insert(link_for(owner)(ShortToken::new_unchecked(format!("lh{i:06}"))))
                .await
                .unwrap();
        }

        let allocator = TokenAllocator::new(repo, Arc::new(SeqGenerator::with_prefix("lh")))
            .with_max_attempts(3);

        let err = allocator.allocate().await.unwrap_err();
        assert!(matches!(err, ShortenerError::AllocationExhausted { attempts: 3 }));
    }

    #[tokio::test]
    async fn retries_after_losing_insert_race() {
        let inner = InMemoryRepository::new();
        let owner = UserId::new();
        inner
            .insert(link_for(owner)(ShortToken::new_unchecked("lh000000")))
            .await
            .unwrap();

        let allocator = TokenAllocator::new(
            Arc::new(StalePrecheck(inner.clone())),
            Arc::new(SeqGenerator::with_prefix("lh")),
        );

        let record = allocator
            .insert_with_fresh_token(link_for(owner))
            .await
            .unwrap();

        assert_eq!(record.short_token.as_str(), "lh000001");
        assert_eq!(inner.len(), 2);
    }

    #[tokio::test]
    async fn insert_races_share_the_attempt_budget() {
        let inner = InMemoryRepository::new();
        let owner = UserId::new();
        for i in 0..2 {
            inner
                .insert(link_for(owner)(ShortToken::new_unchecked(format!("lh{i:06}"))))
                .await
                .unwrap();
        }

        let allocator = TokenAllocator::new(
            Arc::new(StalePrecheck(inner.clone())),
            Arc::new(SeqGenerator::with_prefix("lh")),
        )
        .with_max_attempts(2);

        let err = allocator
            .insert_with_fresh_token(link_for(owner))
            .await
            .unwrap_err();

        assert!(matches!(err, ShortenerError::AllocationExhausted { attempts: 2 }));
        assert_eq!(inner.len(), 2);
    }
}
