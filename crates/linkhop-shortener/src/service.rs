use crate::allocator::TokenAllocator;
use crate::validate::validate_url;
use async_trait::async_trait;
use linkhop_core::{
    CreateLink, LinkId, LinkPatch, LinkQuery, LinkRecord, LinkRepository, LinkStats, NewLink,
    Page, Shortener, ShortenerError, UserId,
};
use linkhop_generator::Generator;
use std::sync::Arc;
use tracing::{debug, info};

type Result<T> = std::result::Result<T, ShortenerError>;

/// A concrete implementation of the [`Shortener`] trait.
///
/// This service wraps a [`LinkRepository`] and a [`Generator`] to handle:
/// - URL validation, before any token is allocated
/// - bounded short token allocation
/// - owner scoping of every read and write
#[derive(Debug)]
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    allocator: TokenAllocator<R, G>,
}

impl<R, G> Clone for ShortenerService<R, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            allocator: self.allocator.clone(),
        }
    }
}

impl<R: LinkRepository, G: Generator> ShortenerService<R, G> {
    pub fn new(repository: R, generator: G) -> Self {
        let repository = Arc::new(repository);
        let allocator = TokenAllocator::new(Arc::clone(&repository), Arc::new(generator));
        Self {
            repository,
            allocator,
        }
    }

    /// Overrides how many candidates a single create may try.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.allocator = self.allocator.with_max_attempts(max_attempts);
        self
    }

}

#[async_trait]
impl<R: LinkRepository, G: Generator> Shortener for ShortenerService<R, G> {
    async fn create(&self, owner: UserId, params: CreateLink) -> Result<LinkRecord> {
        let CreateLink {
            original_url,
            title,
            tags,
        } = params;
        let original_url = validate_url(&original_url)?;
        let title = title.unwrap_or_default();
        let tags = tags.unwrap_or_default();

        let record = self
            .allocator
            .insert_with_fresh_token(|short_token| NewLink {
                short_token,
                original_url: original_url.clone(),
                title: title.clone(),
                tags: tags.clone(),
                owner,
            })
            .await?;

        info!(
            id = %record.id,
            token = %record.short_token,
            owner = %owner,
            "created short link"
        );
        Ok(record)
    }

    async fn list(&self, owner: UserId, query: LinkQuery) -> Result<Page<LinkRecord>> {
        let page = self.repository.list_owned(owner, &query).await?;
        debug!(
            owner = %owner,
            page = page.page,
            returned = page.items.len(),
            total = page.total_items,
            "listed links"
        );
        Ok(page)
    }

    async fn get(&self, owner: UserId, id: LinkId) -> Result<LinkRecord> {
        self.repository
            .find_owned(id, owner)
            .await?
            .ok_or(ShortenerError::NotFound)
    }

    async fn stats(&self, owner: UserId, id: LinkId) -> Result<LinkStats> {
        self.get(owner, id).await.map(LinkStats::from)
    }

    async fn update(
        &self,
        owner: UserId,
        id: LinkId,
        mut patch: LinkPatch,
    ) -> Result<LinkRecord> {
        if let Some(url) = patch.original_url.take() {
            patch.original_url = Some(validate_url(&url)?);
        }

        let record = self.repository.update_owned(id, owner, patch).await?;
        debug!(id = %id, owner = %owner, "updated link");
        Ok(record)
    }

    async fn delete(&self, owner: UserId, id: LinkId) -> Result<()> {
        if !self.repository.delete_owned(id, owner).await? {
            return Err(ShortenerError::NotFound);
        }
        info!(id = %id, owner = %owner, "deleted link");
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<LinkRecord>> {
        Ok(self.repository.list_all().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkhop_core::ReadRepository;
    use linkhop_generator::SeqGenerator;
    use linkhop_storage::InMemoryRepository;

    fn test_service() -> (
        ShortenerService<InMemoryRepository, SeqGenerator>,
        InMemoryRepository,
    ) {
        let repo = InMemoryRepository::new();
        let service = ShortenerService::new(repo.clone(), SeqGenerator::with_prefix("lh"));
        (service, repo)
    }

    fn params(url: &str) -> CreateLink {
        CreateLink {
            original_url: url.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_token_and_defaults() {
        let (service, _) = test_service();
        let owner = UserId::new();

        let record = service
            .create(owner, params("https://example.com"))
            .await
            .unwrap();

        assert_eq!(record.short_token.as_str(), "lh000000");
        assert_eq!(record.owner, owner);
        assert_eq!(record.title, "");
        assert!(record.tags.is_empty());
        assert_eq!(record.clicks, 0);
        assert!(record.is_active);
    }

    #[tokio::test]
    async fn create_keeps_title_and_tags() {
        let (service, _) = test_service();

        let record = service
            .create(
                UserId::new(),
                CreateLink {
                    original_url: "https://example.com/docs".into(),
                    title: Some("Docs".into()),
                    tags: Some(vec!["work".into(), "ref".into()]),
                },
            )
            .await
            .unwrap();

        assert_eq!(record.title, "Docs");
        assert_eq!(record.tags, vec!["work".to_string(), "ref".to_string()]);
    }

    #[tokio::test]
    async fn invalid_url_never_consumes_a_token() {
        let (service, repo) = test_service();
        let owner = UserId::new();

        let err = service.create(owner, params("not-a-url")).await.unwrap_err();
        assert!(matches!(err, ShortenerError::InvalidUrl(_)));
        assert!(repo.is_empty());

        // The sequence was not advanced by the failed request.
        let record = service
            .create(owner, params("https://example.com"))
            .await
            .unwrap();
        assert_eq!(record.short_token.as_str(), "lh000000");
    }

    #[tokio::test]
    async fn tokens_are_pairwise_distinct() {
        let (service, _) = test_service();
        let owner = UserId::new();

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .create(owner, params(&format!("https://example.com/{i}")))
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut tokens = std::collections::HashSet::new();
        for handle in handles {
            assert!(tokens.insert(handle.await.unwrap().short_token));
        }
        assert_eq!(tokens.len(), 50);
    }

    #[tokio::test]
    async fn get_and_stats_are_owner_scoped() {
        let (service, _) = test_service();
        let alice = UserId::new();
        let bob = UserId::new();

        let record = service
            .create(alice, params("https://example.com"))
            .await
            .unwrap();

        assert_eq!(service.get(alice, record.id).await.unwrap(), record);
        let stats = service.stats(alice, record.id).await.unwrap();
        assert_eq!(stats.total_clicks, 0);
        assert_eq!(stats.short_token, record.short_token);

        assert!(matches!(
            service.get(bob, record.id).await.unwrap_err(),
            ShortenerError::NotFound
        ));
        assert!(matches!(
            service.stats(bob, record.id).await.unwrap_err(),
            ShortenerError::NotFound
        ));
    }

    #[tokio::test]
    async fn update_by_other_owner_is_not_found_and_changes_nothing() {
        let (service, repo) = test_service();
        let alice = UserId::new();
        let bob = UserId::new();

        let record = service
            .create(alice, params("https://alice.example"))
            .await
            .unwrap();

        let err = service
            .update(
                bob,
                record.id,
                LinkPatch {
                    original_url: Some("https://bob.example".into()),
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound));

        let stored = repo
            .find_by_token(&record.short_token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, record);
    }

    #[tokio::test]
    async fn update_validates_new_url() {
        let (service, _) = test_service();
        let owner = UserId::new();
        let record = service
            .create(owner, params("https://example.com"))
            .await
            .unwrap();

        let err = service
            .update(
                owner,
                record.id,
                LinkPatch {
                    original_url: Some("nope".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ShortenerError::InvalidUrl(_)));

        let updated = service
            .update(
                owner,
                record.id,
                LinkPatch {
                    original_url: Some("https://example.org".into()),
                    title: Some("Moved".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.original_url, "https://example.org/");
        assert_eq!(updated.title, "Moved");
        assert_eq!(updated.short_token, record.short_token);
    }

    #[tokio::test]
    async fn create_and_update_store_the_normalized_url() {
        let (service, repo) = test_service();
        let owner = UserId::new();

        let record = service
            .create(owner, params("https://example.com/a\nb"))
            .await
            .unwrap();
        assert_eq!(record.original_url, "https://example.com/ab");
        let stored = repo
            .find_by_token(&record.short_token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.original_url, "https://example.com/ab");

        let updated = service
            .update(
                owner,
                record.id,
                LinkPatch {
                    original_url: Some("https://example.com/caf\u{e9}".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.original_url, "https://example.com/caf%C3%A9");
    }

    #[tokio::test]
    async fn delete_existing_and_missing() {
        let (service, _) = test_service();
        let owner = UserId::new();
        let record = service
            .create(owner, params("https://example.com"))
            .await
            .unwrap();

        assert!(matches!(
            service.delete(UserId::new(), record.id).await.unwrap_err(),
            ShortenerError::NotFound
        ));
        service.delete(owner, record.id).await.unwrap();
        assert!(matches!(
            service.delete(owner, record.id).await.unwrap_err(),
            ShortenerError::NotFound
        ));
    }

    #[tokio::test]
    async fn list_searches_title_or_url() {
        let (service, _) = test_service();
        let owner = UserId::new();

        for (url, title) in [
            ("https://foo.example", None),
            ("https://example.com/a", Some("The FOO page")),
            ("https://example.com/b", Some("Unrelated")),
        ] {
            service
                .create(
                    owner,
                    CreateLink {
                        original_url: url.into(),
                        title: title.map(str::to_string),
                        tags: None,
                    },
                )
                .await
                .unwrap();
        }
        service
            .create(UserId::new(), params("https://foo.other"))
            .await
            .unwrap();

        let page = service
            .list(owner, LinkQuery::new(None, Some(1), Some("foo")))
            .await
            .unwrap();

        assert_eq!(page.total_items, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_pages(), 2);

        assert_eq!(service.list_all().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn create_surfaces_allocation_exhaustion() {
        let repo = InMemoryRepository::new();
        let owner = UserId::new();
        let service = ShortenerService::new(repo.clone(), SeqGenerator::with_prefix("lh"))
            .with_max_attempts(2);
        service.create(owner, params("https://a.example")).await.unwrap();
        service.create(owner, params("https://b.example")).await.unwrap();

        // A second service replays the same sequence against the same store.
        let replay = ShortenerService::new(repo.clone(), SeqGenerator::with_prefix("lh"))
            .with_max_attempts(2);
        let err = replay
            .create(owner, params("https://c.example"))
            .await
            .unwrap_err();

        assert!(matches!(err, ShortenerError::AllocationExhausted { attempts: 2 }));
        assert_eq!(repo.len(), 2);
    }
}
