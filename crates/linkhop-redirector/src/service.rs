use std::sync::Arc;

use crate::redirector::Redirector;
use crate::{RedirectorError, Result};
use async_trait::async_trait;
use linkhop_core::{LinkRecord, LinkRepository, ShortToken};
use tracing::{debug, trace};

/// Service for handling redirects.
///
/// Reads go through [`linkhop_core::ReadRepository`]; the click itself is a
/// single atomic [`LinkRepository::increment_click_and_touch`] so concurrent
/// visits never lose a count.
#[derive(Debug)]
pub struct RedirectorService<R> {
    repository: Arc<R>,
}

impl<R> Clone for RedirectorService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: LinkRepository> RedirectorService<R> {
    /// Creates a new RedirectorService with the given repository.
    pub fn new(repository: R) -> Self {
        Self::from_shared(Arc::new(repository))
    }

    /// Creates a service on a repository already shared with other services.
    pub fn from_shared(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: LinkRepository> Redirector for RedirectorService<R> {
    async fn resolve(&self, token: &ShortToken) -> Result<Option<LinkRecord>> {
        trace!(token = %token, "resolving short token");

        match self.repository.find_by_token(token).await? {
            Some(record) if record.is_active => {
                debug!(token = %token, url = %record.original_url, "resolved short token");
                Ok(Some(record))
            }
            Some(_) => {
                debug!(token = %token, "link is inactive");
                Ok(None)
            }
            None => {
                trace!(token = %token, "short token not found");
                Ok(None)
            }
        }
    }

    async fn visit(&self, token: &ShortToken) -> Result<String> {
        if self.resolve(token).await?.is_none() {
            return Err(RedirectorError::NotFound);
        }

        let record = self.repository.increment_click_and_touch(token).await?;
        debug!(
            token = %token,
            clicks = record.clicks,
            url = %record.original_url,
            "counted click"
        );
        Ok(record.original_url)
    }
}
