use crate::Result;
use async_trait::async_trait;
use linkhop_core::{LinkRecord, ShortToken};

#[async_trait]
pub trait Redirector: Send + Sync + 'static {
    /// Resolves a short token to its active link record without counting a click.
    /// Returns `None` if the token does not exist or the link is inactive.
    async fn resolve(&self, token: &ShortToken) -> Result<Option<LinkRecord>>;

    /// Records one click on the link and returns the URL to redirect to.
    async fn visit(&self, token: &ShortToken) -> Result<String>;
}
