use std::sync::Arc;

use linkhop_auth::Authenticator;
use linkhop_core::{Shortener, ShortToken};
use linkhop_redirector::Redirector;

#[derive(Clone)]
pub struct AppState {
    shortener: Arc<dyn Shortener>,
    redirector: Arc<dyn Redirector>,
    auth: Arc<dyn Authenticator>,
    base_url: String,
}

impl AppState {
    pub fn new(
        shortener: Arc<dyn Shortener>,
        redirector: Arc<dyn Redirector>,
        auth: Arc<dyn Authenticator>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            shortener,
            redirector,
            auth,
            base_url: public_base_url.into(),
        }
    }

    pub fn shortener(&self) -> &dyn Shortener {
        self.shortener.as_ref()
    }

    pub fn redirector(&self) -> &dyn Redirector {
        self.redirector.as_ref()
    }

    pub fn auth(&self) -> &dyn Authenticator {
        self.auth.as_ref()
    }

    /// `<public base url>/<token>`.
    pub fn short_url(&self, token: &ShortToken) -> String {
        token.to_url(&self.base_url)
    }
}
