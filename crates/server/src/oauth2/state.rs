//! Shared state for the ESIA endpoints.

use crate::config::AppConfig;
use crate::identity::IdentityCache;
use crate::oauth2::SessionStore;

/// Everything the handlers need. Cloning shares the underlying stores.
#[derive(Clone)]
pub struct OAuth2State {
    pub sessions: SessionStore,
    pub identities: IdentityCache,
    /// Base URL for the discovery document, without a trailing slash.
    pub issuer_url: String,
}

impl OAuth2State {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            sessions: SessionStore::new(config.access_token_lifetime),
            identities: IdentityCache::new(),
            issuer_url: config.issuer().to_string(),
        }
    }
}
