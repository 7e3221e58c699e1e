//! In-memory authorization code and token bookkeeping.

use crate::error::SessionError;
use crate::oauth2::id_token;
use dashmap::DashMap;
use std::sync::Arc;
use time::OffsetDateTime;

/// A pending authorization code, waiting to be exchanged for tokens.
#[derive(Clone, Debug)]
pub struct AuthorizationCode {
    pub code: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub state: String,
    /// Phone number entered on the authorization form.
    pub subject_id: String,
    pub created_at: OffsetDateTime,
}

/// Tokens handed out by a successful code exchange.
#[derive(Clone, Debug)]
pub struct IssuedToken {
    pub access_token: String,
    pub refresh_token: String,
    /// Unsigned placeholder, see [`id_token`].
    pub id_token: String,
    /// Seconds. Reported only, never enforced.
    pub expires_in: u64,
    pub token_type: String,
    pub subject_id: String,
    pub client_id: String,
    pub issued_at: OffsetDateTime,
}

/// Codes and tokens for the lifetime of the process.
///
/// Entries are never evicted. Cloning shares the underlying maps.
#[derive(Clone)]
pub struct SessionStore {
    codes: Arc<DashMap<String, AuthorizationCode>>,
    tokens: Arc<DashMap<String, IssuedToken>>,
    access_token_lifetime: u64,
}

impl SessionStore {
    pub fn new(access_token_lifetime: u64) -> Self {
        Self {
            codes: Arc::new(DashMap::new()),
            tokens: Arc::new(DashMap::new()),
            access_token_lifetime,
        }
    }

    /// Generate a secure random token (256 bits, URL-safe base64).
    pub fn generate_token() -> String {
        use base64::Engine;
        let mut bytes = [0u8; 32];
        getrandom::fill(&mut bytes).expect("Failed to generate random bytes");
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Records a new authorization code bound to `subject_id` and returns it.
    pub fn issue_code(
        &self,
        client_id: &str,
        redirect_uri: &str,
        state: &str,
        subject_id: &str,
    ) -> String {
        let code = Self::generate_token();
        self.codes.insert(
            code.clone(),
            AuthorizationCode {
                code: code.clone(),
                client_id: client_id.to_string(),
                redirect_uri: redirect_uri.to_string(),
                state: state.to_string(),
                subject_id: subject_id.to_string(),
                created_at: OffsetDateTime::now_utc(),
            },
        );
        tracing::debug!(client_id, "authorization code issued");
        code
    }

    /// Exchanges `code` for a fresh token set. A code can be redeemed once.
    ///
    /// A code presented by the wrong client is left in place for the right one.
    pub fn redeem_code(&self, code: &str, client_id: &str) -> Result<IssuedToken, SessionError> {
        // remove_if holds the shard lock, so only one caller can take the code.
        let Some((_, auth)) = self
            .codes
            .remove_if(code, |_, auth| auth.client_id == client_id)
        else {
            return Err(if self.codes.contains_key(code) {
                SessionError::InvalidClient
            } else {
                SessionError::InvalidGrant
            });
        };

        let issued_at = OffsetDateTime::now_utc();
        let token = IssuedToken {
            access_token: Self::generate_token(),
            refresh_token: Self::generate_token(),
            id_token: id_token::encode(
                &auth.subject_id,
                &auth.client_id,
                issued_at,
                self.access_token_lifetime,
            ),
            expires_in: self.access_token_lifetime,
            token_type: "Bearer".to_string(),
            subject_id: auth.subject_id,
            client_id: auth.client_id,
            issued_at,
        };
        self.tokens
            .insert(token.access_token.clone(), token.clone());
        Ok(token)
    }

    pub fn lookup_token(&self, access_token: &str) -> Result<IssuedToken, SessionError> {
        self.tokens
            .get(access_token)
            .map(|t| t.value().clone())
            .ok_or(SessionError::InvalidToken)
    }

    /// Codes issued but not yet redeemed.
    pub fn pending_codes(&self) -> usize {
        self.codes.len()
    }

    pub fn issued_tokens(&self) -> usize {
        self.tokens.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_url_safe_and_unique() {
        let a = SessionStore::generate_token();
        let b = SessionStore::generate_token();
        assert_ne!(a, b);
        // 32 bytes without padding
        assert_eq!(a.len(), 43);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn full_exchange() {
        let store = SessionStore::default();
        let code = store.issue_code("client-a", "https://cb", "xyz", "79990000001");
        assert_eq!(store.pending_codes(), 1);

        let token = store.redeem_code(&code, "client-a").unwrap();
        assert!(!token.access_token.is_empty());
        assert!(!token.refresh_token.is_empty());
        assert!(!token.id_token.is_empty());
        assert_ne!(token.access_token, token.refresh_token);
        assert_eq!(token.expires_in, 3600);
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(store.pending_codes(), 0);
        assert_eq!(store.issued_tokens(), 1);

        let found = store.lookup_token(&token.access_token).unwrap();
        assert_eq!(found.subject_id, "79990000001");
        assert_eq!(found.client_id, "client-a");
    }

    #[test]
    fn code_is_single_use() {
        let store = SessionStore::default();
        let code = store.issue_code("client-a", "https://cb", "", "79990000001");
        assert!(store.redeem_code(&code, "client-a").is_ok());
        assert_eq!(
            store.redeem_code(&code, "client-a").unwrap_err(),
            SessionError::InvalidGrant
        );
    }

    #[test]
    fn wrong_client_keeps_code() {
        let store = SessionStore::default();
        let code = store.issue_code("client-a", "https://cb", "", "79990000001");
        assert_eq!(
            store.redeem_code(&code, "client-b").unwrap_err(),
            SessionError::InvalidClient
        );
        assert!(store.redeem_code(&code, "client-a").is_ok());
    }

    #[test]
    fn unknown_code_and_token() {
        let store = SessionStore::default();
        assert_eq!(
            store.redeem_code("nope", "client-a").unwrap_err(),
            SessionError::InvalidGrant
        );
        assert_eq!(
            store.lookup_token("nope").unwrap_err(),
            SessionError::InvalidToken
        );
    }

    #[test]
    fn refresh_token_is_not_a_bearer_credential() {
        let store = SessionStore::default();
        let code = store.issue_code("client-a", "https://cb", "", "79990000001");
        let token = store.redeem_code(&code, "client-a").unwrap();
        assert!(store.lookup_token(&token.refresh_token).is_err());
    }

    #[test]
    fn lifetime_is_configurable() {
        let store = SessionStore::new(600);
        let code = store.issue_code("client-a", "https://cb", "", "79990000001");
        let token = store.redeem_code(&code, "client-a").unwrap();
        assert_eq!(token.expires_in, 600);

        let claims = id_token::decode_claims(&token.id_token).unwrap();
        assert_eq!(claims.exp - claims.iat, 600);
    }

    #[test]
    fn tokens_are_bound_to_their_own_subject() {
        let store = SessionStore::default();
        let c1 = store.issue_code("client-a", "https://cb", "", "79990000001");
        let c2 = store.issue_code("client-a", "https://cb", "", "79990000002");
        let t2 = store.redeem_code(&c2, "client-a").unwrap();
        let t1 = store.redeem_code(&c1, "client-a").unwrap();
        assert_eq!(
            store.lookup_token(&t1.access_token).unwrap().subject_id,
            "79990000001"
        );
        assert_eq!(
            store.lookup_token(&t2.access_token).unwrap().subject_id,
            "79990000002"
        );
    }
}
