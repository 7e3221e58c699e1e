//! Mock ESIA OAuth2 provider.
//!
//! Implements the parts of the ESIA authorization-code flow that client
//! applications touch, backed entirely by in-memory state.
//!
//! ## Endpoints
//!
//! - `GET /aas/oauth2/ac`, `GET /aas/oauth2/authorize` - Phone number form
//! - `POST /aas/oauth2/authorize` - Form submission, redirects with a code
//! - `POST /aas/oauth2/te` - Token exchange
//! - `GET /userinfo` - Identity of the token holder
//! - `GET /rs/prns/{oid}` - Person lookup by oid
//! - `GET /.well-known/openid-configuration` - Discovery document

pub mod endpoints;
pub mod id_token;
mod state;
pub mod store;

pub use endpoints::router;
pub use state::OAuth2State;
pub use store::{AuthorizationCode, IssuedToken, SessionStore};

/// OpenAPI tag for OAuth2 endpoints
pub const OAUTH2_TAG: &str = "OAuth2";
