//! Placeholder OpenID identity tokens.
//!
//! These look like JWTs (three base64url segments) so client libraries can split
//! and decode them, but the signature segment is a fixed string. Nothing about
//! them can be verified, and consumers must not treat them as proof of anything.
//!
//! The header keeps the `RS256` algorithm that ESIA clients expect to parse, even
//! though nothing is signed. The discovery document advertises `none` for
//! `id_token_signing_alg_values_supported`, which is the accurate value; a client
//! that checks the header against discovery has to skip verification here.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use time::OffsetDateTime;

const HEADER: &str = r#"{"alg":"RS256","typ":"JWT"}"#;
const SIGNATURE: &[u8] = b"mock_signature";

/// Payload of a placeholder identity token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdTokenClaims {
    pub sub: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn encode(subject: &str, audience: &str, issued_at: OffsetDateTime, expires_in: u64) -> String {
    let iat = issued_at.unix_timestamp();
    let exp = iat.saturating_add(i64::try_from(expires_in).unwrap_or(i64::MAX));
    let payload = serde_json::json!({
        "sub": subject,
        "aud": audience,
        "iat": iat,
        "exp": exp,
    })
    .to_string();

    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(HEADER),
        URL_SAFE_NO_PAD.encode(payload),
        URL_SAFE_NO_PAD.encode(SIGNATURE)
    )
}

/// Reads the payload back. Does not (and cannot) check the signature.
pub fn decode_claims(token: &str) -> Option<IdTokenClaims> {
    let mut parts = token.split('.');
    let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}
