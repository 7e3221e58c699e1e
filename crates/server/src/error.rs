use axum::http::StatusCode;
use thiserror::Error;

/// Failures reported by the session store.
///
/// None of these are fatal; the HTTP layer turns them into OAuth2 error bodies.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("authorization code is unknown or already redeemed")]
    InvalidGrant,
    #[error("authorization code was issued to a different client")]
    InvalidClient,
    #[error("access token is unknown")]
    InvalidToken,
}

impl SessionError {
    /// OAuth2 `error` value for the response body.
    pub fn oauth_code(&self) -> &'static str {
        match self {
            SessionError::InvalidGrant => "invalid_grant",
            SessionError::InvalidClient => "invalid_client",
            SessionError::InvalidToken => "invalid_token",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            SessionError::InvalidGrant | SessionError::InvalidClient => StatusCode::BAD_REQUEST,
            SessionError::InvalidToken => StatusCode::UNAUTHORIZED,
        }
    }
}
