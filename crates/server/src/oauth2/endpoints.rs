//! OAuth2 HTTP endpoints.
//!
//! Paths mirror the real ESIA service so clients only need a different base URL:
//! - Authorization form (`/aas/oauth2/ac`, `/aas/oauth2/authorize`)
//! - Token exchange (`/aas/oauth2/te`)
//! - UserInfo and person lookup
//! - Discovery document

use crate::error::SessionError;
use crate::identity::IdentityRecord;
use crate::oauth2::{IssuedToken, OAUTH2_TAG, state::OAuth2State};
use askama::Template;
use axum::{
    Form, Json,
    extract::{Path, Query, State, rejection::FormRejection},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

/// Creates the OAuth2 router.
pub fn router(state: OAuth2State) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(authorize_ac))
        .routes(routes!(authorize, authorize_submit))
        .routes(routes!(token))
        .routes(routes!(userinfo))
        .routes(routes!(person))
        .routes(routes!(openid_configuration))
        .with_state(state)
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Authorization request parameters.
///
/// Everything is optional at the extractor level so that missing values produce an
/// OAuth2 error body instead of a plain-text rejection.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuthorizeQuery {
    /// Client identifier
    pub client_id: Option<String>,
    /// Where to send the user after the phone number is entered
    pub redirect_uri: Option<String>,
    /// Opaque value echoed back in the redirect
    pub state: Option<String>,
    /// Requested scopes, carried through but not enforced
    pub scope: Option<String>,
    pub response_type: Option<String>,
}

/// Authorization form submission.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AuthorizeForm {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub redirect_uri: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub response_type: String,
    /// Eleven digits, e.g. `79644223811`. Becomes the token's subject.
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRequest {
    #[serde(default)]
    pub grant_type: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub redirect_uri: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Unsigned placeholder with `sub`, `aud`, `iat` and `exp` claims.
    pub id_token: String,
    pub expires_in: u64,
    pub token_type: String,
}

impl From<IssuedToken> for TokenResponse {
    fn from(t: IssuedToken) -> Self {
        Self {
            access_token: t.access_token,
            refresh_token: t.refresh_token,
            id_token: t.id_token,
            expires_in: t.expires_in,
            token_type: t.token_type,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OpenIdConfiguration {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    pub response_types_supported: Vec<String>,
    pub grant_types_supported: Vec<String>,
    pub subject_types_supported: Vec<String>,
    pub scopes_supported: Vec<String>,
    pub token_endpoint_auth_methods_supported: Vec<String>,
    /// Always `none`: identity tokens carry a placeholder signature.
    pub id_token_signing_alg_values_supported: Vec<String>,
}

#[derive(Template)]
#[template(path = "authorize.html")]
struct AuthorizeTemplate {
    client_id: String,
    redirect_uri: String,
    state: String,
    scope: String,
    response_type: String,
}

// =============================================================================
// Endpoints
// =============================================================================

/// ESIA authorization endpoint (`ac` alias).
#[tracing::instrument(skip(params))]
#[utoipa::path(
    get,
    path = "/aas/oauth2/ac",
    tag = OAUTH2_TAG,
    operation_id = "ESIA Authorize (ac)",
    summary = "Show the phone number form",
    description = "Alias of `GET /aas/oauth2/authorize`, matching the path used by the real ESIA service.",
    params(AuthorizeQuery),
    responses(
        (status = 200, description = "Phone number form", content_type = "text/html"),
        (status = 400, description = "client_id or redirect_uri missing", body = ErrorResponse),
    )
)]
pub async fn authorize_ac(Query(params): Query<AuthorizeQuery>) -> Response {
    render_authorize_form(params)
}

/// Authorization endpoint.
#[tracing::instrument(skip(params))]
#[utoipa::path(
    get,
    path = "/aas/oauth2/authorize",
    tag = OAUTH2_TAG,
    operation_id = "ESIA Authorize",
    summary = "Show the phone number form",
    description = "Renders a form asking for a phone number. Any eleven digit number is accepted; it becomes \
                   the subject of the issued tokens and seeds the synthetic identity returned later.\n\n\
                   `client_id`, `redirect_uri`, `state`, `scope` and `response_type` are carried through the form.",
    params(AuthorizeQuery),
    responses(
        (status = 200, description = "Phone number form", content_type = "text/html"),
        (status = 400, description = "client_id or redirect_uri missing", body = ErrorResponse),
    )
)]
pub async fn authorize(Query(params): Query<AuthorizeQuery>) -> Response {
    render_authorize_form(params)
}

/// Handle the phone number form.
#[tracing::instrument(skip(state, form))]
#[utoipa::path(
    post,
    path = "/aas/oauth2/authorize",
    tag = OAUTH2_TAG,
    operation_id = "ESIA Authorize Submit",
    summary = "Issue an authorization code",
    description = "Issues a single-use authorization code bound to the submitted phone number and redirects \
                   to `redirect_uri` with `code` and, when provided, `state` appended to its query.",
    request_body(
        content = AuthorizeForm,
        content_type = "application/x-www-form-urlencoded",
        description = "Authorization form fields"
    ),
    responses(
        (status = 302, description = "Redirect back to the client with an authorization code"),
        (status = 400, description = "Missing fields, unreadable body or redirect_uri is not an absolute URL", body = ErrorResponse),
    )
)]
pub async fn authorize_submit(
    State(state): State<OAuth2State>,
    form: Result<Form<AuthorizeForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => return form_rejection(rejection),
    };
    tracing::info!(client_id = %form.client_id, phone = %form.phone, "Authorization form submitted");

    if form.client_id.is_empty() || form.redirect_uri.is_empty() || form.phone.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            Some("client_id, redirect_uri and phone are required"),
        );
    }

    let Ok(mut redirect_url) = url::Url::parse(&form.redirect_uri) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            Some("redirect_uri must be an absolute URL"),
        );
    };

    let code = state
        .sessions
        .issue_code(&form.client_id, &form.redirect_uri, &form.state, &form.phone);

    {
        let mut query = redirect_url.query_pairs_mut();
        query.append_pair("code", &code);
        if !form.state.is_empty() {
            query.append_pair("state", &form.state);
        }
    }

    tracing::info!(redirect_uri = %form.redirect_uri, "Redirecting with code");
    (
        StatusCode::FOUND,
        [(header::LOCATION, redirect_url.to_string())],
    )
        .into_response()
}

/// Token endpoint.
#[tracing::instrument(skip(state, params))]
#[utoipa::path(
    post,
    path = "/aas/oauth2/te",
    tag = OAUTH2_TAG,
    operation_id = "ESIA Token",
    summary = "Exchange an authorization code for tokens",
    description = "Only the `authorization_code` grant is supported. A code can be exchanged exactly once, and \
                   only by the client it was issued to.\n\n\
                   The returned `id_token` looks like a JWT but its signature is a fixed placeholder. \
                   It must not be verified or trusted.",
    request_body(
        content = TokenRequest,
        content_type = "application/x-www-form-urlencoded",
        description = "Token request parameters"
    ),
    responses(
        (status = 200, description = "Tokens issued", body = TokenResponse),
        (status = 400, description = "invalid_request, unsupported_grant_type, invalid_grant or invalid_client", body = ErrorResponse),
    )
)]
pub async fn token(
    State(state): State<OAuth2State>,
    params: Result<Form<TokenRequest>, FormRejection>,
) -> Response {
    let params = match params {
        Ok(Form(params)) => params,
        Err(rejection) => return form_rejection(rejection),
    };
    tracing::debug!(
        grant_type = %params.grant_type,
        client_id = %params.client_id,
        redirect_uri = %params.redirect_uri,
        "Token request"
    );

    if params.grant_type != "authorization_code" {
        return error_response(StatusCode::BAD_REQUEST, "unsupported_grant_type", None);
    }

    match state.sessions.redeem_code(&params.code, &params.client_id) {
        Ok(issued) => {
            tracing::info!(access_token = %token_prefix(&issued.access_token), "Token issued");
            (StatusCode::OK, Json(TokenResponse::from(issued))).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Token exchange rejected");
            session_error(e)
        }
    }
}

/// UserInfo endpoint.
#[tracing::instrument(skip(state, headers))]
#[utoipa::path(
    get,
    path = "/userinfo",
    tag = OAUTH2_TAG,
    operation_id = "ESIA UserInfo",
    summary = "Get the identity of the token holder",
    description = "Resolves the bearer token to the phone number entered during authorization and returns \
                   the synthetic person derived from it. The same phone number always yields the same person.",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Person record", body = IdentityRecord),
        (status = 401, description = "Missing, malformed or unknown access token", body = ErrorResponse),
    )
)]
pub async fn userinfo(State(state): State<OAuth2State>, headers: HeaderMap) -> Response {
    let record = match resolve_identity(&state, &headers) {
        Ok(record) => record,
        Err(response) => return response,
    };

    tracing::info!(oid = %record.oid, "UserInfo response");
    (StatusCode::OK, Json(record.as_ref())).into_response()
}

/// Person lookup by oid.
#[tracing::instrument(skip(state, headers))]
#[utoipa::path(
    get,
    path = "/rs/prns/{oid}",
    tag = OAUTH2_TAG,
    operation_id = "ESIA Person",
    summary = "Get a person record by oid",
    description = "Returns the token holder's person record. A token can only read its own record, addressed \
                   either by its oid or by the `sub` claim of its id_token.",
    params(
        ("oid" = String, Path, description = "Person oid as returned by `/userinfo`, or the id_token `sub`."),
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Person record", body = IdentityRecord),
        (status = 401, description = "Missing, malformed or unknown access token", body = ErrorResponse),
        (status = 404, description = "oid does not belong to the token holder", body = ErrorResponse),
    )
)]
pub async fn person(
    State(state): State<OAuth2State>,
    Path(oid): Path<String>,
    headers: HeaderMap,
) -> Response {
    let (issued, record) = match resolve_holder(&state, &headers) {
        Ok(holder) => holder,
        Err(response) => return response,
    };

    if record.oid != oid && issued.subject_id != oid {
        return error_response(
            StatusCode::NOT_FOUND,
            "not_found",
            Some("oid does not belong to the token holder"),
        );
    }

    tracing::info!(oid = %record.oid, "Person response");
    (StatusCode::OK, Json(record.as_ref())).into_response()
}

/// OpenID Connect Discovery document.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/.well-known/openid-configuration",
    tag = OAUTH2_TAG,
    operation_id = "OpenID Connect Discovery",
    summary = "OpenID Connect Discovery document",
    description = "Endpoint URLs and capabilities of the mock provider.",
    responses(
        (status = 200, description = "OpenID Connect configuration document", body = OpenIdConfiguration),
    )
)]
pub async fn openid_configuration(State(state): State<OAuth2State>) -> Json<OpenIdConfiguration> {
    Json(OpenIdConfiguration {
        issuer: state.issuer_url.clone(),
        authorization_endpoint: format!("{}/aas/oauth2/ac", state.issuer_url),
        token_endpoint: format!("{}/aas/oauth2/te", state.issuer_url),
        userinfo_endpoint: format!("{}/userinfo", state.issuer_url),
        response_types_supported: strings(&["code"]),
        grant_types_supported: strings(&["authorization_code"]),
        subject_types_supported: strings(&["public"]),
        scopes_supported: strings(&[
            "openid", "fullname", "birthdate", "gender", "snils", "inn", "email", "mobile",
        ]),
        token_endpoint_auth_methods_supported: strings(&["none"]),
        id_token_signing_alg_values_supported: strings(&["none"]),
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

fn render_authorize_form(params: AuthorizeQuery) -> Response {
    tracing::debug!(?params, "Authorization request");

    let (Some(client_id), Some(redirect_uri)) =
        (non_empty(params.client_id), non_empty(params.redirect_uri))
    else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "invalid_request",
            Some("client_id and redirect_uri are required"),
        );
    };

    let template = AuthorizeTemplate {
        client_id,
        redirect_uri,
        state: params.state.unwrap_or_default(),
        scope: params.scope.unwrap_or_default(),
        response_type: params.response_type.unwrap_or_default(),
    };

    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Failed to render authorization form: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Extracts the token from `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Result<&str, Response> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Err(error_response(StatusCode::UNAUTHORIZED, "unauthorized", None));
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.split_once(' '))
        .and_then(|(scheme, token)| {
            (scheme == "Bearer" && !token.is_empty() && !token.contains(' ')).then_some(token)
        })
        .ok_or_else(|| {
            error_response(
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                Some("Expected `Authorization: Bearer <token>`"),
            )
        })
}

fn resolve_identity(
    state: &OAuth2State,
    headers: &HeaderMap,
) -> Result<Arc<IdentityRecord>, Response> {
    resolve_holder(state, headers).map(|(_, record)| record)
}

/// The token behind the bearer header together with its holder's record.
fn resolve_holder(
    state: &OAuth2State,
    headers: &HeaderMap,
) -> Result<(IssuedToken, Arc<IdentityRecord>), Response> {
    let access_token = bearer_token(headers)?;
    let issued = state
        .sessions
        .lookup_token(access_token)
        .map_err(session_error)?;
    let record = state.identities.get_or_create(&issued.subject_id);
    Ok((issued, record))
}

/// Shortened token for logs.
fn token_prefix(token: &str) -> String {
    format!("{}...", token.get(..10).unwrap_or(token))
}

fn form_rejection(rejection: FormRejection) -> Response {
    tracing::warn!(error = %rejection.body_text(), "Unreadable form body");
    error_response(
        StatusCode::BAD_REQUEST,
        "invalid_request",
        Some("Expected an application/x-www-form-urlencoded body"),
    )
}

fn session_error(err: SessionError) -> Response {
    error_response(err.status_code(), err.oauth_code(), None)
}

fn error_response(status: StatusCode, error: &str, description: Option<&str>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            error_description: description.map(String::from),
        }),
    )
        .into_response()
}
