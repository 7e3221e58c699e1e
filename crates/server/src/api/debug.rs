//! Debug endpoints for inspecting in-memory state.
//!
//! Mounted under `/debug` only when `debug_endpoints` is enabled.

use crate::identity::IdentityRecord;
use crate::oauth2::OAuth2State;
use axum::{Json, extract::State};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

pub const DEBUG_TAG: &str = "Debug";

/// Creates the debug router.
pub fn router(state: OAuth2State) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(identities))
        .with_state(state)
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DebugSnapshot {
    /// Number of identities derived so far
    pub count: usize,
    pub pending_codes: usize,
    pub issued_tokens: usize,
    /// Identities keyed by phone number
    pub identities: BTreeMap<String, IdentityRecord>,
}

/// List every identity derived since startup.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/identities",
    tag = DEBUG_TAG,
    operation_id = "Debug Identities",
    summary = "Dump cached identities",
    description = "Returns every identity derived since startup along with code and token counts. \
                   Disable with `debug_endpoints: false` in shared environments.",
    responses(
        (status = 200, description = "Current in-memory state", body = DebugSnapshot),
    )
)]
pub async fn identities(State(state): State<OAuth2State>) -> Json<DebugSnapshot> {
    let identities = state.identities.snapshot();
    Json(DebugSnapshot {
        count: identities.len(),
        pending_codes: state.sessions.pending_codes(),
        issued_tokens: state.sessions.issued_tokens(),
        identities,
    })
}
