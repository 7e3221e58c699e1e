//! Liveness endpoint for harnesses that start the mock next to the client under test.

pub const MISC_TAG: &str = "Miscellaneous";

/// Answers `ok` once the listener is up. Touches no session or identity state.
#[tracing::instrument]
#[utoipa::path(
    method(get, head),
    path = "/healthz",
    tag = MISC_TAG,
    operation_id = "Liveness",
    summary = "Mock provider liveness",
    description = "Poll this before driving the OAuth2 flow. HEAD is accepted for load balancers and \
                   container health checks.",
    responses(
        (status = 200, description = "Listener is accepting requests", body = str, content_type = "text/plain", example = "ok")
    )
)]
pub async fn health() -> &'static str {
    "ok"
}
