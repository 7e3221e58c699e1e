//! OpenAPI/Utoipa configuration.

use crate::api::{debug::DEBUG_TAG, health::MISC_TAG};
use crate::oauth2::OAUTH2_TAG;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

/// Security addon for OpenAPI documentation.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        let bearer = HttpBuilder::new()
            .scheme(HttpAuthScheme::Bearer)
            .description(Some(
                "Opaque access token obtained from `POST /aas/oauth2/te`.",
            ))
            .build();
        components.add_security_scheme("bearer_auth", SecurityScheme::Http(bearer));
    }
}

/// OpenAPI documentation configuration.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "ESIA Mock API",
        version = "1.0.0",
        description = "Mock of the ESIA (Gosuslugi) OAuth2 provider for integration testing. \
                       Tokens are not signed and identities are synthetic."
    ),
    tags(
        (name = MISC_TAG, description = "Miscellaneous endpoints"),
        (name = OAUTH2_TAG, description = "ESIA OAuth2 endpoints"),
        (name = DEBUG_TAG, description = "Inspection of in-memory state")
    )
)]
pub struct ApiDoc;
