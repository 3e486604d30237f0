/*
 * Responsibility
 * - utoipa で customer profiles API の OpenAPI document を組み立てる
 * - GET /api/openapi.json で返す (policy 上 Public: token 不要)
 */
use axum::Json;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::dto::customer_profiles::{
    ChangeProfileRequest, CreateProfileRequest, ProfileResponse,
};
use crate::error::{ErrorBody, ErrorResponse};

/// Bearer JWT issued by the authorization server.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Access token; scopes message.read / message.write",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Customer Profiles API",
        description = "Customer profile resource server. Every route except this document needs a bearer access token."
    ),
    paths(
        crate::api::handlers::customer_profiles::list_profiles,
        crate::api::handlers::customer_profiles::create_profile,
        crate::api::handlers::customer_profiles::get_profile,
        crate::api::handlers::customer_profiles::change_profile,
        crate::api::handlers::customer_profiles::delete_profile,
    ),
    components(schemas(
        CreateProfileRequest,
        ChangeProfileRequest,
        ProfileResponse,
        ErrorResponse,
        ErrorBody,
    )),
    modifiers(&BearerAuth),
    tags((name = "customer-profiles", description = "Customer profile CRUD"))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_profile_paths() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/api/customer-profiles"));
        assert!(
            doc.paths
                .paths
                .contains_key("/api/customer-profiles/{profile_id}")
        );
    }

    #[test]
    fn document_declares_bearer_scheme_and_schemas() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();

        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("ProfileResponse"));
        assert!(components.schemas.contains_key("CreateProfileRequest"));
    }
}
