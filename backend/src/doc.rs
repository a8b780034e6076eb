//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] lists every HTTP endpoint together with the request, response
//! and error schemas. Domain types stay free of utoipa; the error envelope
//! is described by the wrappers in [`crate::inbound::http::schemas`].
//!
//! Served by Swagger UI in debug builds and exported with
//! `cargo run --bin openapi-dump`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::items::{CreateItemRequest, ItemResponse, UpdateItemRequest};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::swaps::{CreateSwapRequest, ResolveSwapRequest, SwapResponse};
use crate::inbound::http::users::{
    LoginRequest, RegisterRequest, UpdateProfileRequest, UserResponse,
};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Private session cookie issued by POST /api/v1/login or /api/v1/register.",
            ))),
        );
    }
}

/// OpenAPI document for the marketplace API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Barter marketplace API",
        description = "List items and negotiate two-way swaps between members."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_current_user,
        crate::inbound::http::items::create_item,
        crate::inbound::http::items::list_items,
        crate::inbound::http::items::get_item,
        crate::inbound::http::items::update_item,
        crate::inbound::http::items::delete_item,
        crate::inbound::http::items::list_user_items,
        crate::inbound::http::swaps::propose_swap,
        crate::inbound::http::swaps::list_swaps,
        crate::inbound::http::swaps::resolve_swap,
        crate::inbound::http::swaps::withdraw_swap,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RegisterRequest,
        LoginRequest,
        UpdateProfileRequest,
        UserResponse,
        CreateItemRequest,
        UpdateItemRequest,
        ItemResponse,
        CreateSwapRequest,
        ResolveSwapRequest,
        SwapResponse,
    )),
    tags(
        (name = "users", description = "Registration, login and profiles"),
        (name = "items", description = "Item listings"),
        (name = "swaps", description = "Swap proposals and decisions"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("/api/v1/register")]
    #[case("/api/v1/login")]
    #[case("/api/v1/logout")]
    #[case("/api/v1/users/me")]
    #[case("/api/v1/users/{id}/items")]
    #[case("/api/v1/items")]
    #[case("/api/v1/items/{id}")]
    #[case("/api/v1/swaps")]
    #[case("/api/v1/swaps/{id}")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn document_lists_path(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    #[case("crate.domain.Error", "traceId")]
    #[case("SwapResponse", "item1User")]
    #[case("ItemResponse", "ownerName")]
    #[case("UserResponse", "createdAt")]
    fn schema_uses_wire_field_names(#[case] schema: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let found = schemas.get(schema).expect("schema registered");
        assert_object_schema_has_field(found, field);
    }

    #[test]
    fn register_response_has_no_password() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        match schemas.get("UserResponse").expect("UserResponse") {
            RefOr::T(Schema::Object(obj)) => {
                assert!(!obj.properties.contains_key("password"));
            }
            _ => panic!("expected Object schema"),
        }
    }
}
