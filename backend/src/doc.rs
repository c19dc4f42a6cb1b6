//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST API: all `/user` endpoints, the health probes, the envelope
//! schemas, and the access-token security scheme. The generated document
//! backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Ground, GroundMembership, User};
use crate::inbound::http::Envelope;
use crate::inbound::http::users::{ProfileImageDto, SaveTokenRequest, UpdateUserRequest};

/// Enrich the generated document with the access-token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "AccessToken",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "Access token issued at login, sent as `Bearer <token>`.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Ground backend API",
        description = "HTTP interface for user account management and health probes. \
                       Every response is wrapped in a `{status, message, data}` envelope."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("AccessToken" = [])),
    paths(
        crate::inbound::http::users::get_user_info,
        crate::inbound::http::users::get_user_profile,
        crate::inbound::http::users::get_ground_list,
        crate::inbound::http::users::get_status_msg,
        crate::inbound::http::users::check_dup_nickname,
        crate::inbound::http::users::save_personal_access_token,
        crate::inbound::http::users::update_user_info,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::users::update_last_visited_ground,
        crate::inbound::http::users::delete_profile,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::users::delete_status_msg,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        User,
        Ground,
        GroundMembership,
        ProfileImageDto,
        UpdateUserRequest,
        SaveTokenRequest,
        Envelope<User>,
        Envelope<bool>,
        Envelope<Option<String>>,
        Envelope<Vec<GroundMembership>>,
        Envelope<ProfileImageDto>,
    )),
    tags(
        (name = "user", description = "사용자 계정 관리"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
