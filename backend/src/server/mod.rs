//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::RequestLog;
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::AuthResolver;
use crate::inbound::http::HttpState;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::users::{
    check_dup_nickname, delete_profile, delete_status_msg, delete_user, get_ground_list,
    get_status_msg, get_user_info, get_user_profile, save_personal_access_token,
    update_last_visited_ground, update_profile, update_user_info,
};
use crate::outbound::github::GithubOauthGateway;
use crate::outbound::jwt::JwtTokenLookup;
use crate::outbound::memory::InMemoryDirectory;
use crate::outbound::profile::FsProfileImageStore;

/// Assemble the handler dependency bundle from configuration.
///
/// # Errors
/// Returns [`std::io::Error`] when the profile image directory cannot be
/// created.
fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let directory: Arc<InMemoryDirectory> = Arc::new(InMemoryDirectory::new());
    let lookup = JwtTokenLookup::new(config.token_secret.as_slice(), directory.clone());
    let profiles = FsProfileImageStore::new(config.profile_image_dir.clone())
        .map_err(|e| std::io::Error::other(format!("profile image dir unavailable: {e}")))?;
    let github = GithubOauthGateway::new(
        config.github_client_id.clone(),
        config.github_client_secret.clone(),
    );
    Ok(HttpState::new(
        AuthResolver::new(Arc::new(lookup)),
        directory,
        Arc::new(profiles),
        Arc::new(github),
    ))
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let users = web::scope("/user")
        .service(get_user_info)
        .service(get_user_profile)
        .service(get_ground_list)
        .service(get_status_msg)
        .service(check_dup_nickname)
        .service(save_personal_access_token)
        .service(update_user_info)
        .service(update_profile)
        .service(update_last_visited_ground)
        .service(delete_profile)
        .service(delete_user)
        .service(delete_status_msg);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(RequestLog)
        .service(users)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when state construction or binding the
/// socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(&config)?);
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
