//! HTTP inbound adapter exposing the JSON API under `/api`.

pub mod auth;
pub mod error;
pub mod health;
pub mod resources;
pub mod session;
pub mod session_config;
pub mod session_renewal;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod users;
mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register the `/api` scope with its JSON and path error handlers, and
/// session cookie renewal.
///
/// Callers must also provide `web::Data<HttpState>`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .wrap(session_renewal::RenewSessionCookie)
            .app_data(web::JsonConfig::default().error_handler(validation::json_error_handler))
            .app_data(web::PathConfig::default().error_handler(validation::path_error_handler))
            .service(auth::register)
            .service(auth::login)
            .service(auth::logout)
            .service(auth::current_user)
            .service(resources::list_resources)
            .service(resources::get_resource)
            .service(resources::create_resource)
            .service(resources::update_resource)
            .service(resources::delete_resource)
            .service(users::list_users)
            .service(users::update_user)
            .service(users::delete_user),
    );
}
