//! Server construction, middleware wiring and background tasks.

mod config;
mod state_builders;

pub use config::{ServerConfig, Storage};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use resource_library::Trace;
#[cfg(debug_assertions)]
use resource_library::doc::ApiDoc;
use resource_library::domain::SessionStore;
use resource_library::inbound::http::configure_api;
use resource_library::inbound::http::health::{HealthState, live, ready};
use resource_library::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use state_builders::{Repositories, build_http_state};

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
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .configure(configure_api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Periodically delete expired sessions. Failures are logged and retried on
/// the next tick.
fn spawn_session_sweeper(store: SessionStore, every: std::time::Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match store.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => info!(purged, "expired sessions purged"),
                Err(err) => warn!(error = %err, "session sweep failed"),
            }
        }
    })
}

/// Wire storage, services and routes, then bind the listener.
///
/// The returned [`Server`] must be awaited to serve requests. Readiness is
/// flagged once the socket is bound.
///
/// # Errors
/// Fails when the session table cannot be prepared or the socket cannot be
/// bound.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<(Server, JoinHandle<()>)> {
    let repositories = Repositories::for_storage(&config.storage)
        .await
        .map_err(std::io::Error::other)?;
    let (http_state, store) = build_http_state(repositories, config.session_ttl, config.cookies);
    let http_state = web::Data::new(http_state);

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || build_app(server_health_state.clone(), http_state.clone()))
        .bind(config.bind_addr)?
        .run();

    let sweeper = spawn_session_sweeper(store, config.sweep_interval);
    health_state.mark_ready();
    info!(addr = %config.bind_addr, "listening");
    Ok((server, sweeper))
}
