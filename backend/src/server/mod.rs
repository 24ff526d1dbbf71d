//! Server construction and middleware wiring.

mod config;

pub use config::AppConfig;

use std::net::SocketAddr;
use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use account_settings::doc::ApiDoc;
use account_settings::domain::FixedDelay;
use account_settings::inbound::http::session_config::SessionSettings;
use account_settings::inbound::http::settings;
use account_settings::inbound::http::state::{HttpState, HttpStatePorts};
use account_settings::inbound::http::users::{sign_in, sign_out};
use account_settings::outbound::memory::InMemoryAccounts;

/// Everything needed to start the listener.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) action_delay: FixedDelay,
    pub(crate) accounts: Arc<InMemoryAccounts>,
}

impl ServerConfig {
    /// Construct a server configuration around an account store.
    #[must_use]
    pub fn new(
        session: SessionSettings,
        app: &AppConfig,
        bind_addr: SocketAddr,
        accounts: Arc<InMemoryAccounts>,
    ) -> Self {
        Self {
            session,
            bind_addr,
            action_delay: FixedDelay::new(app.action_delay()),
            accounts,
        }
    }
}

#[derive(Clone)]
struct AppDependencies {
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        key,
        cookie_secure,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(sign_in)
        .service(sign_out)
        .configure(settings::configure);

    let app = App::new().app_data(http_state).service(api);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server from the provided configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let ServerConfig {
        session,
        bind_addr,
        action_delay,
        accounts,
    } = config;
    let SessionSettings { key, cookie_secure } = session;

    let http_state = web::Data::new(HttpState::new(
        HttpStatePorts::from_adapter(accounts),
        Arc::new(action_delay),
    ));

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
        })
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "listening");
    Ok(server)
}
