//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test as actix_test, web};
use serde_json::Value;

use crate::domain::{NoDelay, Secret};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::{settings, users};
use crate::outbound::memory::{
    DEMO_EMAIL, DEMO_PASSWORD, InMemoryAccounts, NewAccount, PasswordHashing,
};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Store holding the demo account, hashed with minimal Argon2 costs.
pub fn demo_accounts() -> Arc<InMemoryAccounts> {
    let hashing = PasswordHashing::with_costs(64, 1).expect("cheap argon2 params");
    let accounts = InMemoryAccounts::with_hashing(hashing);
    accounts
        .register(NewAccount {
            email: DEMO_EMAIL.to_owned(),
            username: "demo".to_owned(),
            name: "Demo User".to_owned(),
            password: Some(Secret::new(DEMO_PASSWORD)),
        })
        .expect("seed demo account");
    Arc::new(accounts)
}

/// Handler state over `accounts` without any action delay.
pub fn test_state(accounts: Arc<InMemoryAccounts>) -> HttpState {
    HttpState::new(HttpStatePorts::from_adapter(accounts), Arc::new(NoDelay))
}

/// App exposing every account route under `/api/v1`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .service(
            web::scope("/api/v1")
                .service(users::sign_in)
                .service(users::sign_out)
                .configure(settings::configure),
        )
}

/// Session cookie set on `response`, if any.
pub fn session_cookie(response: &ServiceResponse) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

/// Sign in as the demo account and return the session cookie.
pub async fn sign_in_as_demo(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
) -> Cookie<'static> {
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/signin")
        .set_json(serde_json::json!({ "email": DEMO_EMAIL, "password": DEMO_PASSWORD }))
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert!(response.status().is_success(), "demo sign-in failed");
    session_cookie(&response).expect("session cookie")
}

/// Decode a JSON response body.
pub async fn json_body(response: ServiceResponse) -> Value {
    let body = actix_test::read_body(response).await;
    serde_json::from_slice(&body).expect("JSON body")
}
