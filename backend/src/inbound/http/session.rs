//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the Actix cookie session so handlers and the settings dispatcher
//! only see the signed-in [`UserId`].

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::ports::SessionSource;
use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user's id in the session cookie.
    ///
    /// The session id is renewed first so a pre-login cookie cannot be
    /// reused after sign-in.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.as_ref())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the current user id from the session, if present.
    ///
    /// Unreadable ids are treated as an anonymous session.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let id = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(id.and_then(|raw| match UserId::new(raw) {
            Ok(id) => Some(id),
            Err(error) => {
                warn!(%error, "invalid user id in session cookie");
                None
            }
        }))
    }

    /// Drop every value held in the session and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl SessionSource for SessionContext {
    fn current_user(&self) -> Result<Option<UserId>, Error> {
        self.user_id()
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(Self::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::dev::ServiceResponse;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .route(
                "/whoami",
                web::get().to(|session: SessionContext| async move {
                    let body = session
                        .current_user()?
                        .map_or_else(|| "anonymous".to_owned(), |id| id.to_string());
                    Ok::<_, Error>(HttpResponse::Ok().body(body))
                }),
            )
    }

    fn whoami(cookie: Option<Cookie<'static>>) -> test::TestRequest {
        let request = test::TestRequest::get().uri("/whoami");
        match cookie {
            Some(cookie) => request.cookie(cookie),
            None => request,
        }
    }

    async fn body_text(response: ServiceResponse) -> String {
        assert_eq!(response.status(), StatusCode::OK);
        let body = test::read_body(response).await;
        String::from_utf8(body.to_vec()).expect("utf-8 body")
    }

    fn session_cookie(response: &ServiceResponse) -> Cookie<'static> {
        response
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .map(|cookie| cookie.into_owned())
            .expect("session cookie set")
    }

    #[actix_web::test]
    async fn round_trips_user_id() {
        let app = test::init_service(session_test_app().route(
            "/set",
            web::get().to(|session: SessionContext| async move {
                let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("fixture id");
                session.persist_user(&id)?;
                Ok::<_, Error>(HttpResponse::Ok())
            }),
        ))
        .await;

        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set_res.status(), StatusCode::OK);
        let cookie = session_cookie(&set_res);

        let response = test::call_service(&app, whoami(Some(cookie)).to_request()).await;
        assert_eq!(
            body_text(response).await,
            "3fa85f64-5717-4562-b3fc-2c963f66afa6"
        );
    }

    #[actix_web::test]
    async fn missing_user_is_anonymous() {
        let app = test::init_service(session_test_app()).await;
        let response = test::call_service(&app, whoami(None).to_request()).await;
        assert_eq!(body_text(response).await, "anonymous");
    }

    #[actix_web::test]
    async fn malformed_user_id_is_anonymous() {
        let app = test::init_service(session_test_app().route(
            "/set-invalid",
            web::get().to(|session: Session| async move {
                session
                    .insert(USER_ID_KEY, "  padded  ")
                    .expect("set invalid user id");
                HttpResponse::Ok()
            }),
        ))
        .await;

        let set_res = test::call_service(
            &app,
            test::TestRequest::get().uri("/set-invalid").to_request(),
        )
        .await;
        let cookie = session_cookie(&set_res);

        let response = test::call_service(&app, whoami(Some(cookie)).to_request()).await;
        assert_eq!(body_text(response).await, "anonymous");
    }
}
