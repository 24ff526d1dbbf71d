//! Sign-in and sign-out handlers.
//!
//! ```text
//! POST /api/v1/signin {"email":"demo@example.com","password":"Demo1234"}
//! GET  /api/v1/signout
//! ```

use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::settings_action::SIGN_IN_PATH;
use crate::domain::validation::{Operation, SignIn, SubmissionResult, parse};
use crate::inbound::http::ApiResult;
use crate::inbound::http::form::SubmittedForm;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Landing page used when the form names no usable `redirectTo`.
pub const DEFAULT_REDIRECT: &str = "/settings";

/// Body returned by `POST /api/v1/signin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    /// Signed-in account.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub user_id: String,
    /// Same-site path the client should open next.
    #[schema(example = "/settings")]
    pub redirect_to: String,
}

/// Return `target` when it is a same-site absolute path.
fn safe_redirect(target: Option<&str>) -> &str {
    match target {
        Some(path)
            if path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\") =>
        {
            path
        }
        _ => DEFAULT_REDIRECT,
    }
}

/// Authenticate with email and password and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/signin",
    request_body(
        content = serde_json::Value,
        description = "email, password, remember and redirectTo as JSON or form fields"
    ),
    responses(
        (status = 200, description = "Signed in", body = SignInResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Field errors under details.fields", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "signIn",
    security([])
)]
#[post("/signin")]
pub async fn sign_in(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: SubmittedForm,
) -> ApiResult<web::Json<SignInResponse>> {
    let credentials = match parse::<SignIn>(Operation::SignIn, form.value())? {
        SubmissionResult::Valid(credentials) => credentials,
        SubmissionResult::Invalid(errors) => {
            return Err(Error::invalid_request("Sign-in form is invalid")
                .with_details(json!({ "fields": errors })));
        }
    };

    let user_id = state.login.authenticate(&credentials).await?;
    session.persist_user(&user_id)?;
    info!(user_id = %user_id, "signed in");

    Ok(web::Json(SignInResponse {
        user_id: user_id.to_string(),
        redirect_to: safe_redirect(credentials.redirect_to.as_deref()).to_owned(),
    }))
}

/// Clear the session and send the caller to sign in.
#[utoipa::path(
    get,
    path = "/api/v1/signout",
    responses(
        (status = 303, description = "Session cleared", headers(("Location" = String)))
    ),
    tags = ["auth"],
    operation_id = "signOut",
    security([])
)]
#[get("/signout")]
pub async fn sign_out(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::SeeOther()
        .insert_header((LOCATION, SIGN_IN_PATH))
        .finish()
}
