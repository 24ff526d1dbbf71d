//! Account settings handlers.
//!
//! ```text
//! GET      /api/v1/settings/password
//! PUT|POST /api/v1/settings/password {"intent":"update-user-password",...}
//! PUT|POST /api/v1/settings/profile  {"intent":"update-user-nick",...}
//! ```
//!
//! Actions run through the settings dispatcher and answer with an
//! [`ActionResponse`]. Anonymous callers are redirected with `303 See Other`.

use std::collections::BTreeMap;

use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::validation::FieldErrors;
use crate::domain::{AccountSummary, ActionOutcome};
use crate::inbound::http::ApiResult;
use crate::inbound::http::form::SubmittedForm;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Where the password loader sends anonymous callers.
pub const SIGN_OUT_PATH: &str = "/signout";

/// Body returned by settings actions.
///
/// `error` maps field paths to messages; a refusal that concerns no single
/// field is keyed by the empty path. An unrecognised intent yields an empty
/// `success` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActionResponse {
    /// Intent echoed back from the submission.
    #[schema(example = "update-user-password")]
    pub intent: Option<String>,
    /// Field path to error messages.
    pub error: Option<BTreeMap<String, Vec<String>>>,
    /// Confirmation shown to the user.
    #[schema(example = "Password has been changed.")]
    pub success: Option<String>,
}

impl ActionResponse {
    fn success(intent: Option<String>, message: String) -> Self {
        Self {
            intent,
            error: None,
            success: Some(message),
        }
    }

    fn field_errors(intent: String, errors: &FieldErrors) -> Self {
        let error = errors
            .to_map()
            .into_iter()
            .map(|(path, messages)| {
                (
                    path.to_owned(),
                    messages.into_iter().map(str::to_owned).collect(),
                )
            })
            .collect();
        Self {
            intent: Some(intent),
            error: Some(error),
            success: None,
        }
    }

    fn refusal(intent: String, message: String) -> Self {
        Self {
            intent: Some(intent),
            error: Some(BTreeMap::from([(String::new(), vec![message])])),
            success: None,
        }
    }
}

/// Account view returned by the password settings loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    /// Account identifier, submitted back as the form's `id` field.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    /// Whether the account has a password to change.
    pub has_password: bool,
}

/// Body returned by `GET /api/v1/settings/password`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PasswordSettingsView {
    pub user: AccountView,
}

impl From<AccountSummary> for PasswordSettingsView {
    fn from(summary: AccountSummary) -> Self {
        Self {
            user: AccountView {
                id: summary.id().to_string(),
                has_password: summary.has_password(),
            },
        }
    }
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location))
        .finish()
}

/// Translate a dispatcher outcome into its HTTP response.
pub fn action_response(outcome: ActionOutcome) -> HttpResponse {
    match outcome {
        ActionOutcome::Redirect { location } => see_other(location),
        ActionOutcome::Rejected { intent, errors } => {
            HttpResponse::BadRequest().json(ActionResponse::field_errors(intent, &errors))
        }
        ActionOutcome::Refused { intent, message } => {
            HttpResponse::Forbidden().json(ActionResponse::refusal(intent, message))
        }
        ActionOutcome::Conflicted { intent, message } => {
            HttpResponse::Conflict().json(ActionResponse::refusal(intent, message))
        }
        ActionOutcome::Completed { intent, message } => {
            HttpResponse::Ok().json(ActionResponse::success(Some(intent), message))
        }
        ActionOutcome::Ignored { intent } => {
            HttpResponse::Ok().json(ActionResponse::success(intent, String::new()))
        }
    }
}

/// Load the password settings page data.
#[utoipa::path(
    get,
    path = "/api/v1/settings/password",
    responses(
        (status = 200, description = "Current account", body = PasswordSettingsView),
        (status = 303, description = "No session; redirect to sign out", headers(("Location" = String))),
        (status = 404, description = "Account missing", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["settings"],
    operation_id = "loadPasswordSettings"
)]
pub async fn load_password_settings(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let Some(user_id) = session.user_id()? else {
        debug!("password settings requested without a session");
        return Ok(see_other(SIGN_OUT_PATH));
    };
    let summary = state.accounts.account(&user_id).await?;
    Ok(HttpResponse::Ok().json(PasswordSettingsView::from(summary)))
}

/// Submit a password settings form. `POST` is accepted as well as `PUT`.
#[utoipa::path(
    put,
    path = "/api/v1/settings/password",
    request_body(
        content = serde_json::Value,
        description = "Form fields as JSON or application/x-www-form-urlencoded"
    ),
    responses(
        (status = 200, description = "Password changed or intent ignored", body = ActionResponse),
        (status = 303, description = "No session; redirect to sign in", headers(("Location" = String))),
        (status = 400, description = "Field errors", body = ActionResponse),
        (status = 403, description = "Change refused", body = ActionResponse),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["settings"],
    operation_id = "updatePasswordSettings"
)]
pub async fn update_password_settings(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: SubmittedForm,
) -> ApiResult<HttpResponse> {
    let outcome = state
        .password_settings
        .dispatch(&session, form.value())
        .await?;
    Ok(action_response(outcome))
}

/// Submit a profile settings form. `POST` is accepted as well as `PUT`.
#[utoipa::path(
    put,
    path = "/api/v1/settings/profile",
    request_body(
        content = serde_json::Value,
        description = "Form fields as JSON or application/x-www-form-urlencoded"
    ),
    responses(
        (status = 200, description = "Profile changed or intent ignored", body = ActionResponse),
        (status = 303, description = "No session; redirect to sign in", headers(("Location" = String))),
        (status = 400, description = "Field errors", body = ActionResponse),
        (status = 403, description = "Change refused", body = ActionResponse),
        (status = 409, description = "Username or email already taken", body = ActionResponse),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["settings"],
    operation_id = "updateProfileSettings"
)]
pub async fn update_profile_settings(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: SubmittedForm,
) -> ApiResult<HttpResponse> {
    let outcome = state
        .profile_settings
        .dispatch(&session, form.value())
        .await?;
    Ok(action_response(outcome))
}

/// Register the settings routes on a scope.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use account_settings::inbound::http::settings;
///
/// let app = App::new().service(web::scope("/api/v1").configure(settings::configure));
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/settings/password")
            .route(web::get().to(load_password_settings))
            .route(web::put().to(update_password_settings))
            .route(web::post().to(update_password_settings)),
    )
    .service(
        web::resource("/settings/profile")
            .route(web::put().to(update_profile_settings))
            .route(web::post().to(update_profile_settings)),
    );
}
