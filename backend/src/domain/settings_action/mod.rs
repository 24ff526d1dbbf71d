//! Intent-based dispatcher for settings form submissions.
//!
//! A submission passes through these stages in order:
//!
//! 1. the [`DelayPolicy`] is awaited;
//! 2. the session is checked, and anonymous requests are redirected to
//!    [`SIGN_IN_PATH`] without looking at the payload;
//! 3. the `intent` field selects a handler from the [`IntentRegistry`];
//!    unknown or missing intents complete with an empty message and no
//!    mutation;
//! 4. the payload is validated with the handler's schema, and field errors
//!    end the request;
//! 5. the handler applies the change.
//!
//! Handler errors with [`ErrorCode::Forbidden`] become
//! [`ActionOutcome::Refused`] and [`ErrorCode::Conflict`] becomes
//! [`ActionOutcome::Conflicted`]. Every other error propagates to the caller.

mod delay;
mod intents;

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

pub use self::delay::{DelayPolicy, FixedDelay, NoDelay};
pub use self::intents::{
    INTENT_FIELD, IntentHandler, IntentRegistry, NOT_YOUR_ACCOUNT, PASSWORD_CHANGED,
    PROFILE_INTENTS, PasswordUpdateHandler, ProfileFieldHandler, UPDATE_PASSWORD_ALIAS,
    UPDATE_USER_PASSWORD,
};
use crate::domain::ports::SessionSource;
use crate::domain::validation::{FieldErrors, SubmissionResult, compose, validate};
use crate::domain::{Error, ErrorCode};

/// Where anonymous settings requests are sent.
pub const SIGN_IN_PATH: &str = "/signin";

/// Result of dispatching one settings submission.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// No session; the caller should redirect to `location`.
    Redirect { location: &'static str },
    /// The payload failed its schema.
    Rejected { intent: String, errors: FieldErrors },
    /// The store refused a valid submission.
    Refused { intent: String, message: String },
    /// The submitted value belongs to another account.
    Conflicted { intent: String, message: String },
    /// The change was applied.
    Completed { intent: String, message: String },
    /// The intent is not registered; nothing happened.
    Ignored { intent: Option<String> },
}

impl ActionOutcome {
    /// Intent echoed back to the client, if any.
    pub fn intent(&self) -> Option<&str> {
        match self {
            Self::Redirect { .. } => None,
            Self::Rejected { intent, .. }
            | Self::Refused { intent, .. }
            | Self::Conflicted { intent, .. }
            | Self::Completed { intent, .. } => Some(intent),
            Self::Ignored { intent } => intent.as_deref(),
        }
    }
}

/// Routes settings submissions to their intent handlers.
#[derive(Clone)]
pub struct SettingsActionDispatcher {
    delay: Arc<dyn DelayPolicy>,
    intents: IntentRegistry,
}

impl SettingsActionDispatcher {
    pub fn new(delay: Arc<dyn DelayPolicy>, intents: IntentRegistry) -> Self {
        Self { delay, intents }
    }

    /// Registered intents.
    pub fn intents(&self) -> &IntentRegistry {
        &self.intents
    }

    /// Process one submission for the session's user.
    ///
    /// # Errors
    /// Returns the session source's error, or any error other than a refusal
    /// or conflict raised while applying the change.
    pub async fn dispatch(
        &self,
        session: &dyn SessionSource,
        payload: &Value,
    ) -> Result<ActionOutcome, Error> {
        self.delay.pause().await;

        let Some(user_id) = session.current_user()? else {
            debug!("settings action without a session");
            return Ok(ActionOutcome::Redirect {
                location: SIGN_IN_PATH,
            });
        };

        let intent = payload.get(INTENT_FIELD).and_then(Value::as_str);
        let Some((intent, handler)) =
            intent.and_then(|name| self.intents.get(name).map(|handler| (name, handler)))
        else {
            info!(user_id = %user_id, intent = ?intent, "ignoring unrecognised intent");
            return Ok(ActionOutcome::Ignored {
                intent: intent.map(str::to_owned),
            });
        };

        let schema = compose(handler.operation());
        let fields = match validate(&schema, payload) {
            SubmissionResult::Valid(fields) => fields,
            SubmissionResult::Invalid(errors) => {
                info!(
                    user_id = %user_id,
                    intent,
                    fields = ?errors.paths(),
                    "settings submission rejected"
                );
                return Ok(ActionOutcome::Rejected {
                    intent: intent.to_owned(),
                    errors,
                });
            }
        };

        match handler.handle(&user_id, fields).await {
            Ok(message) => Ok(ActionOutcome::Completed {
                intent: intent.to_owned(),
                message,
            }),
            Err(error) if error.code() == ErrorCode::Forbidden => {
                warn!(user_id = %user_id, intent, reason = error.message(), "settings change refused");
                Ok(ActionOutcome::Refused {
                    intent: intent.to_owned(),
                    message: error.message().to_owned(),
                })
            }
            Err(error) if error.code() == ErrorCode::Conflict => {
                info!(
                    user_id = %user_id,
                    intent,
                    reason = error.message(),
                    "settings change conflicts"
                );
                Ok(ActionOutcome::Conflicted {
                    intent: intent.to_owned(),
                    message: error.message().to_owned(),
                })
            }
            Err(error) => Err(error),
        }
    }
}
