//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountQuery, LoginService, PasswordUpdateCommand, ProfileUpdateCommand};
use crate::domain::{DelayPolicy, IntentRegistry, SettingsActionDispatcher};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountQuery>,
    pub passwords: Arc<dyn PasswordUpdateCommand>,
    pub profiles: Arc<dyn ProfileUpdateCommand>,
}

impl HttpStatePorts {
    /// Bundle one adapter that implements every account port.
    pub fn from_adapter<A>(adapter: Arc<A>) -> Self
    where
        A: LoginService + AccountQuery + PasswordUpdateCommand + ProfileUpdateCommand + 'static,
    {
        Self {
            login: Arc::clone(&adapter) as Arc<dyn LoginService>,
            accounts: Arc::clone(&adapter) as Arc<dyn AccountQuery>,
            passwords: Arc::clone(&adapter) as Arc<dyn PasswordUpdateCommand>,
            profiles: adapter,
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountQuery>,
    pub password_settings: Arc<SettingsActionDispatcher>,
    pub profile_settings: Arc<SettingsActionDispatcher>,
}

impl HttpState {
    /// Construct state from a ports bundle and the delay applied to every
    /// settings action.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use account_settings::domain::NoDelay;
    /// use account_settings::inbound::http::state::{HttpState, HttpStatePorts};
    /// use account_settings::outbound::memory::InMemoryAccounts;
    ///
    /// let ports = HttpStatePorts::from_adapter(Arc::new(InMemoryAccounts::new()));
    /// let state = HttpState::new(ports, Arc::new(NoDelay));
    /// assert!(state.password_settings.intents().get("update-password").is_some());
    /// ```
    pub fn new(ports: HttpStatePorts, delay: Arc<dyn DelayPolicy>) -> Self {
        let HttpStatePorts {
            login,
            accounts,
            passwords,
            profiles,
        } = ports;
        Self {
            login,
            accounts,
            password_settings: Arc::new(SettingsActionDispatcher::new(
                Arc::clone(&delay),
                IntentRegistry::password_settings(passwords),
            )),
            profile_settings: Arc::new(SettingsActionDispatcher::new(
                delay,
                IntentRegistry::profile_settings(profiles),
            )),
        }
    }
}
