//! Application configuration loaded via OrthoConfig.

use std::net::SocketAddr;
use std::time::Duration;

use account_settings::domain::FixedDelay;
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Values controlling the listener, the settings action delay and demo data.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ACCOUNT_SETTINGS")]
pub struct AppConfig {
    /// Interface to bind.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// Pause applied before every settings action, in milliseconds.
    pub action_delay_ms: Option<u64>,
    /// Seed the in-memory store with the demo account on startup.
    #[ortho_config(default = false)]
    pub seed_demo_account: bool,
}

impl AppConfig {
    /// Return the configured host, falling back to all interfaces.
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// Return the configured port, falling back to 8080.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Return the settings action delay.
    pub fn action_delay(&self) -> Duration {
        self.action_delay_ms
            .map_or(FixedDelay::DEFAULT, Duration::from_millis)
    }

    /// Resolve the listener address.
    ///
    /// # Errors
    /// Returns [`std::io::Error`] when the host is not an IP address.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let ip = self.host().parse().map_err(|error| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid ACCOUNT_SETTINGS_HOST '{}': {error}", self.host()),
            )
        })?;
        Ok(SocketAddr::new(ip, self.port()))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for application configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 4] = [
        "ACCOUNT_SETTINGS_HOST",
        "ACCOUNT_SETTINGS_PORT",
        "ACCOUNT_SETTINGS_ACTION_DELAY_MS",
        "ACCOUNT_SETTINGS_SEED_DEMO_ACCOUNT",
    ];

    fn load_from_empty_args() -> AppConfig {
        AppConfig::load_from_iter([OsString::from("account-settings")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let config = load_from_empty_args();
        assert_eq!(config.host(), DEFAULT_HOST);
        assert_eq!(config.port(), DEFAULT_PORT);
        assert_eq!(config.action_delay(), Duration::from_millis(500));
        assert!(!config.seed_demo_account);
        assert_eq!(
            config.bind_addr().expect("default address"),
            SocketAddr::from(([0, 0, 0, 0], 8080))
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("ACCOUNT_SETTINGS_HOST", Some("127.0.0.1".to_owned())),
            ("ACCOUNT_SETTINGS_PORT", Some("9090".to_owned())),
            ("ACCOUNT_SETTINGS_ACTION_DELAY_MS", Some("0".to_owned())),
            ("ACCOUNT_SETTINGS_SEED_DEMO_ACCOUNT", Some("true".to_owned())),
        ]);

        let config = load_from_empty_args();
        assert_eq!(config.port(), 9090);
        assert_eq!(config.action_delay(), Duration::ZERO);
        assert!(config.seed_demo_account);
        assert_eq!(
            config.bind_addr().expect("loopback address"),
            SocketAddr::from(([127, 0, 0, 1], 9090))
        );
    }

    #[rstest]
    fn hostnames_are_rejected_as_bind_addresses() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));
        let mut config = load_from_empty_args();
        config.host = Some("localhost".to_owned());

        let error = config.bind_addr().expect_err("hostnames are not resolved");
        assert_eq!(error.kind(), std::io::ErrorKind::InvalidInput);
    }
}
