//! Unit tests for session configuration parsing.

use std::collections::HashMap;

use mockable::MockEnv;
use rstest::rstest;
use uuid::Uuid;

use super::*;

struct TempKeyFile {
    path: PathBuf,
}

impl TempKeyFile {
    fn new(len: usize) -> Self {
        let path = std::env::temp_dir().join(format!("session-key-{}", Uuid::new_v4()));
        std::fs::write(&path, vec![b'k'; len]).expect("write temporary key");
        Self { path }
    }

    fn path_string(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl Drop for TempKeyFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn mock_env(vars: &[(&str, String)]) -> MockEnv {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(name, value)| ((*name).to_owned(), value.clone()))
        .collect();
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

fn release_env(key_file: &TempKeyFile) -> Vec<(&'static str, String)> {
    vec![
        (KEY_FILE_ENV, key_file.path_string()),
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ]
}

fn with_override(
    mut vars: Vec<(&'static str, String)>,
    name: &'static str,
    value: Option<&str>,
) -> Vec<(&'static str, String)> {
    vars.retain(|(existing, _)| *existing != name);
    if let Some(value) = value {
        vars.push((name, value.to_owned()));
    }
    vars
}

#[rstest]
fn release_accepts_a_complete_configuration() {
    let key_file = TempKeyFile::new(SESSION_KEY_MIN_LEN);
    let env = mock_env(&release_env(&key_file));

    let settings =
        session_settings_from_env(&env, BuildMode::Release).expect("complete release config");
    assert!(settings.cookie_secure);
}

#[rstest]
#[case(COOKIE_SECURE_ENV)]
#[case(ALLOW_EPHEMERAL_ENV)]
fn release_rejects_missing_toggles(#[case] name: &'static str) {
    let key_file = TempKeyFile::new(SESSION_KEY_MIN_LEN);
    let env = mock_env(&with_override(release_env(&key_file), name, None));

    let Err(error) = session_settings_from_env(&env, BuildMode::Release) else {
        panic!("missing {name} must be rejected");
    };
    assert!(matches!(error, SessionConfigError::MissingEnv { name: missing } if missing == name));
}

#[rstest]
#[case("maybe")]
#[case("")]
fn release_rejects_malformed_cookie_secure(#[case] value: &str) {
    let key_file = TempKeyFile::new(SESSION_KEY_MIN_LEN);
    let env = mock_env(&with_override(
        release_env(&key_file),
        COOKIE_SECURE_ENV,
        Some(value),
    ));

    let Err(error) = session_settings_from_env(&env, BuildMode::Release) else {
        panic!("malformed toggle must be rejected");
    };
    assert!(matches!(
        error,
        SessionConfigError::InvalidEnv {
            name: COOKIE_SECURE_ENV,
            ..
        }
    ));
}

#[rstest]
fn release_rejects_ephemeral_keys() {
    let key_file = TempKeyFile::new(SESSION_KEY_MIN_LEN);
    let env = mock_env(&with_override(
        release_env(&key_file),
        ALLOW_EPHEMERAL_ENV,
        Some("1"),
    ));

    let Err(error) = session_settings_from_env(&env, BuildMode::Release) else {
        panic!("ephemeral keys are debug-only");
    };
    assert!(matches!(error, SessionConfigError::EphemeralNotAllowed));
}

#[rstest]
fn release_rejects_short_keys() {
    let key_file = TempKeyFile::new(SESSION_KEY_MIN_LEN - 1);
    let env = mock_env(&release_env(&key_file));

    let Err(error) = session_settings_from_env(&env, BuildMode::Release) else {
        panic!("short key must be rejected");
    };
    assert!(matches!(
        error,
        SessionConfigError::KeyTooShort {
            length,
            min_len: SESSION_KEY_MIN_LEN,
            ..
        } if length == SESSION_KEY_MIN_LEN - 1
    ));
}

#[rstest]
fn release_requires_a_readable_key() {
    let env = mock_env(&[
        (KEY_FILE_ENV, "/nonexistent/session_key".to_owned()),
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ]);

    let Err(error) = session_settings_from_env(&env, BuildMode::Release) else {
        panic!("missing key file must be rejected");
    };
    assert!(matches!(error, SessionConfigError::KeyRead { .. }));
}

#[rstest]
fn debug_defaults_to_secure_cookies_and_a_temporary_key() {
    let env = mock_env(&[(KEY_FILE_ENV, "/nonexistent/session_key".to_owned())]);

    let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
    assert!(settings.cookie_secure);
}

#[rstest]
#[case("0", false)]
#[case("no", false)]
#[case("TRUE", true)]
#[case("garbage", true)]
fn debug_parses_cookie_secure(#[case] value: &str, #[case] expected: bool) {
    let env = mock_env(&[
        (KEY_FILE_ENV, "/nonexistent/session_key".to_owned()),
        (COOKIE_SECURE_ENV, value.to_owned()),
    ]);

    let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug config");
    assert_eq!(settings.cookie_secure, expected);
}

#[rstest]
fn debug_still_rejects_keys_too_short_to_derive_from() {
    let key_file = TempKeyFile::new(SESSION_KEY_DEBUG_MIN_LEN - 1);
    let env = mock_env(&[(KEY_FILE_ENV, key_file.path_string())]);

    assert!(matches!(
        session_settings_from_env(&env, BuildMode::Debug),
        Err(SessionConfigError::KeyTooShort { .. })
    ));
}
