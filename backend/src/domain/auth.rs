//! Authentication primitives such as submitted passwords.

use std::fmt;

use serde::{Deserialize, Deserializer};
use zeroize::Zeroizing;

/// Password-like value that is wiped from memory on drop.
///
/// `Debug` output is redacted so secrets never reach logs.
///
/// # Examples
/// ```
/// use account_settings::domain::Secret;
///
/// let secret = Secret::new("Abcd1234");
/// assert_eq!(secret.expose(), "Abcd1234");
/// assert_eq!(format!("{secret:?}"), "Secret(\"***\")");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Zeroizing<String>);

impl Secret {
    /// Wrap a raw secret.
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Borrow the raw secret. Keep the borrow short-lived.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Secret").field(&"***").finish()
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn debug_output_is_redacted() {
        let rendered = format!("{:?}", Secret::new("hunter22"));
        assert!(!rendered.contains("hunter22"));
    }

    #[rstest]
    fn deserialises_from_json_strings() {
        let secret: Secret = serde_json::from_str("\"  spaced  \"").expect("secret");
        assert_eq!(secret.expose(), "  spaced  ");
    }
}
