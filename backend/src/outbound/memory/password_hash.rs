//! Argon2id password hashing for stored credentials.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::domain::Secret;
use crate::domain::ports::AccountUpdateError;

/// Hashes and verifies passwords with Argon2id.
#[derive(Clone, Default)]
pub struct PasswordHashing {
    argon2: Argon2<'static>,
}

impl PasswordHashing {
    /// Hashing with custom cost parameters.
    ///
    /// # Errors
    /// Returns [`AccountUpdateError::Unavailable`] when argon2 rejects the
    /// parameters.
    pub fn with_costs(memory_kib: u32, iterations: u32) -> Result<Self, AccountUpdateError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|err| AccountUpdateError::unavailable(format!("argon2 parameters: {err}")))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash `password` with a fresh random salt.
    ///
    /// # Errors
    /// Returns [`AccountUpdateError::Unavailable`] when hashing fails.
    pub fn hash(&self, password: &Secret) -> Result<String, AccountUpdateError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.expose().as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| AccountUpdateError::unavailable(format!("password hashing failed: {err}")))
    }

    /// Return `true` when `password` matches the PHC-format `hash`.
    ///
    /// Malformed hashes never verify.
    pub fn verify(&self, password: &Secret, hash: &str) -> bool {
        PasswordHash::new(hash).is_ok_and(|parsed| {
            self.argon2
                .verify_password(password.expose().as_bytes(), &parsed)
                .is_ok()
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hashing() -> PasswordHashing {
        PasswordHashing::with_costs(64, 1).expect("cheap test parameters")
    }

    #[rstest]
    fn hashes_verify_only_the_original_password(hashing: PasswordHashing) {
        let hash = hashing.hash(&Secret::new("Abcd1234")).expect("hash");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hashing.verify(&Secret::new("Abcd1234"), &hash));
        assert!(!hashing.verify(&Secret::new("Abcd12345"), &hash));
    }

    #[rstest]
    fn salts_differ_between_hashes(hashing: PasswordHashing) {
        let first = hashing.hash(&Secret::new("Abcd1234")).expect("hash");
        let second = hashing.hash(&Secret::new("Abcd1234")).expect("hash");
        assert_ne!(first, second);
    }

    #[rstest]
    fn malformed_hashes_never_verify(hashing: PasswordHashing) {
        assert!(!hashing.verify(&Secret::new("Abcd1234"), "not-a-phc-string"));
    }

    #[rstest]
    fn rejects_impossible_parameters() {
        assert!(PasswordHashing::with_costs(0, 0).is_err());
    }
}
