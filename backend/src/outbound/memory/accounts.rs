//! Account store kept in process memory.
//!
//! The map is guarded by a [`RwLock`] held only for a synchronous read or
//! write; password hashing and verification happen outside the lock.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::{debug, info};

use super::password_hash::PasswordHashing;
use crate::domain::ports::{
    AccountQuery, AccountUpdateError, LoginService, PasswordUpdateCommand, ProfileUpdateCommand,
};
use crate::domain::validation::{Link, PasswordChange, ProfileChange, SignIn, Tag};
use crate::domain::{AccountSummary, Error, Secret, UserId};

/// Email of the optional demo account.
pub const DEMO_EMAIL: &str = "demo@example.com";
/// Password of the optional demo account.
pub const DEMO_PASSWORD: &str = "Demo1234";

const USER_NOT_FOUND: &str = "User not found";
const WRONG_PASSWORD: &str = "Current password is incorrect";
const USERNAME_TAKEN: &str = "Username is already taken";
const EMAIL_TAKEN: &str = "Email is already taken";
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Account created through [`InMemoryAccounts::register`].
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub name: String,
    pub password: Option<Secret>,
}

/// Snapshot of a stored profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountProfile {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub name: String,
    pub nick: String,
    pub mode_name: String,
    pub headline: String,
    pub bio: Option<String>,
    pub links: Vec<Link>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone)]
struct StoredAccount {
    profile: AccountProfile,
    password_hash: Option<String>,
}

/// In-memory adapter for every account port.
#[derive(Default)]
pub struct InMemoryAccounts {
    accounts: RwLock<HashMap<UserId, StoredAccount>>,
    hashing: PasswordHashing,
}

impl InMemoryAccounts {
    /// Empty store hashing with default Argon2id costs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store hashing with `hashing`.
    pub fn with_hashing(hashing: PasswordHashing) -> Self {
        Self {
            accounts: RwLock::default(),
            hashing,
        }
    }

    /// Store holding the demo account.
    ///
    /// # Errors
    /// Returns [`AccountUpdateError::Unavailable`] when hashing fails.
    pub fn with_demo_account() -> Result<Self, AccountUpdateError> {
        let store = Self::new();
        let id = store.register(NewAccount {
            email: DEMO_EMAIL.to_owned(),
            username: "demo".to_owned(),
            name: "Demo User".to_owned(),
            password: Some(Secret::new(DEMO_PASSWORD)),
        })?;
        info!(user_id = %id, email = DEMO_EMAIL, "seeded demo account");
        Ok(store)
    }

    /// Add an account and return its new id.
    ///
    /// # Errors
    /// Returns [`AccountUpdateError::Taken`] when the username or email is
    /// taken, or [`AccountUpdateError::Unavailable`] when hashing fails or the
    /// store is poisoned.
    pub fn register(&self, account: NewAccount) -> Result<UserId, AccountUpdateError> {
        let NewAccount {
            email,
            username,
            name,
            password,
        } = account;
        let password_hash = password
            .map(|password| self.hashing.hash(&password))
            .transpose()?;
        let id = UserId::random();

        let mut accounts = self.write()?;
        if find_by(&accounts, |profile| same_text(&profile.username, &username)).is_some() {
            return Err(AccountUpdateError::taken(USERNAME_TAKEN));
        }
        if find_by(&accounts, |profile| same_text(&profile.email, &email)).is_some() {
            return Err(AccountUpdateError::taken(EMAIL_TAKEN));
        }
        accounts.insert(
            id.clone(),
            StoredAccount {
                profile: AccountProfile {
                    id: id.clone(),
                    email,
                    username,
                    name,
                    nick: String::new(),
                    mode_name: String::new(),
                    headline: String::new(),
                    bio: None,
                    links: Vec::new(),
                    tags: Vec::new(),
                },
                password_hash,
            },
        );
        Ok(id)
    }

    /// Current profile of `user_id`.
    ///
    /// # Errors
    /// Returns [`AccountUpdateError::Unavailable`] when the store is poisoned.
    pub fn profile(&self, user_id: &UserId) -> Result<Option<AccountProfile>, AccountUpdateError> {
        Ok(self
            .read()?
            .get(user_id)
            .map(|account| account.profile.clone()))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<UserId, StoredAccount>>, AccountUpdateError> {
        self.accounts.read().map_err(poisoned)
    }

    fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<UserId, StoredAccount>>, AccountUpdateError> {
        self.accounts.write().map_err(poisoned)
    }

    fn password_hash(&self, user_id: &UserId) -> Result<Option<String>, AccountUpdateError> {
        let accounts = self.read()?;
        let account = accounts
            .get(user_id)
            .ok_or_else(|| AccountUpdateError::rejected(USER_NOT_FOUND))?;
        Ok(account.password_hash.clone())
    }
}

fn poisoned<T>(_: PoisonError<T>) -> AccountUpdateError {
    AccountUpdateError::unavailable("account lock poisoned")
}

fn same_text(stored: &str, candidate: &str) -> bool {
    stored.eq_ignore_ascii_case(candidate)
}

fn find_by<'a>(
    accounts: &'a HashMap<UserId, StoredAccount>,
    predicate: impl Fn(&AccountProfile) -> bool,
) -> Option<&'a StoredAccount> {
    accounts
        .values()
        .find(|account| predicate(&account.profile))
}

fn ensure_unclaimed(
    accounts: &HashMap<UserId, StoredAccount>,
    user_id: &UserId,
    predicate: impl Fn(&AccountProfile) -> bool,
    message: &str,
) -> Result<(), AccountUpdateError> {
    match find_by(accounts, predicate) {
        Some(other) if &other.profile.id != user_id => Err(AccountUpdateError::taken(message)),
        _ => Ok(()),
    }
}

fn apply_change(profile: &mut AccountProfile, change: &ProfileChange) {
    match change {
        ProfileChange::Username(username) => profile.username.clone_from(username),
        ProfileChange::Name(name) => profile.name.clone_from(name),
        ProfileChange::Nick(nick) => profile.nick.clone_from(nick),
        ProfileChange::Email(email) => profile.email.clone_from(email),
        ProfileChange::Tags(tags) => profile.tags.clone_from(tags),
        ProfileChange::ModeName(mode_name) => profile.mode_name.clone_from(mode_name),
        ProfileChange::Headline(headline) => profile.headline.clone_from(headline),
        ProfileChange::Bio(bio) => profile.bio.clone_from(bio),
        ProfileChange::Links(links) => profile.links.clone_from(links),
    }
}

#[async_trait]
impl LoginService for InMemoryAccounts {
    async fn authenticate(&self, credentials: &SignIn) -> Result<UserId, Error> {
        let candidate = {
            let accounts = self.read()?;
            find_by(&accounts, |profile| same_text(&profile.email, &credentials.email))
                .and_then(|account| {
                    account
                        .password_hash
                        .clone()
                        .map(|hash| (account.profile.id.clone(), hash))
                })
        };

        match candidate {
            Some((id, hash)) if self.hashing.verify(&credentials.password, &hash) => Ok(id),
            _ => {
                debug!("sign-in rejected");
                Err(Error::unauthorized(INVALID_CREDENTIALS))
            }
        }
    }
}

#[async_trait]
impl AccountQuery for InMemoryAccounts {
    async fn account(&self, user_id: &UserId) -> Result<AccountSummary, Error> {
        let accounts = self.read()?;
        accounts
            .get(user_id)
            .map(|account| AccountSummary::new(user_id.clone(), account.password_hash.is_some()))
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND))
    }
}

#[async_trait]
impl PasswordUpdateCommand for InMemoryAccounts {
    async fn update_password(&self, change: &PasswordChange) -> Result<(), AccountUpdateError> {
        let current = self.password_hash(&change.id)?;
        let verified = current.is_some_and(|hash| self.hashing.verify(&change.current_password, &hash));
        if !verified {
            return Err(AccountUpdateError::rejected(WRONG_PASSWORD));
        }

        let replacement = self.hashing.hash(&change.password)?;
        let mut accounts = self.write()?;
        let account = accounts
            .get_mut(&change.id)
            .ok_or_else(|| AccountUpdateError::rejected(USER_NOT_FOUND))?;
        account.password_hash = Some(replacement);
        Ok(())
    }
}

#[async_trait]
impl ProfileUpdateCommand for InMemoryAccounts {
    async fn apply(&self, user_id: &UserId, change: &ProfileChange) -> Result<(), AccountUpdateError> {
        let mut accounts = self.write()?;
        match change {
            ProfileChange::Username(username) => ensure_unclaimed(
                &accounts,
                user_id,
                |profile| same_text(&profile.username, username),
                USERNAME_TAKEN,
            )?,
            ProfileChange::Email(email) => ensure_unclaimed(
                &accounts,
                user_id,
                |profile| same_text(&profile.email, email),
                EMAIL_TAKEN,
            )?,
            _ => {}
        }

        let account = accounts
            .get_mut(user_id)
            .ok_or_else(|| AccountUpdateError::rejected(USER_NOT_FOUND))?;
        apply_change(&mut account.profile, change);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::{fixture, rstest};

    struct Seeded {
        store: InMemoryAccounts,
        ada: UserId,
        grace: UserId,
    }

    fn account(email: &str, username: &str, password: &str) -> NewAccount {
        NewAccount {
            email: email.to_owned(),
            username: username.to_owned(),
            name: username.to_owned(),
            password: Some(Secret::new(password)),
        }
    }

    #[fixture]
    fn seeded() -> Seeded {
        let hashing = PasswordHashing::with_costs(64, 1).expect("cheap test parameters");
        let store = InMemoryAccounts::with_hashing(hashing);
        let ada = store
            .register(account("ada@example.com", "ada", "Abcd1234"))
            .expect("register ada");
        let grace = store
            .register(account("grace@example.com", "grace", "Hopper99"))
            .expect("register grace");
        Seeded { store, ada, grace }
    }

    fn sign_in(email: &str, password: &str) -> SignIn {
        SignIn {
            email: email.to_owned(),
            password: Secret::new(password),
            remember: None,
            redirect_to: None,
        }
    }

    fn password_change(id: &UserId, current: &str, password: &str) -> PasswordChange {
        PasswordChange {
            id: id.clone(),
            current_password: Secret::new(current),
            password: Secret::new(password),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn authenticates_with_matching_credentials(seeded: Seeded) {
        let id = seeded
            .store
            .authenticate(&sign_in("ADA@example.com", "Abcd1234"))
            .await
            .expect("valid credentials");
        assert_eq!(id, seeded.ada);
    }

    #[rstest]
    #[case("ada@example.com", "wrong-pass")]
    #[case("nobody@example.com", "Abcd1234")]
    #[tokio::test]
    async fn rejects_bad_credentials(seeded: Seeded, #[case] email: &str, #[case] password: &str) {
        let error = seeded
            .store
            .authenticate(&sign_in(email, password))
            .await
            .expect_err("bad credentials");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn password_changes_require_the_current_password(seeded: Seeded) {
        let error = seeded
            .store
            .update_password(&password_change(&seeded.ada, "nope", "Newpass123"))
            .await
            .expect_err("wrong current password");
        assert_eq!(error, AccountUpdateError::rejected(WRONG_PASSWORD));

        seeded
            .store
            .update_password(&password_change(&seeded.ada, "Abcd1234", "Newpass123"))
            .await
            .expect("password changed");
        let id = seeded
            .store
            .authenticate(&sign_in("ada@example.com", "Newpass123"))
            .await
            .expect("new password works");
        assert_eq!(id, seeded.ada);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_accounts_are_rejected(seeded: Seeded) {
        let ghost = UserId::new("ghost").expect("fixture id");
        let error = seeded
            .store
            .update_password(&password_change(&ghost, "Abcd1234", "Newpass123"))
            .await
            .expect_err("unknown user");
        assert_eq!(error, AccountUpdateError::rejected(USER_NOT_FOUND));

        let missing = seeded.store.account(&ghost).await.expect_err("unknown user");
        assert_eq!(missing.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn taken_usernames_are_rejected(seeded: Seeded) {
        let error = seeded
            .store
            .apply(&seeded.ada, &ProfileChange::Username("Grace".to_owned()))
            .await
            .expect_err("username belongs to grace");
        assert_eq!(error, AccountUpdateError::taken(USERNAME_TAKEN));
    }

    #[rstest]
    #[tokio::test]
    async fn keeping_your_own_username_is_allowed(seeded: Seeded) {
        seeded
            .store
            .apply(&seeded.grace, &ProfileChange::Username("GRACE".to_owned()))
            .await
            .expect("own username");
        let profile = seeded
            .store
            .profile(&seeded.grace)
            .expect("store readable")
            .expect("grace exists");
        assert_eq!(profile.username, "GRACE");
    }

    #[rstest]
    #[tokio::test]
    async fn profile_changes_are_stored(seeded: Seeded) {
        let links = vec![Link {
            url: "https://example.com".to_owned(),
            text: None,
        }];
        seeded
            .store
            .apply(&seeded.ada, &ProfileChange::Links(links.clone()))
            .await
            .expect("links stored");
        seeded
            .store
            .apply(&seeded.ada, &ProfileChange::Bio(Some("Analyst".to_owned())))
            .await
            .expect("bio stored");

        let profile = seeded
            .store
            .profile(&seeded.ada)
            .expect("store readable")
            .expect("ada exists");
        assert_eq!(profile.links, links);
        assert_eq!(profile.bio.as_deref(), Some("Analyst"));
    }

    #[rstest]
    #[tokio::test]
    async fn summaries_report_password_presence(seeded: Seeded) {
        let summary = seeded.store.account(&seeded.ada).await.expect("summary");
        assert!(summary.has_password());

        let passwordless = seeded
            .store
            .register(NewAccount {
                password: None,
                ..account("sso@example.com", "sso_user", "")
            })
            .expect("register");
        let summary = seeded.store.account(&passwordless).await.expect("summary");
        assert!(!summary.has_password());
    }

    #[rstest]
    fn duplicate_registrations_are_rejected(seeded: Seeded) {
        let error = seeded
            .store
            .register(account("ADA@example.com", "someone", "Abcd1234"))
            .expect_err("email taken");
        assert_eq!(error, AccountUpdateError::taken(EMAIL_TAKEN));
    }
}
