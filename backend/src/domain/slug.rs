//! Slugs for broadcast-like entities.
//!
//! Slugs are trimmed, non-empty identifiers composed of lowercase ASCII
//! letters, digits, and hyphens. Generated slugs join a normalised title and
//! a short random suffix; uniqueness is probabilistic.

use std::cell::RefCell;
use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Length of the random suffix appended to generated slugs.
pub const SLUG_SUFFIX_LEN: usize = 10;

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

thread_local! {
    static SUFFIX_RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_entropy());
}

/// Return `true` when `value` is a valid slug.
pub fn is_valid_slug(value: &str) -> bool {
    is_trimmed_non_empty(value) && has_allowed_slug_chars(value)
}

fn is_trimmed_non_empty(value: &str) -> bool {
    !value.is_empty() && value.trim() == value
}

fn has_allowed_slug_chars(value: &str) -> bool {
    value
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

/// Lowercase `title` and collapse every run of other characters to `-`.
///
/// Only ASCII letters and digits survive; the result has no leading or
/// trailing hyphen and may be empty.
///
/// # Examples
/// ```
/// use account_settings::domain::slug::normalize_title;
///
/// assert_eq!(normalize_title("  Hello,  World! "), "hello-world");
/// assert_eq!(normalize_title("???"), "");
/// ```
pub fn normalize_title(title: &str) -> String {
    let mut normalized = String::with_capacity(title.len());
    let mut pending_separator = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !normalized.is_empty() {
                normalized.push('-');
            }
            pending_separator = false;
            normalized.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    normalized
}

/// Immutable slug value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct Slug(String);

impl Slug {
    /// Generate a slug for `title` using a thread-local fast random source.
    ///
    /// # Examples
    /// ```
    /// use account_settings::domain::slug::Slug;
    ///
    /// let slug = Slug::generate("Hello World!");
    /// assert!(slug.as_str().starts_with("hello-world-"));
    /// ```
    pub fn generate(title: &str) -> Self {
        SUFFIX_RNG.with(|rng| Self::generate_with(title, &mut *rng.borrow_mut()))
    }

    /// Generate a slug for `title`, drawing the suffix from `rng`.
    pub fn generate_with<R: Rng + ?Sized>(title: &str, rng: &mut R) -> Self {
        let suffix = random_suffix(rng);
        let base = normalize_title(title);
        if base.is_empty() {
            Self(suffix)
        } else {
            Self(format!("{base}-{suffix}"))
        }
    }

    /// Borrow the slug text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Generate a slug for `title`. See [`Slug::generate`].
pub fn make_slug(title: &str) -> Slug {
    Slug::generate(title)
}

fn random_suffix<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SLUG_SUFFIX_LEN)
        .map(|_| {
            let position = rng.gen_range(0..SUFFIX_ALPHABET.len());
            SUFFIX_ALPHABET
                .get(position)
                .copied()
                .map_or('0', char::from)
        })
        .collect()
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}
