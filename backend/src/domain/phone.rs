//! Phone number normalisation and masking.
//!
//! Numbers are keyed in E.164-ish form: punctuation is dropped, a leading
//! `+` survives, and bare ten-digit (or `1`-prefixed eleven-digit) numbers
//! gain the US country code.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A normalised phone number.
///
/// # Examples
/// ```
/// use yardline::domain::PhoneNumber;
///
/// let phone = PhoneNumber::normalize("(515) 555-0142").unwrap();
/// assert_eq!(phone.as_str(), "+15155550142");
/// assert_eq!(phone.masked(), "+15***42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalise free-form input. Returns `None` when nothing dialable remains.
    #[must_use]
    pub fn normalize(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let leading_plus = trimmed.starts_with('+');
        let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return None;
        }
        let normalised = match digits.len() {
            10 => format!("+1{digits}"),
            11 if digits.starts_with('1') => format!("+{digits}"),
            _ if leading_plus => format!("+{digits}"),
            _ => digits,
        };
        Some(Self(normalised))
    }

    /// Wrap an already-normalised value read back from storage.
    #[must_use]
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the normalised text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Character count of the normalised form.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    /// Whether the number is empty (never true for normalised values).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First three and last two characters with `***` between them.
    #[must_use]
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        let head: String = chars.iter().take(3).collect();
        let tail: String = chars.iter().skip(chars.len().saturating_sub(2)).collect();
        format!("{head}***{tail}")
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
