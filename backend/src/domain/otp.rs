//! One-time login codes.
//!
//! Codes are six ASCII digits. Only their SHA-256 digest is stored.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

use super::phone::PhoneNumber;

/// Digits in a login code.
pub const OTP_CODE_LEN: usize = 6;
/// Verification attempts allowed per code.
pub const OTP_MAX_ATTEMPTS: u32 = 5;

/// How long a code stays valid.
#[must_use]
pub fn otp_lifetime() -> Duration {
    Duration::minutes(5)
}

/// Hex SHA-256 digest of a code.
#[must_use]
pub fn hash_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}

/// Whether `code` has the shape of a login code.
#[must_use]
pub fn is_well_formed(code: &str) -> bool {
    code.len() == OTP_CODE_LEN && code.bytes().all(|b| b.is_ascii_digit())
}

/// A code about to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOtpCode {
    /// Phone the code was sent to.
    pub phone: PhoneNumber,
    /// Hex digest of the code.
    pub code_hash: String,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
    /// Attempts allowed.
    pub attempts_left: u32,
}

/// A stored, unconsumed, unexpired code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveOtpCode {
    /// Storage identifier.
    pub id: i64,
    /// Hex digest of the code.
    pub code_hash: String,
    /// Attempts remaining.
    pub attempts_left: u32,
}

impl ActiveOtpCode {
    /// Whether `candidate` hashes to the stored digest.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.code_hash == hash_code(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn hashes_are_hex_sha256() {
        assert_eq!(
            hash_code("123456"),
            "8d969eef6ecad3c29a3a629280e686cf0c3f5d5a86aff3ca12020c923adc6c92"
        );
    }

    #[rstest]
    #[case("123456", true)]
    #[case("12345", false)]
    #[case("12a456", false)]
    #[case("1234567", false)]
    fn code_shape(#[case] code: &str, #[case] expected: bool) {
        assert_eq!(is_well_formed(code), expected);
    }

    #[rstest]
    fn active_code_matches_only_its_digest() {
        let code = ActiveOtpCode {
            id: 1,
            code_hash: hash_code("424242"),
            attempts_left: 5,
        };
        assert!(code.matches("424242"));
        assert!(!code.matches("424243"));
    }
}
