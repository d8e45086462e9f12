//! Password hashing and verification.
//!
//! Uses Argon2id. The salt and cost parameters are embedded in the PHC
//! string, so verification always uses the parameters the hash was made with.

use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand_core::OsRng;
use thiserror::Error;

use crate::config::PasswordConfig;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum password length in characters.
pub const MAX_PASSWORD_LENGTH: usize = 100;

/// Password-related errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Password is too short.
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,

    /// Password is too long.
    #[error("password must be at most {MAX_PASSWORD_LENGTH} characters")]
    TooLong,

    /// The configured cost parameters are rejected by Argon2.
    #[error("invalid argon2 parameters: {0}")]
    InvalidParams(String),

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    HashError(String),
}

/// Outcome of checking a password against a stored hash.
///
/// A wrong password is an ordinary outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordCheck {
    /// The password matches.
    Match,
    /// The hash is well formed but the password does not match.
    Mismatch,
    /// The stored value is not a usable Argon2 hash.
    MalformedHash,
}

impl PasswordCheck {
    /// True only for [`PasswordCheck::Match`].
    pub fn is_match(&self) -> bool {
        matches!(self, PasswordCheck::Match)
    }
}

/// Argon2id hasher with fixed cost parameters.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Create a hasher from configuration.
    pub fn new(config: &PasswordConfig) -> Result<Self, PasswordError> {
        let params = Params::new(
            config.memory_cost_kib,
            config.time_cost,
            config.parallelism,
            None,
        )
        .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password.
    ///
    /// Returns a PHC-formatted string that includes the salt and parameters.
    /// Failures are reported as errors; no placeholder hash is ever returned.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        validate_password(password)?;

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashError(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash in constant time.
    pub fn verify(&self, hash: &str, password: &str) -> PasswordCheck {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(_) => return PasswordCheck::MalformedHash,
        };

        // Parameters come from the parsed hash, not from self.params
        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => PasswordCheck::Match,
            Err(argon2::password_hash::Error::Password) => PasswordCheck::Mismatch,
            Err(_) => PasswordCheck::MalformedHash,
        }
    }
}

/// Validate password length (6-100 characters).
///
/// # Examples
///
/// ```
/// use storefront_auth::auth::validate_password;
///
/// assert!(validate_password("short").is_err());
/// assert!(validate_password("secret1").is_ok());
/// ```
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::TooLong);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::new(&PasswordConfig {
            memory_cost_kib: 1024,
            time_cost: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_is_phc_argon2id() {
        let hash = fast_hasher().hash("secret1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("$v=19$"));
        assert!(!hash.contains("secret1"));
    }

    #[test]
    fn test_same_password_different_hashes() {
        let hasher = fast_hasher();
        let hash1 = hasher.hash("same_password").unwrap();
        let hash2 = hasher.hash("same_password").unwrap();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_match() {
        let hasher = fast_hasher();
        let hash = hasher.hash("correct_password").unwrap();
        assert_eq!(hasher.verify(&hash, "correct_password"), PasswordCheck::Match);
        assert!(hasher.verify(&hash, "correct_password").is_match());
    }

    #[test]
    fn test_verify_mismatch() {
        let hasher = fast_hasher();
        let hash = hasher.hash("correct_password").unwrap();
        assert_eq!(hasher.verify(&hash, "wrong_password"), PasswordCheck::Mismatch);
        assert_eq!(hasher.verify(&hash, "correct_passwor"), PasswordCheck::Mismatch);
        assert!(!hasher.verify(&hash, "wrong_password").is_match());
    }

    #[test]
    fn test_verify_malformed_hash() {
        let hasher = fast_hasher();
        assert_eq!(
            hasher.verify("not_a_valid_hash", "any_password"),
            PasswordCheck::MalformedHash
        );
        assert_eq!(hasher.verify("", "any_password"), PasswordCheck::MalformedHash);
    }

    #[test]
    fn test_verify_uses_embedded_params() {
        let weak = fast_hasher();
        let hash = weak.hash("secret1").unwrap();

        let other = PasswordHasher::new(&PasswordConfig {
            memory_cost_kib: 2048,
            time_cost: 2,
            parallelism: 1,
        })
        .unwrap();
        assert!(other.verify(&hash, "secret1").is_match());
    }

    #[test]
    fn test_configured_params_in_hash() {
        let hash = fast_hasher().hash("test_password").unwrap();
        assert!(hash.contains("m=1024"));
        assert!(hash.contains("t=1"));
        assert!(hash.contains("p=1"));
    }

    #[test]
    fn test_invalid_params() {
        let result = PasswordHasher::new(&PasswordConfig {
            memory_cost_kib: 1,
            time_cost: 0,
            parallelism: 1,
        });
        assert!(matches!(result, Err(PasswordError::InvalidParams(_))));
    }

    #[test]
    fn test_validate_password_bounds() {
        assert!(matches!(validate_password("12345"), Err(PasswordError::TooShort)));
        assert!(validate_password("123456").is_ok());
        assert!(validate_password(&"a".repeat(100)).is_ok());
        assert!(matches!(
            validate_password(&"a".repeat(101)),
            Err(PasswordError::TooLong)
        ));
    }

    #[test]
    fn test_validate_password_counts_chars_not_bytes() {
        // 6 characters, 18 bytes
        assert!(validate_password("パスワード1").is_ok());
    }

    #[test]
    fn test_hash_rejects_out_of_range() {
        let hasher = fast_hasher();
        assert!(matches!(hasher.hash("short"), Err(PasswordError::TooShort)));
        assert!(matches!(
            hasher.hash(&"a".repeat(101)),
            Err(PasswordError::TooLong)
        ));
    }

    #[test]
    fn test_password_with_special_chars() {
        let hasher = fast_hasher();
        let password = "p@$$w0rd!#$%^&*()";
        let hash = hasher.hash(password).unwrap();
        assert!(hasher.verify(&hash, password).is_match());
    }

    #[test]
    fn test_password_error_display() {
        assert_eq!(
            PasswordError::TooShort.to_string(),
            "password must be at least 6 characters"
        );
        assert_eq!(
            PasswordError::TooLong.to_string(),
            "password must be at most 100 characters"
        );
    }
}
