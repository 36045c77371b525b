//! Email/password authentication.
//!
//! Argon2id hashing with per-password salts. Federated sign-in does not pass
//! through here; the callback handler upserts the account directly and both
//! paths converge on the same session identity.

mod error;

pub use error::AuthError;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use promptforge_core::Email;

use crate::db::AccountRepository;
use crate::models::Account;

/// Minimum accepted password length for registration.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Registration and sign-in over the account repository.
pub struct AuthService<'a> {
    repo: AccountRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a service over the given pool.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            repo: AccountRepository::new(pool),
        }
    }

    /// Register a new account with email and password.
    ///
    /// The display name defaults to the email's local part when blank. New
    /// accounts start on the free plan with the initial credit grant.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEmail`, `WeakPassword`, `EmailTaken`, `Hash`, or
    /// `Repository`.
    #[instrument(skip_all)]
    pub async fn register(
        &self,
        email: &str,
        display_name: &str,
        password: &SecretString,
    ) -> Result<Account, AuthError> {
        let email = Email::parse(email)?;

        if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword {
                min: MIN_PASSWORD_LENGTH,
            });
        }

        let display_name = match display_name.trim() {
            "" => email.local_part(),
            name => name,
        }
        .to_owned();

        let hash = hash_password(password)?;
        let account = self
            .repo
            .create_with_password(&email, &display_name, &hash)
            .await?;

        info!(account_id = %account.id, "account registered");
        Ok(account)
    }

    /// Verify email and password, returning the account on success.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` for an unknown email, a federated-only
    /// account, or a wrong password; `InvalidEmail` or `Repository` otherwise.
    #[instrument(skip_all)]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Account, AuthError> {
        let email = Email::parse(email)?;

        let Some((account, hash)) = self.repo.get_password_hash(&email).await? else {
            warn!("sign-in attempt for unknown or federated-only account");
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &hash)?;

        info!(account_id = %account.id, "account signed in");
        Ok(account)
    }
}

/// Hash a password with Argon2id and a fresh salt.
fn hash_password(password: &SecretString) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| AuthError::Hash)
}

/// Verify a password against a stored PHC-format hash.
fn verify_password(password: &SecretString, hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::Hash)?;
    Argon2::default()
        .verify_password(password.expose_secret().as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify_round_trip() {
        let password = SecretString::from("correct horse battery");
        let hash = hash_password(&password).unwrap();

        assert!(verify_password(&password, &hash).is_ok());
        assert!(matches!(
            verify_password(&SecretString::from("wrong"), &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let password = SecretString::from("correct horse battery");
        let a = hash_password(&password).unwrap();
        let b = hash_password(&password).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_stored_hash_is_internal_error() {
        assert!(matches!(
            verify_password(&SecretString::from("pw"), "not-a-phc-hash"),
            Err(AuthError::Hash)
        ));
    }
}
