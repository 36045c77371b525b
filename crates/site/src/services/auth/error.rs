//! Authentication error taxonomy.

use thiserror::Error;

use promptforge_core::EmailError;

use crate::db::RepositoryError;

/// Errors from registration and sign-in.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The submitted email failed validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password too short for registration.
    #[error("password must be at least {min} characters")]
    WeakPassword {
        /// Minimum accepted length.
        min: usize,
    },

    /// Unknown email, missing password row, or wrong password. One variant
    /// for all three so the response doesn't reveal which.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Registration hit an existing account with this email.
    #[error("an account with this email already exists")]
    EmailTaken,

    /// Password hashing or verification infrastructure failed.
    #[error("password hashing failed")]
    Hash,

    /// Database failure.
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for AuthError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Conflict(_) => Self::EmailTaken,
            other => Self::Repository(other),
        }
    }
}

impl AuthError {
    /// Whether this is a user-correctable input problem (4xx) rather than an
    /// internal fault.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidEmail(_)
                | Self::WeakPassword { .. }
                | Self::InvalidCredentials
                | Self::EmailTaken
        )
    }
}
