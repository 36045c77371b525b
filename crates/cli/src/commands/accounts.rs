//! Account management commands.
//!
//! Development tooling over the site's account repository: grant pro access
//! or reset the trial balance without going through the payment flow.

use sqlx::PgPool;

use promptforge_core::{Credits, Email, EmailError};
use promptforge_site::db::{AccountRepository, RepositoryError};

/// Account command errors.
#[derive(Debug, thiserror::Error)]
pub enum AccountCommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

async fn connect() -> Result<PgPool, AccountCommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("SITE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| AccountCommandError::MissingEnvVar("SITE_DATABASE_URL"))?;

    Ok(PgPool::connect(&database_url).await?)
}

/// Flip an account to pro without a payment.
///
/// # Errors
///
/// Returns `AccountCommandError` if the email is invalid, the account
/// doesn't exist, or the database is unreachable.
pub async fn grant_pro(email: &str) -> Result<(), AccountCommandError> {
    let email = Email::parse(email)?;
    let pool = connect().await?;

    let repo = AccountRepository::new(&pool);
    let account = repo.grant_pro(&email).await?;

    tracing::info!(account_id = %account.id, "account is now pro");
    Ok(())
}

/// Set the remaining trial credits for an account.
///
/// # Errors
///
/// Returns `AccountCommandError` if the email is invalid, the account
/// doesn't exist, or the database is unreachable.
pub async fn set_credits(email: &str, count: i32) -> Result<(), AccountCommandError> {
    let email = Email::parse(email)?;
    let pool = connect().await?;

    let repo = AccountRepository::new(&pool);
    let account = repo.set_credits(&email, Credits::new(count)).await?;

    tracing::info!(
        account_id = %account.id,
        remaining = account.requests_remaining.as_i32(),
        "trial credits updated"
    );
    Ok(())
}
