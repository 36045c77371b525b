//! Account repository for database operations.
//!
//! All queries are runtime-checked (`sqlx::query_as`) so the crate builds
//! without a live database. The quota decrement is a single conditional
//! UPDATE so the counter can never go negative under concurrent requests
//! from the same account.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use promptforge_core::{AccountId, BillingCycle, Credits, Email, SubscriptionStatus};

use super::RepositoryError;
use crate::models::account::{Account, CardDetails, Subscription};

/// Columns selected for every account query, in `AccountRow` order.
const ACCOUNT_COLUMNS: &str = "id, email, display_name, requests_remaining, is_pro, \
     subscription_plan, subscription_status, subscription_billing_cycle, \
     subscription_amount, subscription_currency, subscription_renewal_date, \
     subscription_cancel_at_period_end, created_at, updated_at";

/// Raw account row as stored in `PostgreSQL`.
#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i32,
    email: String,
    display_name: String,
    requests_remaining: i32,
    is_pro: bool,
    subscription_plan: Option<String>,
    subscription_status: Option<String>,
    subscription_billing_cycle: Option<String>,
    subscription_amount: Option<Decimal>,
    subscription_currency: Option<String>,
    subscription_renewal_date: Option<DateTime<Utc>>,
    subscription_cancel_at_period_end: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    /// Convert a database row into the domain type.
    fn into_account(self) -> Result<Account, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        // The subscription sub-object exists only when all core fields are set.
        let subscription = match (
            self.subscription_plan,
            self.subscription_status,
            self.subscription_renewal_date,
        ) {
            (Some(plan), Some(status), Some(renewal_date)) => Some(Subscription {
                plan,
                status: SubscriptionStatus::from_db(&status),
                billing_cycle: BillingCycle::from_db(
                    self.subscription_billing_cycle.as_deref().unwrap_or(""),
                ),
                amount: self.subscription_amount.unwrap_or_default(),
                currency: self
                    .subscription_currency
                    .unwrap_or_else(|| "USD".to_owned()),
                renewal_date,
                cancel_at_period_end: self.subscription_cancel_at_period_end,
            }),
            _ => None,
        };

        Ok(Account {
            id: AccountId::new(self.id),
            email,
            display_name: self.display_name,
            requests_remaining: Credits::new(self.requests_remaining),
            is_pro: self.is_pro,
            subscription,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for account database operations.
pub struct AccountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an account by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    /// Get an account by its email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    /// Create a new account with email, display name, and password hash.
    ///
    /// The account starts with the initial credit grant and `is_pro = false`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        email: &Email,
        display_name: &str,
        password_hash: &str,
    ) -> Result<Account, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "INSERT INTO account (email, display_name, requests_remaining)
             VALUES ($1, $2, $3)
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(email.as_str())
        .bind(display_name)
        .bind(Credits::INITIAL_GRANT.as_i32())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        sqlx::query("INSERT INTO account_password (account_id, password_hash) VALUES ($1, $2)")
            .bind(row.id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        row.into_account()
    }

    /// Find or create an account for a federated identity.
    ///
    /// Idempotent: a concurrent insert of the same email resolves to the
    /// existing row. New accounts get the same initial grant as every other
    /// entry path.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the queries fail.
    pub async fn find_or_create_federated(
        &self,
        email: &Email,
        display_name: &str,
    ) -> Result<Account, RepositoryError> {
        if let Some(existing) = self.get_by_email(email).await? {
            return Ok(existing);
        }

        let inserted = sqlx::query_as::<_, AccountRow>(&format!(
            "INSERT INTO account (email, display_name, requests_remaining)
             VALUES ($1, $2, $3)
             ON CONFLICT (email) DO NOTHING
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(email.as_str())
        .bind(display_name)
        .bind(Credits::INITIAL_GRANT.as_i32())
        .fetch_optional(self.pool)
        .await?;

        match inserted {
            Some(row) => row.into_account(),
            // Lost the race to a concurrent sign-in; the row exists now.
            None => self
                .get_by_email(email)
                .await?
                .ok_or(RepositoryError::NotFound),
        }
    }

    /// Get an account and its password hash by email.
    ///
    /// Returns `None` if the account doesn't exist or has no password set
    /// (federated-only accounts).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        let Some(account) = self.get_by_email(email).await? else {
            return Ok(None);
        };

        let hash: Option<(String,)> =
            sqlx::query_as("SELECT password_hash FROM account_password WHERE account_id = $1")
                .bind(account.id.as_i32())
                .fetch_optional(self.pool)
                .await?;

        Ok(hash.map(|(h,)| (account, h)))
    }

    /// Atomically consume one credit if the account is on the free plan and
    /// has credits left.
    ///
    /// Returns the refreshed account on success, or `None` when no row
    /// matched - the account is pro, exhausted, or missing; the caller
    /// distinguishes those cases with a follow-up read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn try_consume_credit(
        &self,
        id: AccountId,
    ) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "UPDATE account
             SET requests_remaining = requests_remaining - 1, updated_at = now()
             WHERE id = $1 AND NOT is_pro AND requests_remaining > 0
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    /// Upgrade an account to pro: store the submitted card and merge-write the
    /// subscription fields in one transaction.
    ///
    /// Untouched columns (email, credits) keep their values, mirroring a
    /// merge-write into a document record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn upgrade_to_pro(
        &self,
        id: AccountId,
        card: &CardDetails,
        subscription: &Subscription,
    ) -> Result<Account, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO account_card
                 (account_id, card_number, holder_name, expiry_month, expiry_year, cvc)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id.as_i32())
        .bind(&card.number)
        .bind(&card.holder_name)
        .bind(&card.expiry_month)
        .bind(&card.expiry_year)
        .bind(&card.cvc)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "UPDATE account
             SET is_pro = TRUE,
                 upgraded_at = now(),
                 subscription_plan = $2,
                 subscription_status = $3,
                 subscription_billing_cycle = $4,
                 subscription_amount = $5,
                 subscription_currency = $6,
                 subscription_renewal_date = $7,
                 subscription_cancel_at_period_end = $8,
                 updated_at = now()
             WHERE id = $1
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(&subscription.plan)
        .bind(subscription.status.as_str())
        .bind(subscription.billing_cycle.as_str())
        .bind(subscription.amount)
        .bind(&subscription.currency)
        .bind(subscription.renewal_date)
        .bind(subscription.cancel_at_period_end)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;

        row.into_account()
    }

    /// Set or clear the cancel-at-period-end flag on the subscription.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account doesn't exist or has
    /// no subscription.
    pub async fn set_cancel_at_period_end(
        &self,
        id: AccountId,
        cancel: bool,
    ) -> Result<Account, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "UPDATE account
             SET subscription_cancel_at_period_end = $2, updated_at = now()
             WHERE id = $1 AND subscription_plan IS NOT NULL
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(cancel)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.into_account()
    }

    /// Set the remaining credit count directly (management tooling only).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no account has this email.
    pub async fn set_credits(
        &self,
        email: &Email,
        credits: Credits,
    ) -> Result<Account, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "UPDATE account
             SET requests_remaining = $2, updated_at = now()
             WHERE email = $1
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(email.as_str())
        .bind(credits.as_i32())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.into_account()
    }

    /// Flip the pro flag without a payment (management tooling only).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no account has this email.
    pub async fn grant_pro(&self, email: &Email) -> Result<Account, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "UPDATE account
             SET is_pro = TRUE, upgraded_at = now(), updated_at = now()
             WHERE email = $1
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.into_account()
    }
}

/// Map a unique-constraint violation to `Conflict`, everything else to
/// `Database`.
fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("email already exists".to_owned());
    }
    RepositoryError::Database(e)
}
