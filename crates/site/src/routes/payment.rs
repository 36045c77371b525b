//! Payment route handlers.
//!
//! Prototype upgrade flow: the card form posts here, the card row is stored
//! verbatim, and the account becomes pro with a monthly subscription. This
//! is not a payment system; nothing is charged and the card is never
//! tokenized.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, instrument};

use promptforge_core::SubscriptionStatus;

use crate::db::AccountRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::account::{CardDetails, Subscription};
use crate::state::AppState;

/// Monthly price of the pro plan, in USD.
const PRO_MONTHLY_AMOUNT: Decimal = Decimal::from_parts(500, 0, 0, false, 2);

/// Days until the first renewal.
const RENEWAL_PERIOD_DAYS: i64 = 30;

/// Card form data.
#[derive(Debug, Deserialize)]
pub struct PaymentForm {
    pub card_number: String,
    pub holder_name: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvc: String,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

/// Payment page template.
#[derive(Template, WebTemplate)]
#[template(path = "payment.html")]
pub struct PaymentTemplate {
    pub error: Option<String>,
}

/// Display the card form.
///
/// # Route
///
/// `GET /payment`
pub async fn form(
    RequireAuth(_user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    PaymentTemplate { error: query.error }
}

/// Handle the card form submission and upgrade the account to pro.
///
/// # Route
///
/// `POST /payment`
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<PaymentForm>,
) -> Result<Response> {
    let Some(card) = validate_card(&form) else {
        return Ok(Redirect::to("/payment?error=invalid_card").into_response());
    };

    let subscription = Subscription {
        plan: "pro".to_string(),
        status: SubscriptionStatus::Active,
        billing_cycle: promptforge_core::BillingCycle::Monthly,
        amount: PRO_MONTHLY_AMOUNT,
        currency: "USD".to_string(),
        renewal_date: Utc::now() + Duration::days(RENEWAL_PERIOD_DAYS),
        cancel_at_period_end: false,
    };

    let repo = AccountRepository::new(state.pool());
    let account = repo.upgrade_to_pro(user.id, &card, &subscription).await?;
    state.feed().publish(&account);

    info!(account_id = %account.id, "account upgraded to pro");
    Ok(Redirect::to("/account").into_response())
}

/// Validate the card form: 16-digit number, 2-digit month/year, 3-digit CVC.
///
/// Spaces and dashes in the card number are tolerated and stripped.
fn validate_card(form: &PaymentForm) -> Option<CardDetails> {
    let number: String = form
        .card_number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    if number.len() != 16 || !number.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let holder_name = form.holder_name.trim();
    if holder_name.is_empty() {
        return None;
    }

    if !is_digits(&form.expiry_month, 2) || !is_digits(&form.expiry_year, 2) {
        return None;
    }
    let month: u8 = form.expiry_month.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }

    if !is_digits(&form.cvc, 3) {
        return None;
    }

    Some(CardDetails {
        number,
        holder_name: holder_name.to_string(),
        expiry_month: form.expiry_month.clone(),
        expiry_year: form.expiry_year.clone(),
        cvc: form.cvc.clone(),
    })
}

/// Whether `s` is exactly `len` ASCII digits.
fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> PaymentForm {
        PaymentForm {
            card_number: "4242 4242 4242 4242".to_string(),
            holder_name: "Ada Lovelace".to_string(),
            expiry_month: "09".to_string(),
            expiry_year: "28".to_string(),
            cvc: "123".to_string(),
        }
    }

    #[test]
    fn test_valid_card_accepted_and_number_normalized() {
        let card = validate_card(&valid_form()).unwrap();
        assert_eq!(card.number, "4242424242424242");
        assert_eq!(card.holder_name, "Ada Lovelace");
    }

    #[test]
    fn test_short_card_number_rejected() {
        let mut form = valid_form();
        form.card_number = "4242".to_string();
        assert!(validate_card(&form).is_none());
    }

    #[test]
    fn test_invalid_month_rejected() {
        let mut form = valid_form();
        form.expiry_month = "13".to_string();
        assert!(validate_card(&form).is_none());

        form.expiry_month = "00".to_string();
        assert!(validate_card(&form).is_none());
    }

    #[test]
    fn test_wrong_cvc_length_rejected() {
        let mut form = valid_form();
        form.cvc = "12".to_string();
        assert!(validate_card(&form).is_none());

        form.cvc = "1234".to_string();
        assert!(validate_card(&form).is_none());
    }

    #[test]
    fn test_blank_holder_rejected() {
        let mut form = valid_form();
        form.holder_name = "   ".to_string();
        assert!(validate_card(&form).is_none());
    }

    #[test]
    fn test_pro_amount_is_five_dollars() {
        assert_eq!(PRO_MONTHLY_AMOUNT.to_string(), "5.00");
    }
}
