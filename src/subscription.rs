//! Subscription plan, effective subscription state and payment requests

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PaymentError;
use crate::models::{NewPaymentRequest, PaymentStatus, Profile};

/// Price of the premium package in Tanzanian shillings
pub const PLAN_PRICE_TSH: u32 = 5_000;
/// Days of access granted by one approved payment
pub const PLAN_DURATION_DAYS: i64 = 30;

/// Subscription status as stored on the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionState {
    #[default]
    Pending,
    Active,
    Expired,
}

impl SubscriptionState {
    /// Translation key for the status badge
    pub fn label_key(&self) -> &'static str {
        match self {
            SubscriptionState::Pending => "pending",
            SubscriptionState::Active => "active",
            SubscriptionState::Expired => "expired",
        }
    }
}

/// Effective state of a profile at `now`.
///
/// The stored status wins, except that an `active` profile whose expiry lies
/// in the past is reported as `expired`.
pub fn effective_state(profile: &Profile, now: DateTime<Utc>) -> SubscriptionState {
    match (profile.status, profile.subscription_expires_at) {
        (SubscriptionState::Active, Some(expires)) if expires <= now => SubscriptionState::Expired,
        (status, _) => status,
    }
}

/// Expiry timestamp for a subscription activated at `now`
pub fn activation_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(PLAN_DURATION_DAYS)
}

/// Format a price the way the app shows it, e.g. `TSh 5,000`
pub fn format_price(amount: u32) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("TSh {}", grouped)
}

/// Manual M-Pesa payment form
#[derive(Debug, Clone, Default)]
pub struct PaymentForm {
    pub phone: String,
    pub transaction_id: String,
}

impl PaymentForm {
    /// Validate the form and build the row to insert for `user_id`
    pub fn to_request(
        &self,
        user_id: &str,
        state: SubscriptionState,
    ) -> Result<NewPaymentRequest, PaymentError> {
        if state == SubscriptionState::Active {
            return Err(PaymentError::AlreadyActive);
        }

        let phone = normalize_phone(&self.phone)?;
        let transaction_id = self.transaction_id.trim();

        Ok(NewPaymentRequest {
            user_id: user_id.to_string(),
            amount: PLAN_PRICE_TSH,
            phone_number: phone,
            transaction_id: if transaction_id.is_empty() {
                None
            } else {
                Some(transaction_id.to_string())
            },
            status: PaymentStatus::Pending,
        })
    }

    pub fn clear(&mut self) {
        self.phone.clear();
        self.transaction_id.clear();
    }
}

/// Strip separators and check the number looks like a mobile number
fn normalize_phone(raw: &str) -> Result<String, PaymentError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PaymentError::MissingPhone);
    }

    let (plus, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", trimmed),
    };

    let digits: String = rest
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();

    if !digits.chars().all(|c| c.is_ascii_digit()) || !(9..=13).contains(&digits.len()) {
        return Err(PaymentError::InvalidPhone(trimmed.to_string()));
    }

    Ok(format!("{}{}", plus, digits))
}
