//! Stripe API types.
//!
//! Only the fields this service reads are modelled; everything else in
//! Stripe's responses is ignored.

use serde::Deserialize;

use offsession_core::{CardSummary, CustomerId, PaymentIntentId, PaymentMethodId};

/// Stripe customer object.
#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    /// Stripe customer ID.
    pub id: CustomerId,
}

/// Stripe `PaymentMethod` object.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethod {
    /// Payment method ID.
    pub id: PaymentMethodId,
    /// Customer the method is attached to.
    #[serde(default)]
    pub customer: Option<CustomerId>,
    /// Card details, present for card payment methods.
    #[serde(default)]
    pub card: Option<CardSummary>,
}

/// Stripe `PaymentIntent` object.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    /// Payment intent ID.
    pub id: PaymentIntentId,
    /// Amount in cents.
    #[serde(default)]
    pub amount: i64,
    /// Currency (e.g., "usd").
    #[serde(default)]
    pub currency: String,
    /// Secret the browser uses to confirm the intent.
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Customer ID.
    #[serde(default)]
    pub customer: Option<CustomerId>,
    /// Payment method used for the last confirmation.
    #[serde(default)]
    pub payment_method: Option<PaymentMethodId>,
    /// Error from the last failed confirmation.
    #[serde(default)]
    pub last_payment_error: Option<LastPaymentError>,
}

/// `last_payment_error` on a payment intent.
#[derive(Debug, Clone, Deserialize)]
pub struct LastPaymentError {
    /// Error code.
    #[serde(default)]
    pub code: Option<String>,
    /// Issuer decline code.
    #[serde(default)]
    pub decline_code: Option<String>,
    /// Human readable message.
    #[serde(default)]
    pub message: Option<String>,
}

/// Stripe list response wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeList<T> {
    /// Data items.
    pub data: Vec<T>,
}

/// Stripe error response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorResponse {
    /// The error.
    pub error: StripeApiError,
}

/// Error object returned by the Stripe API.
///
/// Card errors raised while confirming a payment intent embed the intent and
/// the payment method, which is what lets a declined off-session charge be
/// resumed on-session.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeApiError {
    /// Error type (`card_error`, `invalid_request_error`, `api_error`, ...).
    #[serde(rename = "type")]
    pub error_type: String,
    /// Short machine-readable code.
    #[serde(default)]
    pub code: Option<String>,
    /// Human readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// Payment intent the error occurred on.
    #[serde(default)]
    pub payment_intent: Option<PaymentIntent>,
    /// Payment method the error occurred on.
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

impl StripeApiError {
    /// Error type Stripe uses for declines and other card problems.
    pub const CARD_ERROR: &'static str = "card_error";

    /// Whether this is a card error.
    #[must_use]
    pub fn is_card_error(&self) -> bool {
        self.error_type == Self::CARD_ERROR
    }
}

impl std::fmt::Display for StripeApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error_type)?;
        if let Some(code) = &self.code {
            write!(f, " [{code}]")?;
        }
        if let Some(message) = &self.message {
            write!(f, " - {message}")?;
        }
        Ok(())
    }
}

/// Stripe webhook event envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    /// Event ID.
    pub id: String,
    /// Event type (e.g., `payment_intent.succeeded`).
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event data.
    pub data: WebhookEventData,
    /// API version the object was rendered with.
    #[serde(default)]
    pub api_version: Option<String>,
    /// Whether the event came from live mode.
    #[serde(default)]
    pub livemode: bool,
}

/// Webhook event data container.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEventData {
    /// The event object, typed later according to the event type.
    pub object: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn card_error_embeds_intent_and_method() {
        let body = json!({
            "error": {
                "type": "card_error",
                "code": "authentication_required",
                "decline_code": "authentication_required",
                "message": "This payment requires authentication.",
                "payment_intent": {
                    "id": "pi_123",
                    "amount": 1400,
                    "currency": "usd",
                    "status": "requires_payment_method",
                    "client_secret": "pi_123_secret_abc",
                    "object": "payment_intent"
                },
                "payment_method": {
                    "id": "pm_456",
                    "type": "card",
                    "card": { "brand": "visa", "last4": "3155", "exp_month": 12 }
                }
            }
        });

        let parsed: StripeErrorResponse = serde_json::from_value(body).unwrap();
        assert!(parsed.error.is_card_error());
        let intent = parsed.error.payment_intent.unwrap();
        assert_eq!(intent.client_secret.as_deref(), Some("pi_123_secret_abc"));
        let card = parsed.error.payment_method.unwrap().card.unwrap();
        assert_eq!(card.last4, "3155");
    }

    #[test]
    fn invalid_request_error_without_code() {
        let body = json!({"error": {"type": "invalid_request_error", "message": "No such PaymentMethod"}});
        let parsed: StripeErrorResponse = serde_json::from_value(body).unwrap();
        assert!(!parsed.error.is_card_error());
        assert!(parsed.error.code.is_none());
        assert!(parsed.error.payment_intent.is_none());
    }
}
