//! Off-session charge handler.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use offsession_core::{CardSummary, ChargeOutcome, OrderAmount, PaymentMethodId, AUTHENTICATION_REQUIRED};

use crate::charge::charge_off_session;
use crate::error::ApiError;
use crate::state::AppState;

/// Charge request from the browser client.
///
/// Only the token is read; any amount the client sends is ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeRequest {
    /// Saved payment method (or test token) to charge.
    pub payment_method: PaymentMethodId,
}

/// Charge response: the outcome plus the publishable key.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeResponse {
    /// Stripe publishable key, so the client can resume the intent.
    pub public_key: Option<String>,
    /// Outcome-specific fields.
    #[serde(flatten)]
    pub outcome: ChargeOutcomeBody,
}

/// Wire shape of each [`ChargeOutcome`] variant.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ChargeOutcomeBody {
    /// `{"succeeded": true, "clientSecret"}`
    #[serde(rename_all = "camelCase")]
    Succeeded {
        /// Always `true`.
        succeeded: bool,
        /// Client secret of the confirmed intent.
        client_secret: String,
    },
    /// `{"error": "authentication_required", "clientSecret", "paymentMethod", "card", "amount"}`
    #[serde(rename_all = "camelCase")]
    RequiresAuthentication {
        /// Always `authentication_required`.
        error: &'static str,
        /// Client secret of the pending intent.
        client_secret: String,
        /// Payment method to authenticate.
        payment_method: PaymentMethodId,
        /// Card display fields.
        card: CardSummary,
        /// Server-computed amount in cents.
        amount: OrderAmount,
    },
    /// `{"error": "<code>", "clientSecret"}`
    #[serde(rename_all = "camelCase")]
    RequiresNewPaymentMethod {
        /// Stripe decline code.
        error: String,
        /// Client secret of the failed intent.
        client_secret: String,
    },
}

impl From<ChargeOutcome> for ChargeOutcomeBody {
    fn from(outcome: ChargeOutcome) -> Self {
        match outcome {
            ChargeOutcome::Succeeded { client_secret } => Self::Succeeded {
                succeeded: true,
                client_secret,
            },
            ChargeOutcome::RequiresAuthentication {
                client_secret,
                payment_method,
                card,
                amount,
            } => Self::RequiresAuthentication {
                error: AUTHENTICATION_REQUIRED,
                client_secret,
                payment_method,
                card,
                amount,
            },
            ChargeOutcome::RequiresNewPaymentMethod {
                client_secret,
                decline_code,
            } => Self::RequiresNewPaymentMethod {
                error: decline_code,
                client_secret,
            },
        }
    }
}

/// Charge a saved card without the cardholder present.
pub async fn charge_card_off_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChargeRequest>,
) -> Result<Json<ChargeResponse>, ApiError> {
    let stripe = state
        .stripe
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("Stripe is not configured".into()))?;

    let deadline = Duration::from_secs(state.config.request_timeout_seconds);
    let outcome = charge_off_session(stripe, &body.payment_method, deadline)
        .await
        .map_err(|e| {
            tracing::warn!(payment_method = %body.payment_method, error = %e, "Off-session charge failed");
            ApiError::from(e)
        })?;

    tracing::info!(
        payment_method = %body.payment_method,
        outcome = outcome.kind(),
        "Off-session charge attempted"
    );

    Ok(Json(ChargeResponse {
        public_key: state.config.stripe_publishable_key.clone(),
        outcome: outcome.into(),
    }))
}
