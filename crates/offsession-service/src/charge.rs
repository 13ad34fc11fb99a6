//! Off-session charge flow.
//!
//! Attach the token to a fresh customer, pick the customer's card, then
//! create and confirm a payment intent for the server-computed amount. Card
//! errors from Stripe are mapped onto [`ChargeOutcome`]; everything else is a
//! [`ChargeError`].

use std::time::Duration;

use offsession_core::{
    ChargeOutcome, CustomerId, OrderAmount, PaymentIntentId, PaymentMethodId,
    AUTHENTICATION_REQUIRED,
};

use crate::stripe::{OffSessionIntent, PaymentMethod, StripeApiError, StripeClient, StripeError};

/// A charge attempt that produced no [`ChargeOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum ChargeError {
    /// The customer has no card payment method to charge.
    #[error("customer {customer} has no card payment method")]
    NoPaymentMethod {
        /// The customer created for this attempt.
        customer: CustomerId,
    },

    /// Stripe reported a card error without a code, so it cannot be told
    /// apart as an authentication request or a hard decline.
    #[error("card declined without an error code: {message}")]
    UnclassifiedDecline {
        /// Stripe's message.
        message: String,
    },

    /// A card error that carries no payment intent to resume (for example a
    /// decline while attaching the card to the customer).
    #[error("card rejected ({code}): {message}")]
    CardRejected {
        /// Stripe error code.
        code: String,
        /// Stripe's message.
        message: String,
    },

    /// Stripe confirmed the intent but returned it without a client secret.
    #[error("payment intent {intent} has no client secret")]
    MissingClientSecret {
        /// The confirmed intent.
        intent: PaymentIntentId,
    },

    /// Any other failure talking to Stripe.
    #[error(transparent)]
    Provider(#[from] StripeError),
}

/// Charge the saved payment method without the cardholder present.
///
/// `deadline` bounds the whole flow, not each Stripe call; running out of it
/// is reported as [`StripeError::Timeout`].
pub async fn charge_off_session(
    stripe: &StripeClient,
    token: &PaymentMethodId,
    deadline: Duration,
) -> Result<ChargeOutcome, ChargeError> {
    tokio::time::timeout(deadline, attempt_charge(stripe, token))
        .await
        .unwrap_or_else(|_| {
            tracing::warn!(payment_method = %token, ?deadline, "Off-session charge exceeded its deadline");
            Err(ChargeError::Provider(StripeError::Timeout))
        })
}

async fn attempt_charge(
    stripe: &StripeClient,
    token: &PaymentMethodId,
) -> Result<ChargeOutcome, ChargeError> {
    let amount = OrderAmount::for_order();

    // A new customer per attempt; the token only becomes reusable once attached.
    let customer = stripe
        .create_customer(token)
        .await
        .map_err(reject_card_error)?;
    tracing::debug!(customer = %customer.id, payment_method = %token, "Created customer");

    let methods = stripe
        .list_card_payment_methods(&customer.id)
        .await
        .map_err(reject_card_error)?;
    let Some(method) = methods.data.into_iter().next() else {
        return Err(ChargeError::NoPaymentMethod {
            customer: customer.id,
        });
    };

    let idempotency_key = uuid::Uuid::new_v4().to_string();
    let result = stripe
        .create_off_session_intent(&OffSessionIntent {
            amount,
            customer: &customer.id,
            payment_method: &method.id,
            idempotency_key: &idempotency_key,
        })
        .await;

    match result {
        Ok(intent) => match intent.client_secret.filter(|secret| !secret.is_empty()) {
            Some(client_secret) => Ok(ChargeOutcome::Succeeded { client_secret }),
            None => Err(ChargeError::MissingClientSecret { intent: intent.id }),
        },
        Err(StripeError::Api { error, .. }) if error.is_card_error() => {
            classify_card_error(*error, amount, &method)
        }
        Err(e) => Err(e.into()),
    }
}

/// Card errors before an intent exists leave nothing to resume.
fn reject_card_error(err: StripeError) -> ChargeError {
    match err {
        StripeError::Api { error, .. } if error.is_card_error() => {
            let error = *error;
            let message = error.message.unwrap_or_default();
            match error.code {
                Some(code) => ChargeError::CardRejected { code, message },
                None => ChargeError::UnclassifiedDecline { message },
            }
        }
        other => ChargeError::Provider(other),
    }
}

/// Map a Stripe card error to the outcome the client should act on.
///
/// `selected` is the payment method the intent was created with; it stands
/// in when the error body does not embed the payment method.
pub fn classify_card_error(
    error: StripeApiError,
    amount: OrderAmount,
    selected: &PaymentMethod,
) -> Result<ChargeOutcome, ChargeError> {
    let message = error.message.unwrap_or_default();

    let Some(code) = error.code else {
        return Err(ChargeError::UnclassifiedDecline { message });
    };

    let Some(client_secret) = error
        .payment_intent
        .and_then(|pi| pi.client_secret)
        .filter(|secret| !secret.is_empty())
    else {
        return Err(ChargeError::CardRejected { code, message });
    };

    if code != AUTHENTICATION_REQUIRED {
        return Ok(ChargeOutcome::RequiresNewPaymentMethod {
            client_secret,
            decline_code: code,
        });
    }

    let method = error.payment_method.unwrap_or_else(|| selected.clone());
    let Some(card) = method.card.or_else(|| selected.card.clone()) else {
        return Err(ChargeError::CardRejected { code, message });
    };

    Ok(ChargeOutcome::RequiresAuthentication {
        client_secret,
        payment_method: method.id,
        card,
        amount,
    })
}
