//! Outcome of an off-session charge attempt.

use serde::{Deserialize, Serialize};

use crate::amount::OrderAmount;
use crate::ids::PaymentMethodId;

/// Decline code Stripe uses when the issuer demands step-up authentication.
pub const AUTHENTICATION_REQUIRED: &str = "authentication_required";

/// Display fields of a card, enough for the client to show
/// "Visa ending in 3155" without re-collecting details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSummary {
    /// Card brand (`visa`, `mastercard`, ...).
    pub brand: String,
    /// Last four digits of the card number.
    pub last4: String,
}

/// Result of charging a saved payment method without the cardholder present.
///
/// Exactly one variant is produced per attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeOutcome {
    /// The payment intent was confirmed; nothing else to do.
    Succeeded {
        /// Client secret of the confirmed intent.
        client_secret: String,
    },

    /// The issuer requires the cardholder to authenticate. The client can
    /// resume the same intent on-session with the same payment method.
    RequiresAuthentication {
        /// Client secret of the pending intent.
        client_secret: String,
        /// Payment method to authenticate.
        payment_method: PaymentMethodId,
        /// Display fields of the card.
        card: CardSummary,
        /// The amount the intent was created for.
        amount: OrderAmount,
    },

    /// The card was declined for a reason authentication cannot fix; the
    /// client must collect a new payment method.
    RequiresNewPaymentMethod {
        /// Client secret of the failed intent.
        client_secret: String,
        /// Stripe error code (e.g. `card_declined`, `expired_card`).
        decline_code: String,
    },
}

impl ChargeOutcome {
    /// Client secret of the intent, present on every variant.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        match self {
            Self::Succeeded { client_secret }
            | Self::RequiresAuthentication { client_secret, .. }
            | Self::RequiresNewPaymentMethod { client_secret, .. } => client_secret,
        }
    }

    /// Short label used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Succeeded { .. } => "succeeded",
            Self::RequiresAuthentication { .. } => "requires_authentication",
            Self::RequiresNewPaymentMethod { .. } => "requires_new_payment_method",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_secret_available_on_every_variant() {
        let outcomes = [
            ChargeOutcome::Succeeded {
                client_secret: "a".into(),
            },
            ChargeOutcome::RequiresAuthentication {
                client_secret: "b".into(),
                payment_method: "pm_card_visa".parse().unwrap(),
                card: CardSummary {
                    brand: "visa".into(),
                    last4: "3155".into(),
                },
                amount: OrderAmount::for_order(),
            },
            ChargeOutcome::RequiresNewPaymentMethod {
                client_secret: "c".into(),
                decline_code: "card_declined".into(),
            },
        ];

        let secrets: Vec<_> = outcomes.iter().map(ChargeOutcome::client_secret).collect();
        assert_eq!(secrets, ["a", "b", "c"]);
        assert_eq!(outcomes[1].kind(), "requires_authentication");
    }
}
