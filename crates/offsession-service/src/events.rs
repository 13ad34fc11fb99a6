//! Typed payment events and their fulfilment hook.
//!
//! A verified [`WebhookEvent`] carries its object as raw JSON. This module
//! types it according to the event type and hands it to a
//! [`PaymentEventHook`]. Every handled type has its own variant; anything
//! else is [`EventError::UnhandledType`].

use async_trait::async_trait;

use crate::stripe::{PaymentIntent, PaymentMethod, WebhookEvent};

/// `payment_intent.succeeded`
pub const PAYMENT_INTENT_SUCCEEDED: &str = "payment_intent.succeeded";
/// `payment_intent.payment_failed`
pub const PAYMENT_INTENT_PAYMENT_FAILED: &str = "payment_intent.payment_failed";
/// `payment_method.attached`
pub const PAYMENT_METHOD_ATTACHED: &str = "payment_method.attached";

/// A webhook event this service acts on.
#[derive(Debug, Clone)]
pub enum PaymentEvent {
    /// The payment completed.
    PaymentSucceeded(PaymentIntent),
    /// The payment was declined or needs authentication.
    PaymentFailed(PaymentIntent),
    /// A payment method was attached to a customer.
    PaymentMethodAttached(PaymentMethod),
}

/// Why an event could not be typed.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// The event type is not one this service handles.
    #[error("unhandled event type: {0}")]
    UnhandledType(String),

    /// The type is handled but the object does not match the expected shape,
    /// typically because the endpoint's API version differs from ours.
    #[error("cannot decode {event_type} object: {source}")]
    MalformedObject {
        /// The event type.
        event_type: String,
        /// Decoding error.
        #[source]
        source: serde_json::Error,
    },
}

impl PaymentEvent {
    /// Type the object of a verified event.
    pub fn from_event(event: &WebhookEvent) -> Result<Self, EventError> {
        let object = &event.data.object;
        let malformed = |source: serde_json::Error| EventError::MalformedObject {
            event_type: event.event_type.clone(),
            source,
        };

        match event.event_type.as_str() {
            PAYMENT_INTENT_SUCCEEDED => serde_json::from_value(object.clone())
                .map(Self::PaymentSucceeded)
                .map_err(malformed),
            PAYMENT_INTENT_PAYMENT_FAILED => serde_json::from_value(object.clone())
                .map(Self::PaymentFailed)
                .map_err(malformed),
            PAYMENT_METHOD_ATTACHED => serde_json::from_value(object.clone())
                .map(Self::PaymentMethodAttached)
                .map_err(malformed),
            other => Err(EventError::UnhandledType(other.to_string())),
        }
    }

    /// Stripe event type this variant came from.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::PaymentSucceeded(_) => PAYMENT_INTENT_SUCCEEDED,
            Self::PaymentFailed(_) => PAYMENT_INTENT_PAYMENT_FAILED,
            Self::PaymentMethodAttached(_) => PAYMENT_METHOD_ATTACHED,
        }
    }
}

/// Receives verified payment events.
///
/// Implementations fulfil orders, send receipts and so on. The service only
/// calls the hook after the signature has been checked and the object typed.
#[async_trait]
pub trait PaymentEventHook: Send + Sync {
    /// The payment completed; fulfil the order.
    async fn payment_succeeded(&self, intent: &PaymentIntent);

    /// The payment failed.
    async fn payment_failed(&self, intent: &PaymentIntent);

    /// A payment method was attached to a customer.
    async fn payment_method_attached(&self, method: &PaymentMethod);
}

/// Route a typed event to the matching hook method.
pub async fn dispatch(hook: &dyn PaymentEventHook, event: &PaymentEvent) {
    match event {
        PaymentEvent::PaymentSucceeded(intent) => hook.payment_succeeded(intent).await,
        PaymentEvent::PaymentFailed(intent) => hook.payment_failed(intent).await,
        PaymentEvent::PaymentMethodAttached(method) => hook.payment_method_attached(method).await,
    }
}

/// Default hook: records each event in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHook;

#[async_trait]
impl PaymentEventHook for LoggingHook {
    async fn payment_succeeded(&self, intent: &PaymentIntent) {
        tracing::info!(
            payment_intent_id = %intent.id,
            payment_method = ?intent.payment_method.as_ref().map(ToString::to_string),
            amount_cents = intent.amount,
            currency = %intent.currency,
            "Payment succeeded"
        );
    }

    async fn payment_failed(&self, intent: &PaymentIntent) {
        let error = intent.last_payment_error.as_ref();
        let message = error.and_then(|e| e.message.as_deref()).unwrap_or("unknown");

        tracing::warn!(
            payment_intent_id = %intent.id,
            code = ?error.and_then(|e| e.code.as_deref()),
            decline_code = ?error.and_then(|e| e.decline_code.as_deref()),
            error = %message,
            "Payment failed"
        );
    }

    async fn payment_method_attached(&self, method: &PaymentMethod) {
        tracing::info!(
            payment_method = %method.id,
            customer = ?method.customer.as_ref().map(ToString::to_string),
            "Payment method attached to customer"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(event_type: &str, object: serde_json::Value) -> WebhookEvent {
        serde_json::from_value(json!({
            "id": "evt_1",
            "type": event_type,
            "data": { "object": object }
        }))
        .unwrap()
    }

    #[test]
    fn types_each_handled_event() {
        let succeeded = event(
            PAYMENT_INTENT_SUCCEEDED,
            json!({"id": "pi_1", "payment_method": "pm_1"}),
        );
        assert!(matches!(
            PaymentEvent::from_event(&succeeded),
            Ok(PaymentEvent::PaymentSucceeded(_))
        ));

        let failed = event(
            PAYMENT_INTENT_PAYMENT_FAILED,
            json!({"id": "pi_1", "last_payment_error": {"message": "Your card was declined."}}),
        );
        assert!(matches!(
            PaymentEvent::from_event(&failed),
            Ok(PaymentEvent::PaymentFailed(_))
        ));

        let attached = event(
            PAYMENT_METHOD_ATTACHED,
            json!({"id": "pm_1", "customer": "cus_1", "type": "card"}),
        );
        let typed = PaymentEvent::from_event(&attached).unwrap();
        assert_eq!(typed.event_type(), PAYMENT_METHOD_ATTACHED);
    }

    #[test]
    fn unknown_type_is_unhandled() {
        let other = event("charge.refunded", json!({"id": "ch_1"}));
        assert!(matches!(
            PaymentEvent::from_event(&other),
            Err(EventError::UnhandledType(t)) if t == "charge.refunded"
        ));
    }

    #[test]
    fn mismatched_object_is_malformed() {
        let skewed = event(PAYMENT_METHOD_ATTACHED, json!({"object": "payment_method"}));
        assert!(matches!(
            PaymentEvent::from_event(&skewed),
            Err(EventError::MalformedObject { .. })
        ));
    }
}
