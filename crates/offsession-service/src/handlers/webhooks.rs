//! Stripe webhook handler.
//!
//! Responses carry no body; Stripe only looks at the status. Anything other
//! than 2xx makes Stripe retry the delivery, so an unverifiable delivery or an
//! unknown event type gets a 400, while a known type whose object we cannot
//! decode is acknowledged and logged to avoid an endless retry loop.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use crate::events::{dispatch, EventError, PaymentEvent};
use crate::state::AppState;
use crate::stripe::WebhookError;

/// Header carrying the delivery signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Handle Stripe webhooks.
pub async fn stripe_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let Some(verifier) = &state.webhooks else {
        tracing::error!("Rejecting webhook: signing secret not configured");
        return StatusCode::BAD_REQUEST;
    };

    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        tracing::warn!("Rejecting webhook: missing Stripe signature");
        return StatusCode::BAD_REQUEST;
    };

    let event = match verifier.construct_event(&body, signature) {
        Ok(event) => event,
        Err(WebhookError::Signature(e)) => {
            tracing::warn!(error = %e, "Webhook signature verification failed");
            return StatusCode::BAD_REQUEST;
        }
        Err(WebhookError::Payload(e)) => {
            tracing::warn!(error = %e, "Signed webhook is not a Stripe event");
            return StatusCode::BAD_REQUEST;
        }
    };

    tracing::info!(
        event_type = %event.event_type,
        event_id = %event.id,
        livemode = event.livemode,
        "Received Stripe webhook"
    );

    match PaymentEvent::from_event(&event) {
        Ok(typed) => {
            dispatch(state.hook.as_ref(), &typed).await;
            StatusCode::OK
        }
        Err(EventError::UnhandledType(event_type)) => {
            tracing::warn!(event_type = %event_type, "Unexpected Stripe event type");
            StatusCode::BAD_REQUEST
        }
        Err(e @ EventError::MalformedObject { .. }) => {
            tracing::warn!(
                event_id = %event.id,
                api_version = ?event.api_version,
                error = %e,
                "Acknowledging webhook whose object could not be decoded"
            );
            StatusCode::OK
        }
    }
}
