//! Application state.

use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::events::{LoggingHook, PaymentEventHook};
use crate::stripe::{StripeClient, StripeOptions, WebhookVerifier};

/// Application state shared across handlers.
///
/// Read-only after construction; handlers never mutate it.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: ServiceConfig,

    /// Stripe client for charges (absent without a secret key).
    pub stripe: Option<Arc<StripeClient>>,

    /// Webhook verifier (absent without a signing secret).
    pub webhooks: Option<WebhookVerifier>,

    /// Receives verified payment events.
    pub hook: Arc<dyn PaymentEventHook>,
}

impl AppState {
    /// Create a new application state with the logging event hook.
    #[must_use]
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_hook(config, Arc::new(LoggingHook))
    }

    /// Create a new application state with a custom event hook.
    #[must_use]
    pub fn with_hook(config: ServiceConfig, hook: Arc<dyn PaymentEventHook>) -> Self {
        let stripe = config.stripe_secret_key.as_ref().and_then(|key| {
            match StripeClient::new(key, StripeOptions::from(&config)) {
                Ok(client) => {
                    tracing::info!(api_base = %config.stripe_api_base, "Stripe integration enabled");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create Stripe client");
                    None
                }
            }
        });

        if stripe.is_none() {
            tracing::warn!("Stripe not configured - off-session charges will not be available");
        }

        let webhooks = config
            .stripe_webhook_secret
            .as_ref()
            .map(|secret| WebhookVerifier::new(secret, config.webhook_tolerance_seconds));

        if webhooks.is_none() {
            tracing::warn!("Stripe webhook secret not configured - all webhooks will be rejected");
        }

        Self {
            config,
            stripe,
            webhooks,
            hook,
        }
    }
}
