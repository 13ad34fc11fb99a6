//! Stripe API client implementation.

use reqwest::Client;
use std::time::Duration;

use offsession_core::{CustomerId, OrderAmount, PaymentMethodId};

use super::types::{Customer, PaymentIntent, PaymentMethod, StripeApiError, StripeErrorResponse, StripeList};
use crate::config::{ServiceConfig, DEFAULT_STRIPE_API_BASE};

/// Error type for Stripe operations.
#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("request to Stripe timed out")]
    Timeout,

    /// Stripe API returned an error.
    #[error("Stripe API error ({status}): {error}")]
    Api {
        /// HTTP status code of the response.
        status: u16,
        /// Decoded error body.
        error: Box<StripeApiError>,
    },

    /// Response body could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for StripeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

/// Connection options for [`StripeClient`].
#[derive(Debug, Clone)]
pub struct StripeOptions {
    /// API origin, without the `/v1` suffix.
    pub api_base: String,
    /// Pinned API version (`Stripe-Version` header).
    pub api_version: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for StripeOptions {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_STRIPE_API_BASE.to_string(),
            api_version: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl From<&ServiceConfig> for StripeOptions {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            api_base: config.stripe_api_base.clone(),
            api_version: config.stripe_api_version.clone(),
            timeout: Duration::from_secs(config.stripe_timeout_seconds),
        }
    }
}

/// Parameters for creating and confirming an off-session payment intent.
#[derive(Debug, Clone)]
pub struct OffSessionIntent<'a> {
    /// Server-computed amount.
    pub amount: OrderAmount,
    /// Customer that owns the payment method.
    pub customer: &'a CustomerId,
    /// Saved payment method to charge.
    pub payment_method: &'a PaymentMethodId,
    /// Key that makes retries of this request safe.
    pub idempotency_key: &'a str,
}

/// Stripe API client.
#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    api_key: String,
    base_url: String,
    api_version: Option<String>,
}

impl StripeClient {
    /// Create a new Stripe client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Stripe secret API key (`sk_test_...` or `sk_live_...`)
    /// * `options` - API origin, version pin and timeout
    pub fn new(api_key: impl Into<String>, options: StripeOptions) -> Result<Self, StripeError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(StripeError::Configuration("Stripe API key is empty".into()));
        }

        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| StripeError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: format!("{}/v1", options.api_base.trim_end_matches('/')),
            api_version: options.api_version,
        })
    }

    /// Create a customer with the given payment method attached.
    pub async fn create_customer(
        &self,
        payment_method: &PaymentMethodId,
    ) -> Result<Customer, StripeError> {
        let params = [("payment_method", payment_method.as_str())];

        let response = self
            .request(reqwest::Method::POST, "customers")
            .form(&params)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List the card payment methods attached to a customer.
    pub async fn list_card_payment_methods(
        &self,
        customer: &CustomerId,
    ) -> Result<StripeList<PaymentMethod>, StripeError> {
        let response = self
            .request(reqwest::Method::GET, "payment_methods")
            .query(&[("customer", customer.as_str()), ("type", "card")])
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Create and confirm a payment intent without the customer present.
    ///
    /// Declines come back as [`StripeError::Api`] with a `card_error` body that
    /// embeds the intent.
    pub async fn create_off_session_intent(
        &self,
        intent: &OffSessionIntent<'_>,
    ) -> Result<PaymentIntent, StripeError> {
        let amount = intent.amount.cents().to_string();
        let params = [
            ("amount", amount.as_str()),
            ("currency", intent.amount.currency()),
            ("customer", intent.customer.as_str()),
            ("payment_method", intent.payment_method.as_str()),
            ("off_session", "true"),
            ("confirm", "true"),
        ];

        tracing::debug!(
            customer = %intent.customer,
            payment_method = %intent.payment_method,
            amount_cents = %intent.amount.cents(),
            "Creating off-session payment intent"
        );

        let response = self
            .request(reqwest::Method::POST, "payment_intents")
            .header("Idempotency-Key", intent.idempotency_key)
            .form(&params)
            .send()
            .await?;

        self.handle_response(response).await
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}/{path}", self.base_url))
            .basic_auth(&self.api_key, Option::<&str>::None);

        match &self.api_version {
            Some(version) => builder.header("Stripe-Version", version),
            None => builder,
        }
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, StripeError> {
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            return Ok(serde_json::from_slice(&body)?);
        }

        let error = match serde_json::from_slice::<StripeErrorResponse>(&body) {
            Ok(parsed) => parsed.error,
            Err(_) => StripeApiError {
                error_type: "unknown".to_string(),
                code: None,
                message: Some(format!("HTTP {status}")),
                payment_intent: None,
                payment_method: None,
            },
        };

        Err(StripeError::Api {
            status: status.as_u16(),
            error: Box::new(error),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = StripeClient::new("sk_test_xxx", StripeOptions::default()).unwrap();
        assert_eq!(client.base_url, "https://api.stripe.com/v1");
        assert!(client.api_version.is_none());
    }

    #[test]
    fn base_url_tolerates_trailing_slash() {
        let options = StripeOptions {
            api_base: "http://127.0.0.1:9999/".into(),
            ..StripeOptions::default()
        };
        let client = StripeClient::new("sk_test_xxx", options).unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:9999/v1");
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let err = StripeClient::new("  ", StripeOptions::default()).unwrap_err();
        assert!(matches!(err, StripeError::Configuration(_)));
    }
}
