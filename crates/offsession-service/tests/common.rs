//! Common test utilities for integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use offsession_service::stripe::{PaymentIntent, PaymentMethod};
use offsession_service::{create_router, AppState, PaymentEventHook, ServiceConfig};

pub const SECRET_KEY: &str = "sk_test_harness";
pub const PUBLISHABLE_KEY: &str = "pk_test_harness";
pub const WEBHOOK_SECRET: &str = "whsec_test_harness";

/// Event hook that counts invocations per event type.
#[derive(Debug, Default)]
pub struct CountingHook {
    pub succeeded: AtomicUsize,
    pub failed: AtomicUsize,
    pub attached: AtomicUsize,
}

impl CountingHook {
    pub fn total(&self) -> usize {
        self.succeeded.load(Ordering::SeqCst)
            + self.failed.load(Ordering::SeqCst)
            + self.attached.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentEventHook for CountingHook {
    async fn payment_succeeded(&self, _intent: &PaymentIntent) {
        self.succeeded.fetch_add(1, Ordering::SeqCst);
    }

    async fn payment_failed(&self, _intent: &PaymentIntent) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    async fn payment_method_attached(&self, _method: &PaymentMethod) {
        self.attached.fetch_add(1, Ordering::SeqCst);
    }
}

/// Test harness: the service wired to a mock Stripe API.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Mock Stripe API.
    pub stripe: MockServer,
    /// Hook receiving dispatched webhook events.
    pub hook: Arc<CountingHook>,
}

impl TestHarness {
    /// Create a harness with Stripe and webhook signing configured.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a harness, letting the caller adjust the configuration.
    pub async fn with_config(adjust: impl FnOnce(&mut ServiceConfig)) -> Self {
        let stripe = MockServer::start().await;

        let mut config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            stripe_secret_key: Some(SECRET_KEY.into()),
            stripe_publishable_key: Some(PUBLISHABLE_KEY.into()),
            stripe_webhook_secret: Some(WEBHOOK_SECRET.into()),
            stripe_api_base: stripe.uri(),
            stripe_timeout_seconds: 5,
            ..ServiceConfig::default()
        };
        adjust(&mut config);

        let hook = Arc::new(CountingHook::default());
        let state = AppState::with_hook(config, hook.clone());
        let server = TestServer::new(create_router(state)).expect("Failed to create test server");

        Self {
            server,
            stripe,
            hook,
        }
    }

    /// Stripe creates a customer for `payment_method`.
    pub async fn mock_customer(&self, customer_id: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/customers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": customer_id,
                "object": "customer",
                "created": 1_700_000_000
            })))
            .mount(&self.stripe)
            .await;
    }

    /// Stripe lists `methods` as the customer's cards.
    pub async fn mock_payment_methods(&self, customer_id: &str, methods: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/v1/payment_methods"))
            .and(query_param("customer", customer_id))
            .and(query_param("type", "card"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": methods,
                "has_more": false
            })))
            .mount(&self.stripe)
            .await;
    }

    /// Stripe answers intent creation with `status` and `body`.
    pub async fn mock_intent(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path("/v1/payment_intents"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.stripe)
            .await;
    }

    /// Customer + one saved Visa, ready for an intent mock.
    pub async fn mock_saved_card(&self) {
        self.mock_customer("cus_test").await;
        self.mock_payment_methods("cus_test", vec![card_method("pm_saved", "visa", "3155")])
            .await;
    }

    /// Bodies of the requests the service sent to `/v1/payment_intents`.
    pub async fn intent_request_bodies(&self) -> Vec<String> {
        self.stripe
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == "/v1/payment_intents")
            .map(|r| String::from_utf8_lossy(&r.body).into_owned())
            .collect()
    }
}

/// A card payment method object.
pub fn card_method(id: &str, brand: &str, last4: &str) -> Value {
    json!({
        "id": id,
        "object": "payment_method",
        "type": "card",
        "customer": "cus_test",
        "card": { "brand": brand, "last4": last4, "exp_month": 12, "exp_year": 2034 }
    })
}

/// A payment intent object.
pub fn intent(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "object": "payment_intent",
        "amount": 1400,
        "currency": "usd",
        "status": status,
        "client_secret": format!("{id}_secret_test"),
        "customer": "cus_test",
        "payment_method": "pm_saved"
    })
}

/// A Stripe card error body.
pub fn card_error(code: Option<&str>, with_intent: bool) -> Value {
    let mut error = json!({
        "type": "card_error",
        "message": "Your card was declined.",
        "payment_method": card_method("pm_saved", "visa", "3155")
    });
    if let Some(code) = code {
        error["code"] = json!(code);
    }
    if with_intent {
        error["payment_intent"] = intent("pi_declined", "requires_payment_method");
    }
    json!({ "error": error })
}
