//! Off-session charge service.
//!
//! HTTP API that charges a saved card without the cardholder present and
//! receives Stripe webhooks:
//!
//! - `POST /charge-card-off-session` - charge, mapping declines to a resumable outcome
//! - `POST /webhook` - signature-verified payment events, dispatched to a [`PaymentEventHook`]
//!
//! All payment state lives in Stripe; the service itself is stateless.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers need async for axum

pub mod charge;
pub mod config;
pub mod crypto;
pub mod error;
pub mod events;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod stripe;

pub use charge::{charge_off_session, ChargeError};
pub use config::ServiceConfig;
pub use error::ApiError;
pub use events::{LoggingHook, PaymentEvent, PaymentEventHook};
pub use routes::create_router;
pub use state::AppState;
pub use stripe::{signature_header, StripeClient, StripeError, WebhookVerifier};
