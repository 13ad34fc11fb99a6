//! Stripe integration.
//!
//! - REST client for customers, payment methods and payment intents
//! - Webhook signature verification

pub mod client;
pub mod types;
pub mod webhook;

pub use client::{OffSessionIntent, StripeClient, StripeError, StripeOptions};
pub use types::*;
pub use webhook::{signature_header, SignatureError, WebhookError, WebhookVerifier};
