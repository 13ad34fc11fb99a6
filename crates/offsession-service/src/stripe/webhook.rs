//! Stripe webhook signature verification.
//!
//! Stripe signs each delivery with HMAC-SHA256 over `"{timestamp}.{raw body}"`
//! using the endpoint's signing secret, and sends the result in the
//! `Stripe-Signature` header as `t=<unix seconds>,v1=<hex>[,v1=<hex>...]`.
//! Several `v1` entries appear while a secret is being rolled.

use super::types::WebhookEvent;
use crate::crypto::{constant_time_eq, hmac_sha256_hex};

/// Signature scheme this service accepts.
const SCHEME: &str = "v1";

/// Why a signature header was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// The header has no `t=` entry or it is not an integer.
    #[error("signature header has no valid timestamp")]
    MissingTimestamp,

    /// The header has no `v1=` entry.
    #[error("signature header has no v1 signature")]
    NoSignatures,

    /// No `v1` signature matches the payload.
    #[error("no signature matches the payload")]
    Mismatch,

    /// The timestamp is further from now than the tolerance allows.
    #[error("timestamp {timestamp} is outside the {tolerance}s tolerance window")]
    OutsideTolerance {
        /// Timestamp from the header.
        timestamp: i64,
        /// Allowed skew in seconds.
        tolerance: i64,
    },
}

/// Failure to turn a delivery into a trusted event.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// Signature verification failed.
    #[error("invalid signature: {0}")]
    Signature(#[from] SignatureError),

    /// The payload is authentic but is not a Stripe event envelope.
    #[error("invalid event payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Verifies webhook deliveries against an endpoint signing secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
    tolerance_seconds: i64,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("secret", &"<redacted>")
            .field("tolerance_seconds", &self.tolerance_seconds)
            .finish()
    }
}

impl WebhookVerifier {
    /// Create a verifier for the given signing secret (`whsec_...`).
    ///
    /// A non-positive tolerance disables the timestamp check.
    pub fn new(secret: impl Into<String>, tolerance_seconds: i64) -> Self {
        Self {
            secret: secret.into(),
            tolerance_seconds,
        }
    }

    /// Verify `header` against `payload` at time `now` (Unix seconds).
    pub fn verify_at(&self, payload: &[u8], header: &str, now: i64) -> Result<(), SignatureError> {
        let parsed = parse_header(header)?;

        let expected = sign(&self.secret, parsed.timestamp, payload);
        if !parsed
            .signatures
            .iter()
            .any(|sig| constant_time_eq(&expected, sig))
        {
            return Err(SignatureError::Mismatch);
        }

        if self.tolerance_seconds > 0
            && now.abs_diff(parsed.timestamp) > self.tolerance_seconds.unsigned_abs()
        {
            return Err(SignatureError::OutsideTolerance {
                timestamp: parsed.timestamp,
                tolerance: self.tolerance_seconds,
            });
        }

        Ok(())
    }

    /// Verify `header` against `payload` using the current time.
    pub fn verify(&self, payload: &[u8], header: &str) -> Result<(), SignatureError> {
        self.verify_at(payload, header, chrono::Utc::now().timestamp())
    }

    /// Verify the delivery and decode the event envelope.
    ///
    /// The payload is only parsed after the signature checks out.
    pub fn construct_event(&self, payload: &[u8], header: &str) -> Result<WebhookEvent, WebhookError> {
        self.verify(payload, header)?;
        Ok(serde_json::from_slice(payload)?)
    }
}

/// Build a `Stripe-Signature` header value for `payload`.
///
/// Produces exactly what Stripe would send, which makes it usable for
/// replaying captured payloads against a local server.
#[must_use]
pub fn signature_header(secret: &str, payload: &[u8], timestamp: i64) -> String {
    format!("t={timestamp},{SCHEME}={}", sign(secret, timestamp, payload))
}

fn sign(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let timestamp = timestamp.to_string();
    hmac_sha256_hex(secret.as_bytes(), &[timestamp.as_bytes(), b".", payload])
}

struct ParsedHeader<'a> {
    timestamp: i64,
    signatures: Vec<&'a str>,
}

// Format: t=timestamp,v1=signature,v1=signature2,... (other schemes ignored)
fn parse_header(header: &str) -> Result<ParsedHeader<'_>, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", ts)) => timestamp = ts.parse::<i64>().ok(),
            Some((SCHEME, sig)) => signatures.push(sig),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MissingTimestamp)?;
    if signatures.is_empty() {
        return Err(SignatureError::NoSignatures);
    }

    Ok(ParsedHeader {
        timestamp,
        signatures,
    })
}
