//! Service configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default Stripe API origin.
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

/// Default webhook timestamp tolerance, matching Stripe's SDKs.
pub const DEFAULT_WEBHOOK_TOLERANCE_SECONDS: i64 = 300;

/// Service configuration loaded from environment variables.
///
/// Built once at startup and handed to [`crate::AppState`]; nothing reads the
/// environment after that.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:4242").
    pub listen_addr: String,

    /// Stripe secret API key (`sk_test_...` / `sk_live_...`).
    pub stripe_secret_key: Option<String>,

    /// Stripe publishable key, returned to the browser client.
    pub stripe_publishable_key: Option<String>,

    /// Webhook signing secret (`whsec_...`).
    pub stripe_webhook_secret: Option<String>,

    /// Stripe API origin (default: `<https://api.stripe.com>`).
    pub stripe_api_base: String,

    /// Pinned Stripe API version sent as `Stripe-Version` (optional).
    pub stripe_api_version: Option<String>,

    /// Timeout for each call to Stripe, in seconds.
    pub stripe_timeout_seconds: u64,

    /// Maximum age of a webhook signature timestamp, in seconds.
    pub webhook_tolerance_seconds: i64,

    /// Directory with the browser client's static files (optional).
    pub static_dir: Option<PathBuf>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// Stripe secrets file structure.
#[derive(Debug, Deserialize)]
struct StripeSecrets {
    secret_key: String,
    #[serde(default)]
    publishable_key: Option<String>,
    #[serde(default)]
    webhook_secret: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        // Try to load Stripe secrets from file first, then fall back to env vars
        let (stripe_secret_key, stripe_publishable_key, stripe_webhook_secret) =
            load_stripe_secrets();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            stripe_secret_key,
            stripe_publishable_key,
            stripe_webhook_secret,
            stripe_api_base: std::env::var("STRIPE_API_BASE").unwrap_or(defaults.stripe_api_base),
            stripe_api_version: non_empty_var("STRIPE_API_VERSION"),
            stripe_timeout_seconds: parsed_var("STRIPE_TIMEOUT_SECONDS")
                .unwrap_or(defaults.stripe_timeout_seconds),
            webhook_tolerance_seconds: parsed_var("WEBHOOK_TOLERANCE_SECONDS")
                .unwrap_or(defaults.webhook_tolerance_seconds),
            static_dir: non_empty_var("STATIC_DIR").map(PathBuf::from),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: parsed_var("MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: parsed_var("REQUEST_TIMEOUT_SECONDS")
                .unwrap_or(defaults.request_timeout_seconds),
        }
    }
}

/// Read an environment variable, treating an empty value as unset.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

/// Load Stripe secrets from file or environment.
fn load_stripe_secrets() -> (Option<String>, Option<String>, Option<String>) {
    let secret_paths = [".secrets/stripe.json", "../.secrets/stripe.json"];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<StripeSecrets>(path) {
            tracing::info!(path = %path, "Loaded Stripe secrets from file");
            return (
                Some(secrets.secret_key),
                secrets.publishable_key,
                secrets.webhook_secret,
            );
        }
    }

    tracing::debug!("Stripe secrets file not found, using environment variables");
    (
        non_empty_var("STRIPE_SECRET_KEY"),
        non_empty_var("STRIPE_PUBLISHABLE_KEY"),
        non_empty_var("STRIPE_WEBHOOK_SECRET"),
    )
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:4242".into(),
            stripe_secret_key: None,
            stripe_publishable_key: None,
            stripe_webhook_secret: None,
            stripe_api_base: DEFAULT_STRIPE_API_BASE.into(),
            stripe_api_version: None,
            stripe_timeout_seconds: 30,
            webhook_tolerance_seconds: DEFAULT_WEBHOOK_TOLERANCE_SECONDS,
            static_dir: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}
