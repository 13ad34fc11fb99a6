//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::charge::ChargeError;
use crate::stripe::{StripeApiError, StripeError};

/// API error type.
///
/// Every failure of a JSON endpoint ends up here, so clients always get the
/// same `{"error": {"code", "message"}}` shape with a stable code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The customer has nothing to charge.
    #[error("no payment method: {0}")]
    NoPaymentMethod(String),

    /// Card declined without a code that says how to recover.
    #[error("card declined: {0}")]
    CardDeclined(String),

    /// Card rejected before a payment intent existed.
    #[error("card rejected ({code}): {message}")]
    CardRejected {
        /// Stripe error code.
        code: String,
        /// Stripe's message.
        message: String,
    },

    /// Stripe did not answer in time.
    #[error("payment provider timed out")]
    ProviderTimeout,

    /// Payments are not configured on this instance.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// External service error.
    #[error("external service error: {0}")]
    ExternalService(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::NoPaymentMethod(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "no_payment_method",
                msg.clone(),
                None,
            ),
            Self::CardDeclined(msg) => (
                StatusCode::PAYMENT_REQUIRED,
                "card_declined",
                msg.clone(),
                None,
            ),
            Self::CardRejected { code, message } => (
                StatusCode::PAYMENT_REQUIRED,
                "card_rejected",
                message.clone(),
                Some(serde_json::json!({ "stripe_code": code })),
            ),
            Self::ProviderTimeout => {
                tracing::error!("Stripe request timed out");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "provider_timeout",
                    self.to_string(),
                    None,
                )
            }
            Self::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg.clone(),
                None,
            ),
            Self::ExternalService(msg) => {
                tracing::error!(error = %msg, "Payment provider error");
                (
                    StatusCode::BAD_GATEWAY,
                    "payment_provider_error",
                    msg.clone(),
                    None,
                )
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StripeError> for ApiError {
    fn from(err: StripeError) -> Self {
        match err {
            StripeError::Timeout => Self::ProviderTimeout,
            StripeError::Api { error, .. } => {
                let StripeApiError {
                    error_type,
                    message,
                    ..
                } = *error;
                Self::ExternalService(message.unwrap_or(error_type))
            }
            StripeError::Http(e) => Self::ExternalService(e.to_string()),
            StripeError::Serialization(e) => {
                Self::ExternalService(format!("unexpected Stripe response: {e}"))
            }
            StripeError::Configuration(msg) => Self::Internal(msg),
        }
    }
}

impl From<ChargeError> for ApiError {
    fn from(err: ChargeError) -> Self {
        match err {
            ChargeError::NoPaymentMethod { .. } => Self::NoPaymentMethod(err.to_string()),
            ChargeError::UnclassifiedDecline { message } => Self::CardDeclined(message),
            ChargeError::CardRejected { code, message } => Self::CardRejected { code, message },
            ChargeError::MissingClientSecret { .. } => Self::ExternalService(err.to_string()),
            ChargeError::Provider(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(error_type: &str, message: Option<&str>) -> StripeError {
        StripeError::Api {
            status: 400,
            error: Box::new(StripeApiError {
                error_type: error_type.into(),
                code: None,
                message: message.map(String::from),
                payment_intent: None,
                payment_method: None,
            }),
        }
    }

    #[test]
    fn status_codes_are_stable() {
        let cases = [
            (ApiError::NoPaymentMethod("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (ApiError::CardDeclined("x".into()), StatusCode::PAYMENT_REQUIRED),
            (ApiError::ProviderTimeout, StatusCode::GATEWAY_TIMEOUT),
            (ApiError::ExternalService("x".into()), StatusCode::BAD_GATEWAY),
            (ApiError::ServiceUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn stripe_timeout_maps_to_provider_timeout() {
        assert!(matches!(
            ApiError::from(StripeError::Timeout),
            ApiError::ProviderTimeout
        ));
    }

    #[test]
    fn stripe_api_error_uses_message_then_type() {
        match ApiError::from(api_error("invalid_request_error", Some("No such PaymentMethod"))) {
            ApiError::ExternalService(msg) => assert_eq!(msg, "No such PaymentMethod"),
            other => panic!("unexpected: {other:?}"),
        }
        match ApiError::from(api_error("api_error", None)) {
            ApiError::ExternalService(msg) => assert_eq!(msg, "api_error"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn charge_errors_map_to_api_errors() {
        let err = ChargeError::NoPaymentMethod {
            customer: "cus_1".parse().unwrap(),
        };
        assert!(matches!(ApiError::from(err), ApiError::NoPaymentMethod(_)));

        let err = ChargeError::UnclassifiedDecline {
            message: "declined".into(),
        };
        assert!(matches!(ApiError::from(err), ApiError::CardDeclined(_)));

        let err = ChargeError::Provider(StripeError::Timeout);
        assert!(matches!(ApiError::from(err), ApiError::ProviderTimeout));
    }
}
