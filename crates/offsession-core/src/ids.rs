//! Identifier types for Stripe objects.
//!
//! Stripe identifiers are opaque strings carrying a type prefix (`cus_`,
//! `pm_`, `pi_`). The wrappers here keep the three kinds from being mixed up
//! when they travel between the customer, payment-method and payment-intent
//! calls of a single charge.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Macro to define a prefixed Stripe identifier type with standard trait implementations.
///
/// This macro generates a newtype wrapper around `String` with implementations for:
/// - `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `Serialize`, `Deserialize` (as string, prefix checked)
/// - `FromStr`, `Display`, `Debug`
/// - `TryFrom<String>`, `Into<String>`, `AsRef<str>`
macro_rules! stripe_id_type {
    ($name:ident, $prefix:literal, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Prefix every identifier of this kind starts with.
            pub const PREFIX: &'static str = $prefix;

            /// Return the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let rest = s.strip_prefix($prefix).ok_or_else(|| IdError::WrongPrefix {
                    expected: $prefix,
                    value: s.to_string(),
                })?;
                if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
                    return Err(IdError::InvalidCharacters(s.to_string()));
                }
                Ok(Self(s.to_string()))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

stripe_id_type!(CustomerId, "cus_", "A Stripe customer identifier (`cus_...`).");
stripe_id_type!(
    PaymentMethodId,
    "pm_",
    "A Stripe payment method identifier (`pm_...`).\n\nTest tokens such as `pm_card_visa` share the prefix and are accepted."
);
stripe_id_type!(PaymentIntentId, "pi_", "A Stripe payment intent identifier (`pi_...`).");

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input does not start with the expected prefix.
    #[error("expected identifier starting with {expected:?}, got {value:?}")]
    WrongPrefix {
        /// The required prefix.
        expected: &'static str,
        /// The rejected input.
        value: String,
    },

    /// The input has an empty body or characters outside `[A-Za-z0-9_]`.
    #[error("invalid identifier: {0:?}")]
    InvalidCharacters(String),
}
