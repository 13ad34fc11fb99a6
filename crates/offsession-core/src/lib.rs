//! Core types for the off-session charge service.
//!
//! - **Identifiers**: `CustomerId`, `PaymentMethodId`, `PaymentIntentId`
//! - **Amounts**: `OrderAmount`, always computed on the server
//! - **Outcomes**: `ChargeOutcome`, `CardSummary`
//!
//! Amounts are `i64` cents, matching what Stripe sends and receives.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod amount;
pub mod ids;
pub mod outcome;

pub use amount::{OrderAmount, ORDER_AMOUNT_CENTS, ORDER_CURRENCY};
pub use ids::{CustomerId, IdError, PaymentIntentId, PaymentMethodId};
pub use outcome::{CardSummary, ChargeOutcome, AUTHENTICATION_REQUIRED};
