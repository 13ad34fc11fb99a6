//! Server-side order amounts.

use serde::Serialize;

/// Price of the demo order in cents.
pub const ORDER_AMOUNT_CENTS: i64 = 1400;

/// Currency every order is charged in.
pub const ORDER_CURRENCY: &str = "usd";

/// An amount to charge, in the smallest currency unit.
///
/// There is deliberately no constructor that takes request input: the only
/// way to obtain an `OrderAmount` outside of tests is [`OrderAmount::for_order`],
/// which recomputes the total on the server for every charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OrderAmount(i64);

impl OrderAmount {
    /// Compute the amount for the current order.
    ///
    /// The demo sells a single fixed-price item.
    #[must_use]
    pub const fn for_order() -> Self {
        Self(ORDER_AMOUNT_CENTS)
    }

    /// Amount in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// ISO currency code, lowercase as Stripe expects it.
    #[must_use]
    pub const fn currency(self) -> &'static str {
        ORDER_CURRENCY
    }
}

impl std::fmt::Display for OrderAmount {
    #[allow(clippy::cast_precision_loss)]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${:.2}", self.0 as f64 / 100.0)
    }
}
