//! API handlers.

pub mod charges;
pub mod client_config;
pub mod health;
pub mod webhooks;
