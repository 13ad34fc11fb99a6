//! Browser client configuration.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Values the browser needs to initialise Stripe.js.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfigResponse {
    /// Stripe publishable key.
    pub public_key: Option<String>,
}

/// Return the publishable key.
pub async fn client_config(State(state): State<Arc<AppState>>) -> Json<ClientConfigResponse> {
    Json(ClientConfigResponse {
        public_key: state.config.stripe_publishable_key.clone(),
    })
}
