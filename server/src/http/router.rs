use crate::http::checkout;
use axum::{Router, extract::FromRef, routing::post};
use std::sync::Arc;

use super::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

impl FromRef<AppState> for Arc<Config> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/checkout/direct", post(checkout::handle_direct))
        .route("/checkout/express", post(checkout::handle_express))
        .route("/checkout/express/capture", post(checkout::handle_capture))
        .route("/checkout/form", post(checkout::handle_form))
        .with_state(state)
}
