use axum::Router;

use crate::{admin, health, quote, shop, state::AppState};

/// The full HTTP surface: health probe plus the versioned JSON API.
pub fn app(state: AppState) -> Router {
    let gateway = state.gateway.clone();
    Router::new()
        .merge(quote::router())
        .merge(shop::router())
        .merge(admin::router())
        .with_state(state)
        .merge(health::router(gateway))
}
