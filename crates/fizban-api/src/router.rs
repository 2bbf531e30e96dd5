//! Axum router construction.
//!
//! Assembles the core routes, plus the routes of every enabled addon,
//! into a single [`Router`] with CORS and request tracing.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::addons;
use crate::handlers;
use crate::state::AppState;

/// Build the complete router.
///
/// Core routes:
/// - `GET /health`
/// - `GET /addons`
/// - `GET /npc/{name}`
/// - `POST /realm/selection`
/// - `POST /favor/apply`
/// - `POST /gossip/propagate`
/// - `GET /travel/options?from_location=X`
/// - `POST /travel/go`
/// - `GET /travel/where?actor=X`
/// - `GET /travel/log?limit=N`
///
/// Addon routes, mounted only when the addon is enabled:
/// - `GET /ping` (`example_ping`)
/// - `GET /addon/realm-lorkhan/ping` (`realm_lorkhan`)
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/health", get(handlers::health))
        .route("/addons", get(handlers::list_addons))
        .route("/npc/{name}", get(handlers::get_npc))
        .route("/realm/selection", post(handlers::realm_selection))
        .route("/favor/apply", post(handlers::favor_apply))
        .route("/gossip/propagate", post(handlers::gossip_propagate))
        .route("/travel/options", get(handlers::travel_options))
        .route("/travel/go", post(handlers::travel_go))
        .route("/travel/where", get(handlers::travel_where))
        .route("/travel/log", get(handlers::travel_log));

    if state.addons.is_enabled(addons::EXAMPLE_PING) {
        router = router.route("/ping", get(handlers::example_ping));
    }
    if state.addons.is_enabled(addons::REALM_LORKHAN) {
        router = router.route(
            "/addon/realm-lorkhan/ping",
            get(handlers::realm_lorkhan_ping),
        );
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
