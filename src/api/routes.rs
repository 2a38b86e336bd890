use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{AppState, admin, graph, matches, players};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/save-match", post(matches::save_match))
        .route("/api/players", get(players::get_players))
        .route("/api/graph", get(graph::get_graph))
        .route("/api/clusters", get(graph::get_clusters))
        .route("/api/countries", post(admin::assign_countries))
        .route("/api/countries/summary", get(players::get_country_summary))
        .route("/api/admin/rebuild", post(admin::rebuild))
        .with_state(state)
}
