use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};

use super::{AppState, GraphParams};
use crate::graph::GraphFilter;
use crate::services::graphing::GraphService;

pub async fn get_graph(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GraphParams>,
) -> impl IntoResponse {
    let filter = GraphFilter {
        min_weight: params
            .min_weight
            .unwrap_or(state.config.graph.default_min_edge_weight),
        connected_only: params.connected_only.unwrap_or(false),
    };

    let config = state.config.clone();
    let pool = state.pool.clone();
    let result = tokio::task::spawn_blocking(move || {
        let service = GraphService::with_pool(config, pool)?;
        service.build(filter)
    })
    .await;

    match result {
        Ok(Ok(document)) => Json(document).into_response(),
        Ok(Err(e)) => {
            log::error!("Graph build failed: {e:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Graph build failed: {e:#}"))
                .into_response()
        }
        Err(e) => {
            log::error!("Graph task panicked: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Cluster membership plus display names, the batch format consumed by the
/// external country classifier.
pub async fn get_clusters(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GraphParams>,
) -> impl IntoResponse {
    let min_weight = params
        .min_weight
        .unwrap_or(state.config.graph.default_min_edge_weight);

    let config = state.config.clone();
    let pool = state.pool.clone();
    let result = tokio::task::spawn_blocking(move || {
        let service = GraphService::with_pool(config, pool)?;
        service.cluster_batches(min_weight)
    })
    .await;

    match result {
        Ok(Ok(clusters)) => Json(clusters).into_response(),
        Ok(Err(e)) => {
            log::error!("Cluster build failed: {e:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Cluster build failed: {e:#}"))
                .into_response()
        }
        Err(e) => {
            log::error!("Cluster task panicked: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
