use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};

use super::AppState;
use crate::api::models::SaveMatchResponse;
use crate::corpus::CorpusReader;
use crate::domain::MatchDocument;
use crate::services::pipeline::{IngestOutcome, PipelineService};

/// Accept one raw match document from the collector: persist it to the
/// corpus, then fold it into the stored aggregates. Duplicate match ids are
/// acknowledged without re-counting; a failed aggregation rolls the saved
/// file back so the collector can retry.
pub async fn save_match(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<serde_json::Value>,
) -> impl IntoResponse {
    let document: MatchDocument = match serde_json::from_value(payload) {
        Ok(document) => document,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, format!("Invalid match document: {e}"))
                .into_response();
        }
    };
    if !document.is_valid() {
        return (
            StatusCode::BAD_REQUEST,
            "Match document fails structural checks".to_string(),
        )
            .into_response();
    }

    let Ok(_guard) = state.run_lock.try_lock() else {
        return (StatusCode::CONFLICT, "Busy: another run is in progress").into_response();
    };

    let config = state.config.clone();
    let pool = state.pool.clone();
    let match_id = document.metadata.match_id.clone();
    let result = tokio::task::spawn_blocking(move || -> anyhow::Result<SaveMatchResponse> {
        let reader = CorpusReader::new(config.match_data_dir())?;
        let service = PipelineService::with_pool(config, pool)?;
        let response = match service.ingest_match(&reader, &document)? {
            IngestOutcome::Duplicate => SaveMatchResponse {
                status: "duplicate",
                match_id: document.metadata.match_id.clone(),
                upsert: None,
            },
            IngestOutcome::Saved(summary) => SaveMatchResponse {
                status: "saved",
                match_id: document.metadata.match_id.clone(),
                upsert: Some(summary),
            },
        };
        Ok(response)
    })
    .await;

    match result {
        Ok(Ok(response)) => (StatusCode::CREATED, Json(response)).into_response(),
        Ok(Err(e)) => {
            log::error!("Failed to save match {match_id}: {e:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Save failed: {e:#}")).into_response()
        }
        Err(e) => {
            log::error!("Save task panicked for match {match_id}: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
