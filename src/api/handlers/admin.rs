use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};

use super::AppState;
use crate::api::models::CountryAssignmentResponse;
use crate::services::pipeline::PipelineService;

/// Trigger a full rebuild and report its summary synchronously. Rejected
/// with 409 while another rebuild or upsert holds the run lock.
pub async fn rebuild(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let Ok(_guard) = state.run_lock.try_lock() else {
        return (StatusCode::CONFLICT, "Busy: another run is in progress").into_response();
    };

    let config = state.config.clone();
    let pool = state.pool.clone();
    let result = tokio::task::spawn_blocking(move || {
        let service = PipelineService::with_pool(config, pool)?;
        service.run_full_rebuild()
    })
    .await;

    match result {
        Ok(Ok(summary)) => Json(summary).into_response(),
        Ok(Err(e)) => {
            log::error!("Rebuild failed: {e:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Rebuild failed: {e:#}")).into_response()
        }
        Err(e) => {
            log::error!("Rebuild task panicked: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Country classifier write-back: a `puuid -> country` mapping, stored
/// verbatim into the players table. Shares the run lock with rebuilds and
/// upserts so a write never races a rebuild's transaction.
pub async fn assign_countries(
    State(state): State<Arc<AppState>>,
    Json(mapping): Json<HashMap<String, String>>,
) -> impl IntoResponse {
    let Ok(_guard) = state.run_lock.try_lock() else {
        return (StatusCode::CONFLICT, "Busy: another run is in progress").into_response();
    };

    let config = state.config.clone();
    let pool = state.pool.clone();
    let result = tokio::task::spawn_blocking(move || {
        let service = PipelineService::with_pool(config, pool)?;
        service.assign_countries(&mapping)
    })
    .await;

    match result {
        Ok(Ok(players_updated)) => Json(CountryAssignmentResponse { players_updated }).into_response(),
        Ok(Err(e)) => {
            log::error!("Country assignment failed: {e:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Assignment failed: {e:#}")).into_response()
        }
        Err(e) => {
            log::error!("Country assignment task panicked: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Mutex;

    use crate::config::settings::{AppConfig, StorageSettings};
    use crate::database;

    struct Fixture {
        _db_dir: tempfile::TempDir,
        _data_dir: tempfile::TempDir,
        state: Arc<AppState>,
    }

    fn fixture() -> Fixture {
        let db_dir = tempfile::tempdir().unwrap();
        let data_dir = tempfile::tempdir().unwrap();
        let db_path = db_dir.path().join("players.db");

        let mut config = AppConfig::new();
        config.storage = StorageSettings {
            database_path: db_path.to_str().unwrap().to_string(),
            match_data_dir: data_dir.path().to_str().unwrap().to_string(),
        };

        let pool = database::create_pool(&config.database_path()).unwrap();
        Fixture {
            _db_dir: db_dir,
            _data_dir: data_dir,
            state: Arc::new(AppState {
                pool,
                config,
                run_lock: Mutex::new(()),
            }),
        }
    }

    #[tokio::test]
    async fn country_assignment_is_rejected_while_a_run_holds_the_lock() {
        let f = fixture();
        let _guard = f.state.run_lock.try_lock().unwrap();

        let response = assign_countries(State(f.state.clone()), Json(HashMap::new()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn country_assignment_releases_the_lock_when_done() {
        let f = fixture();

        let response = assign_countries(State(f.state.clone()), Json(HashMap::new()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(f.state.run_lock.try_lock().is_ok());
    }
}
