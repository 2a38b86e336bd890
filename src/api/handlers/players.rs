use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};

use super::AppState;
use crate::api::models::{CountrySummary, PlayerView};
use crate::database::{self, PlayerRow};

pub async fn get_players(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match load_rows(&state) {
        Ok(rows) => {
            let players: Vec<PlayerView> = rows.into_iter().map(PlayerView::from).collect();
            Json(players).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e:#}")).into_response(),
    }
}

pub async fn get_country_summary(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match load_rows(&state) {
        Ok(rows) => Json(summarize_countries(rows)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Query error: {e:#}")).into_response(),
    }
}

fn load_rows(state: &AppState) -> anyhow::Result<Vec<PlayerRow>> {
    let conn = database::get_connection(&state.pool)?;
    database::players::list_all(&conn)
}

/// Per-country means over classified players, on read-normalized scores.
/// Rows zeroed by a score reset carry no signal and are left out.
fn summarize_countries(rows: Vec<PlayerRow>) -> Vec<CountrySummary> {
    let mut by_country: HashMap<String, Vec<PlayerView>> = HashMap::new();
    for row in rows {
        if row.match_count == 0 {
            continue;
        }
        let Some(country) = row.country.clone().filter(|c| !c.is_empty()) else {
            continue;
        };
        by_country.entry(country).or_default().push(PlayerView::from(row));
    }

    let mut summaries: Vec<CountrySummary> = by_country
        .into_iter()
        .map(|(country, players)| {
            let count = players.len() as f64;
            CountrySummary {
                country,
                player_count: players.len(),
                avg_feedscore: players.iter().map(|p| p.feedscore).sum::<f64>() / count,
                avg_opscore: players.iter().filter_map(|p| p.opscore).sum::<f64>() / count,
                total_matches: players.iter().map(|p| p.match_count).sum(),
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.avg_opscore
            .partial_cmp(&a.avg_opscore)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    summaries
}
