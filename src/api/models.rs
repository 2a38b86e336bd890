use serde::Serialize;

use crate::database::PlayerRow;
use crate::scoring;
use crate::services::pipeline::UpsertSummary;

/// Player aggregate as served to collaborators: the stored raw running
/// average opscore is graded onto the 0-10 band here, at read time. Rows
/// zeroed by a score reset carry no grade, so their opscore is null.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub puuid: String,
    pub names: Vec<String>,
    pub latest_name: String,
    pub feedscore: f64,
    pub opscore: Option<f64>,
    pub match_count: i64,
    pub country: Option<String>,
}

impl From<PlayerRow> for PlayerView {
    fn from(row: PlayerRow) -> Self {
        Self {
            latest_name: row.latest_name().to_string(),
            opscore: (row.match_count > 0).then(|| scoring::normalize_op_score(row.opscore)),
            puuid: row.puuid,
            names: row.names,
            feedscore: row.feedscore,
            match_count: row.match_count,
            country: row.country,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SaveMatchResponse {
    pub status: &'static str,
    pub match_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upsert: Option<UpsertSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountrySummary {
    pub country: String,
    pub player_count: usize,
    pub avg_feedscore: f64,
    pub avg_opscore: f64,
    pub total_matches: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountryAssignmentResponse {
    pub players_updated: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(opscore: f64, match_count: i64) -> PlayerRow {
        PlayerRow {
            puuid: "p0".to_string(),
            names: vec!["P0#EUW".to_string()],
            feedscore: 0.0,
            opscore,
            country: None,
            match_count,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn view_grades_opscore_for_aggregated_rows() {
        let view = PlayerView::from(row(600.0, 5));
        assert_eq!(view.opscore, Some(6.0));
    }

    #[test]
    fn view_serves_null_opscore_for_zeroed_rows() {
        let view = PlayerView::from(row(0.0, 0));
        assert_eq!(view.opscore, None);
        let json = serde_json::to_value(&view).unwrap();
        assert!(json["opscore"].is_null());
    }
}
