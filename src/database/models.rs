use chrono::NaiveDateTime;

/// One row of the players table. `feedscore` and `opscore` hold RAW running
/// per-match averages; grading onto the 0-10 band happens at read time.
#[derive(Debug, Clone)]
pub struct PlayerRow {
    pub puuid: String,
    /// Name variants in first-seen order; the last entry is the most recent.
    pub names: Vec<String>,
    pub feedscore: f64,
    pub opscore: f64,
    pub country: Option<String>,
    pub match_count: i64,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl PlayerRow {
    /// Most recent display name, falling back to the unknown sentinel.
    pub fn latest_name(&self) -> &str {
        self.names
            .last()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(crate::domain::models::UNKNOWN_NAME)
    }
}
