use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

use super::models::PlayerRow;

const PLAYER_COLUMNS: &str =
    "puuid, names, feedscore, opscore, country, match_count, created_at, updated_at";

/// Insert-or-replace a player aggregate. A single statement, so the row is
/// never observable with sums updated but count stale. `country` and
/// `created_at` are preserved on conflict; only the classifier writes country.
pub fn upsert_aggregate(
    conn: &Connection,
    puuid: &str,
    names: &[String],
    feedscore: f64,
    opscore: f64,
    match_count: i64,
) -> Result<()> {
    let names_json = serde_json::to_string(names).context("Failed to serialize player names")?;
    let sql = "INSERT INTO players (puuid, names, feedscore, opscore, match_count) \
               VALUES (?1, ?2, ?3, ?4, ?5) \
               ON CONFLICT(puuid) DO UPDATE SET \
                   names = excluded.names, \
                   feedscore = excluded.feedscore, \
                   opscore = excluded.opscore, \
                   match_count = excluded.match_count, \
                   updated_at = CURRENT_TIMESTAMP";

    conn.execute(sql, params![puuid, names_json, feedscore, opscore, match_count])
        .with_context(|| format!("Failed to upsert player {puuid}"))?;
    Ok(())
}

pub fn find_by_puuid(conn: &Connection, puuid: &str) -> Result<Option<PlayerRow>> {
    let sql = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE puuid = ?1");

    conn.query_row(&sql, params![puuid], parse_player_row)
        .optional()
        .context("Failed to query player by puuid")
}

pub fn list_all(conn: &Connection) -> Result<Vec<PlayerRow>> {
    let sql = format!("SELECT {PLAYER_COLUMNS} FROM players ORDER BY puuid");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to list players")?;

    Ok(rows)
}

/// Zero the score columns for every row without touching `country`.
/// Run at the start of a full rebuild, inside the rebuild's transaction.
pub fn reset_scores(conn: &Connection) -> Result<usize> {
    conn.execute(
        "UPDATE players SET feedscore = 0, opscore = 0, match_count = 0, \
         updated_at = CURRENT_TIMESTAMP",
        [],
    )
    .context("Failed to reset player scores")
}

/// Write-back from the external country classifier. Contents are stored
/// verbatim; unknown puuids are ignored. Returns rows updated.
pub fn set_country(conn: &Connection, puuid: &str, country: &str) -> Result<usize> {
    conn.execute(
        "UPDATE players SET country = ?1, updated_at = CURRENT_TIMESTAMP WHERE puuid = ?2",
        params![country, puuid],
    )
    .with_context(|| format!("Failed to set country for player {puuid}"))
}

/// Explicit, separate from `reset_scores`: clearing classifications is an
/// intentional operation, never a rebuild side effect.
pub fn clear_countries(conn: &Connection) -> Result<usize> {
    conn.execute(
        "UPDATE players SET country = NULL, updated_at = CURRENT_TIMESTAMP",
        [],
    )
    .context("Failed to clear player countries")
}

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<PlayerRow> {
    let names_json: String = row.get(1)?;
    Ok(PlayerRow {
        puuid: row.get(0)?,
        names: serde_json::from_str(&names_json).unwrap_or_default(),
        feedscore: row.get(2)?,
        opscore: row.get(3)?,
        country: row.get(4)?,
        match_count: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
