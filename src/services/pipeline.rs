use std::collections::HashMap;

use anyhow::Result;
use log::info;
use serde::Serialize;

use crate::aggregate::{Accumulator, merge_running_average, push_name_variant};
use crate::config::settings::AppConfig;
use crate::corpus::{CorpusReader, SaveOutcome};
use crate::database::{self, DbPool, PlayerRow};
use crate::domain::MatchDocument;
use crate::scoring;

/// Result of a full rebuild, reported back to the caller for observability.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub matches_processed: usize,
    pub documents_skipped: usize,
    pub participants_skipped: usize,
    pub unique_players: usize,
}

/// Result of folding one match into the store incrementally.
#[derive(Debug, Clone, Serialize)]
pub struct UpsertSummary {
    pub players_created: usize,
    pub players_updated: usize,
    pub participants_skipped: usize,
}

/// Result of persisting and aggregating one incoming match.
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    Saved(UpsertSummary),
    Duplicate,
}

/// Aggregation entry points: full rebuild and incremental upsert share this
/// service; the server serializes conflicting runs with its run lock.
pub struct PipelineService {
    config: AppConfig,
    pool: DbPool,
}

impl PipelineService {
    pub fn new(config: AppConfig) -> Result<Self> {
        let pool = database::create_pool(&config.database_path())?;
        Self::with_pool(config, pool)
    }

    pub fn with_pool(config: AppConfig, pool: DbPool) -> Result<Self> {
        let conn = database::get_connection(&pool)?;
        database::setup::init_schema(&conn)?;
        Ok(Self { config, pool })
    }

    /// Recompute every player aggregate from the whole corpus. One streaming
    /// pass into a locally-owned accumulator, then one transaction: score
    /// reset plus all row writes commit together or not at all, so a storage
    /// failure never leaves a half-written run. Idempotent on an unchanged
    /// corpus.
    pub fn run_full_rebuild(&self) -> Result<RunSummary> {
        info!("=== Starting full rebuild ===");

        let reader = CorpusReader::new(self.config.match_data_dir())?;
        let mut matches = reader.scan()?;

        let mut accumulator = Accumulator::new();
        let mut matches_processed = 0;
        let mut participants_skipped = 0;
        for document in matches.by_ref() {
            participants_skipped += accumulator.observe_match(&document, &self.config.score);
            matches_processed += 1;
        }
        let documents_skipped = matches.skipped();
        let aggregates = accumulator.finalize();

        info!(
            "  → {} matches aggregated into {} players ({} documents skipped)",
            matches_processed,
            aggregates.len(),
            documents_skipped
        );

        let mut conn = database::get_connection(&self.pool)?;
        let tx = conn.transaction()?;
        database::players::reset_scores(&tx)?;
        for aggregate in &aggregates {
            database::players::upsert_aggregate(
                &tx,
                &aggregate.puuid,
                &aggregate.names,
                aggregate.avg_feedscore,
                aggregate.avg_opscore,
                aggregate.match_count,
            )?;
        }
        tx.commit()?;

        info!("=== Rebuild complete ===");
        Ok(RunSummary {
            matches_processed,
            documents_skipped,
            participants_skipped,
            unique_players: aggregates.len(),
        })
    }

    /// Persist one incoming match and fold it into the stored aggregates,
    /// keeping corpus and store in step. A match already on disk is
    /// acknowledged without re-counting; if the upsert fails after the save,
    /// the saved file is discarded so a client retry is not mistaken for a
    /// duplicate and stranded out of the aggregates.
    pub fn ingest_match(
        &self,
        reader: &CorpusReader,
        document: &MatchDocument,
    ) -> Result<IngestOutcome> {
        match reader.save_match(document)? {
            SaveOutcome::Duplicate => Ok(IngestOutcome::Duplicate),
            SaveOutcome::Saved => match self.run_incremental_upsert(document) {
                Ok(summary) => Ok(IngestOutcome::Saved(summary)),
                Err(e) => {
                    reader.discard_match(&document.metadata.match_id)?;
                    Err(e)
                }
            },
        }
    }

    /// Fold one newly-arrived match into the stored running averages.
    /// Callers must only hand over matches not yet on disk (the save path
    /// rejects duplicates by match id), otherwise a match would be counted
    /// twice. All ten row writes commit in one transaction, so a storage
    /// failure never leaves a match partially counted.
    pub fn run_incremental_upsert(&self, document: &MatchDocument) -> Result<UpsertSummary> {
        anyhow::ensure!(
            document.is_valid(),
            "match {} fails structural checks",
            document.metadata.match_id
        );

        let mut conn = database::get_connection(&self.pool)?;
        let tx = conn.transaction()?;
        let mut summary = UpsertSummary {
            players_created: 0,
            players_updated: 0,
            participants_skipped: 0,
        };

        for participant in &document.info.participants {
            let scores = match scoring::score_participant(
                participant,
                document.info.game_duration,
                &self.config.score,
            ) {
                Ok(scores) => scores,
                Err(e) => {
                    log::warn!(
                        "Skipping participant {} in {}: {e:#}",
                        participant.puuid,
                        document.metadata.match_id
                    );
                    summary.participants_skipped += 1;
                    continue;
                }
            };

            match database::players::find_by_puuid(&tx, &participant.puuid)? {
                None => {
                    database::players::upsert_aggregate(
                        &tx,
                        &participant.puuid,
                        &[participant.display_name()],
                        scores.feed,
                        scores.op,
                        1,
                    )?;
                    summary.players_created += 1;
                }
                Some(row) => {
                    let feedscore = merge_running_average(row.feedscore, row.match_count, scores.feed);
                    let opscore = merge_running_average(row.opscore, row.match_count, scores.op);
                    let mut names = row.names;
                    push_name_variant(&mut names, participant.display_name());
                    database::players::upsert_aggregate(
                        &tx,
                        &participant.puuid,
                        &names,
                        feedscore,
                        opscore,
                        row.match_count + 1,
                    )?;
                    summary.players_updated += 1;
                }
            }
        }
        tx.commit()?;

        info!(
            "Upserted match {}: {} created, {} updated",
            document.metadata.match_id, summary.players_created, summary.players_updated
        );
        Ok(summary)
    }

    /// Write-back from the country classifier: `puuid -> country`, stored
    /// verbatim. Returns how many rows were actually updated.
    pub fn assign_countries(&self, mapping: &HashMap<String, String>) -> Result<usize> {
        let conn = database::get_connection(&self.pool)?;
        let mut updated = 0;
        for (puuid, country) in mapping {
            updated += database::players::set_country(&conn, puuid, country)?;
        }
        info!("Assigned countries to {updated} of {} players", mapping.len());
        Ok(updated)
    }

    pub fn list_players(&self) -> Result<Vec<PlayerRow>> {
        let conn = database::get_connection(&self.pool)?;
        database::players::list_all(&conn)
    }
}
