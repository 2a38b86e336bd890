//! Streaming per-player aggregation over the match corpus.
//!
//! A full rebuild owns one `Accumulator`, feeds every valid match through it
//! and flushes the finalized averages to the store in a single transaction.
//! The accumulator is plain local state; nothing here is shared or global.

use std::collections::HashMap;

use log::warn;

use crate::config::settings::ScoreSettings;
use crate::domain::MatchDocument;
use crate::scoring;

/// Running sums for one player while a rebuild pass is in flight.
#[derive(Debug, Clone, Default)]
struct PlayerAccum {
    names: Vec<String>,
    feed_sum: f64,
    op_sum: f64,
    match_count: i64,
}

/// Finalized per-player aggregate: raw per-match averages, ready for the
/// store. Normalization onto the 0-10 band happens at read time only.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerAggregate {
    pub puuid: String,
    pub names: Vec<String>,
    pub avg_feedscore: f64,
    pub avg_opscore: f64,
    pub match_count: i64,
}

#[derive(Debug, Default)]
pub struct Accumulator {
    players: HashMap<String, PlayerAccum>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one match's participants into the running sums. Returns the
    /// number of participants whose score computation failed; the match
    /// itself is never aborted for one bad participant.
    pub fn observe_match(&mut self, document: &MatchDocument, settings: &ScoreSettings) -> usize {
        let mut participants_skipped = 0;

        for participant in &document.info.participants {
            let scores =
                match scoring::score_participant(participant, document.info.game_duration, settings)
                {
                    Ok(scores) => scores,
                    Err(e) => {
                        warn!(
                            "Skipping participant {} in {}: {e:#}",
                            participant.puuid, document.metadata.match_id
                        );
                        participants_skipped += 1;
                        continue;
                    }
                };

            let entry = self.players.entry(participant.puuid.clone()).or_default();
            push_name_variant(&mut entry.names, participant.display_name());
            entry.feed_sum += scores.feed;
            entry.op_sum += scores.op;
            entry.match_count += 1;
        }

        participants_skipped
    }

    pub fn unique_players(&self) -> usize {
        self.players.len()
    }

    /// Divide the sums by the match count. Ordered by puuid so a rebuild of
    /// an unchanged corpus reproduces identical output.
    pub fn finalize(self) -> Vec<PlayerAggregate> {
        let mut aggregates: Vec<PlayerAggregate> = self
            .players
            .into_iter()
            .filter(|(_, accum)| accum.match_count > 0)
            .map(|(puuid, accum)| {
                let count = accum.match_count as f64;
                PlayerAggregate {
                    puuid,
                    names: accum.names,
                    avg_feedscore: accum.feed_sum / count,
                    avg_opscore: accum.op_sum / count,
                    match_count: accum.match_count,
                }
            })
            .collect();

        aggregates.sort_by(|a, b| a.puuid.cmp(&b.puuid));
        aggregates
    }
}

/// Recompute a stored running average with one more observation.
/// The incremental-upsert counterpart of the full pass's sum-then-divide.
pub fn merge_running_average(old_average: f64, old_count: i64, new_value: f64) -> f64 {
    (old_average * old_count as f64 + new_value) / (old_count + 1) as f64
}

/// Union a display-name variant into the list, newest last, no duplicates.
pub fn push_name_variant(names: &mut Vec<String>, name: String) {
    if let Some(pos) = names.iter().position(|n| *n == name) {
        // Re-seen variant becomes the most recent again.
        names.remove(pos);
    }
    names.push(name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MatchInfo, MatchMetadata, ParticipantRecord};

    fn settings() -> ScoreSettings {
        ScoreSettings::default()
    }

    fn participant(puuid: &str, name: &str, kills: u32) -> ParticipantRecord {
        let (game, tag) = name.split_once('#').unwrap();
        serde_json::from_value(serde_json::json!({
            "puuid": puuid,
            "riotIdGameName": game,
            "riotIdTagline": tag,
            "kills": kills,
            "deaths": 4,
            "assists": 6,
            "goldEarned": 9000,
            "visionScore": 20.0,
        }))
        .unwrap()
    }

    fn match_of(id: &str, participants: Vec<ParticipantRecord>) -> MatchDocument {
        MatchDocument {
            metadata: MatchMetadata {
                match_id: id.to_string(),
            },
            info: MatchInfo {
                game_duration: 1800,
                participants,
            },
        }
    }

    fn ten_distinct() -> Vec<ParticipantRecord> {
        (0..10)
            .map(|i| participant(&format!("p{i}"), &format!("Name{i}#EUW"), i as u32))
            .collect()
    }

    #[test]
    fn every_valid_match_contributes_ten_observations() {
        let mut acc = Accumulator::new();
        for m in 0..3 {
            acc.observe_match(&match_of(&format!("EUN1_{m}"), ten_distinct()), &settings());
        }

        let total: i64 = acc.finalize().iter().map(|a| a.match_count).sum();
        assert_eq!(total, 30);
    }

    #[test]
    fn recurring_player_is_averaged_not_double_counted() {
        let mut acc = Accumulator::new();
        acc.observe_match(&match_of("EUN1_1", ten_distinct()), &settings());
        acc.observe_match(&match_of("EUN1_2", ten_distinct()), &settings());

        let aggregates = acc.finalize();
        assert_eq!(aggregates.len(), 10);
        for aggregate in &aggregates {
            assert_eq!(aggregate.match_count, 2);
        }
    }

    #[test]
    fn name_variants_union_into_one_aggregate() {
        let mut one = ten_distinct();
        one[0] = participant("p0", "Alice#EUW", 3);
        let mut two = ten_distinct();
        two[0] = participant("p0", "Alice#NA1", 3);

        let mut acc = Accumulator::new();
        acc.observe_match(&match_of("EUN1_1", one), &settings());
        acc.observe_match(&match_of("EUN1_2", two), &settings());

        let aggregates = acc.finalize();
        let alice = aggregates.iter().find(|a| a.puuid == "p0").unwrap();
        assert_eq!(alice.match_count, 2);
        assert_eq!(alice.names, vec!["Alice#EUW".to_string(), "Alice#NA1".to_string()]);
    }

    #[test]
    fn finalize_is_deterministic_for_a_fixed_corpus() {
        let build = || {
            let mut acc = Accumulator::new();
            acc.observe_match(&match_of("EUN1_1", ten_distinct()), &settings());
            acc.finalize()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn running_average_merge_matches_full_recompute() {
        // avg of [3, 5, 10] built incrementally
        let avg = merge_running_average(3.0, 1, 5.0);
        let avg = merge_running_average(avg, 2, 10.0);
        assert!((avg - 6.0).abs() < 1e-9);
    }
}
