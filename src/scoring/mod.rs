//! Per-match score formulas and the calibrated 0-10 grading band.

use anyhow::{Result, bail};

use crate::config::settings::ScoreSettings;
use crate::domain::ParticipantRecord;

/// Calibrated anchors mapping a per-player averaged raw opscore to a grade.
/// Monotonically decreasing in both score and grade.
const OPSCORE_ANCHORS: [(f64, f64); 11] = [
    (1252.11, 10.0),
    (874.65, 9.0),
    (751.02, 8.0),
    (675.50, 7.0),
    (600.0, 6.0),
    (512.91, 5.0),
    (424.93, 4.0),
    (350.0, 3.0),
    (280.0, 2.0),
    (220.0, 1.0),
    (146.92, 0.0),
];

/// Raw per-match scores for one participant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchScores {
    pub feed: f64,
    pub op: f64,
}

/// Deaths penalized against kill participation. Higher is worse. Not clamped,
/// may be negative.
pub fn raw_feed_score(kills: u32, deaths: u32, assists: u32, settings: &ScoreSettings) -> f64 {
    deaths as f64 - (kills + assists) as f64 * settings.feed_kill_participation_weight
}

/// Kill participation, gold rate and vision contribution. Higher is better.
/// Fails on non-positive durations instead of dividing by zero.
pub fn raw_op_score(
    kills: u32,
    assists: u32,
    gold_earned: u32,
    game_duration_secs: i64,
    vision_score: f64,
    settings: &ScoreSettings,
) -> Result<f64> {
    if game_duration_secs <= 0 {
        bail!("non-positive game duration: {game_duration_secs}s");
    }
    let minutes = game_duration_secs as f64 / 60.0;
    Ok(kills as f64
        + assists as f64 * settings.op_assist_weight
        + gold_earned as f64 / minutes
        + vision_score * settings.op_vision_weight)
}

/// Both raw scores for one participant of a match.
pub fn score_participant(
    participant: &ParticipantRecord,
    game_duration_secs: i64,
    settings: &ScoreSettings,
) -> Result<MatchScores> {
    let feed = raw_feed_score(
        participant.kills,
        participant.deaths,
        participant.assists,
        settings,
    );
    let op = raw_op_score(
        participant.kills,
        participant.assists,
        participant.gold_earned,
        game_duration_secs,
        participant.vision_score,
        settings,
    )?;
    Ok(MatchScores { feed, op })
}

/// Maps a per-player AVERAGED raw opscore onto [0, 10] by piecewise-linear
/// interpolation over the anchor table, clamped at both ends and rounded to
/// two decimals. Must never be fed a single-match raw value.
pub fn normalize_op_score(raw_average: f64) -> f64 {
    let (top_score, top_grade) = OPSCORE_ANCHORS[0];
    if raw_average >= top_score {
        return top_grade;
    }
    let (bottom_score, bottom_grade) = OPSCORE_ANCHORS[OPSCORE_ANCHORS.len() - 1];
    if raw_average <= bottom_score {
        return bottom_grade;
    }

    for window in OPSCORE_ANCHORS.windows(2) {
        let (upper_score, upper_grade) = window[0];
        let (lower_score, lower_grade) = window[1];
        if raw_average <= upper_score && raw_average > lower_score {
            let fraction = (raw_average - lower_score) / (upper_score - lower_score);
            let grade = lower_grade + fraction * (upper_grade - lower_grade);
            return round2(grade);
        }
    }

    // Unreachable given the clamps above, but never panic on a score.
    bottom_grade
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ScoreSettings {
        ScoreSettings::default()
    }

    #[test]
    fn feed_score_penalizes_deaths_against_kill_participation() {
        // 10 deaths, 4 kills + 6 assists => 10 - 10 * 0.35
        let score = raw_feed_score(4, 10, 6, &settings());
        assert!((score - 6.5).abs() < 1e-9);
    }

    #[test]
    fn feed_score_may_go_negative() {
        assert!(raw_feed_score(10, 0, 10, &settings()) < 0.0);
    }

    #[test]
    fn op_score_uses_gold_per_minute() {
        // 30 minute game: 12000 gold => 400 gold/min.
        let score = raw_op_score(5, 10, 12_000, 1800, 20.0, &settings()).unwrap();
        let expected = 5.0 + 10.0 * 0.965 + 400.0 + 20.0 * 0.15;
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn op_score_rejects_non_positive_duration() {
        assert!(raw_op_score(1, 1, 100, 0, 0.0, &settings()).is_err());
        assert!(raw_op_score(1, 1, 100, -5, 0.0, &settings()).is_err());
    }

    #[test]
    fn normalization_hits_exact_anchors() {
        assert_eq!(normalize_op_score(1252.11), 10.0);
        assert_eq!(normalize_op_score(146.92), 0.0);
        assert_eq!(normalize_op_score(424.93), 4.0);
        assert_eq!(normalize_op_score(600.0), 6.0);
    }

    #[test]
    fn normalization_clamps_outside_the_band() {
        assert_eq!(normalize_op_score(2000.0), 10.0);
        assert_eq!(normalize_op_score(0.0), 0.0);
        assert_eq!(normalize_op_score(-50.0), 0.0);
    }

    #[test]
    fn normalization_interpolates_between_anchors() {
        // Midpoint of the 424.93 -> 512.91 bracket lands halfway between the grades.
        let grade = normalize_op_score(468.92);
        assert_eq!(grade, 4.5);
        assert!(grade > 4.0 && grade < 5.0);
    }
}
