use serde::{Deserialize, Serialize};

/// Sentinel used when a participant has no riot id attached.
pub const UNKNOWN_NAME: &str = "Unknown#Unknown";

/// Number of participants a valid match document must carry.
pub const PARTICIPANTS_PER_MATCH: usize = 10;

/// Raw match document as produced by the collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchDocument {
    pub metadata: MatchMetadata,
    pub info: MatchInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchMetadata {
    #[serde(rename = "matchId")]
    pub match_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchInfo {
    /// Game duration in seconds.
    #[serde(rename = "gameDuration")]
    pub game_duration: i64,
    pub participants: Vec<ParticipantRecord>,
}

/// One participant entry, converted from the loosely-typed source document
/// with explicit defaults for optional fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub puuid: String,
    #[serde(rename = "riotIdGameName", default)]
    pub riot_id_game_name: Option<String>,
    #[serde(rename = "riotIdTagline", default)]
    pub riot_id_tagline: Option<String>,
    #[serde(default)]
    pub kills: u32,
    #[serde(default)]
    pub deaths: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(rename = "goldEarned", default)]
    pub gold_earned: u32,
    #[serde(rename = "visionScore", default)]
    pub vision_score: f64,
    #[serde(rename = "championId", default)]
    pub champion_id: i64,
    #[serde(rename = "summoner1Id", default)]
    pub summoner1_id: i64,
    #[serde(rename = "summoner2Id", default)]
    pub summoner2_id: i64,
    #[serde(rename = "teamId", default)]
    pub team_id: i64,
}

impl ParticipantRecord {
    /// Display name as "gameName#tagLine", falling back to the unknown sentinel.
    pub fn display_name(&self) -> String {
        match (&self.riot_id_game_name, &self.riot_id_tagline) {
            (Some(game), Some(tag)) if !game.is_empty() => format!("{game}#{tag}"),
            (Some(game), None) if !game.is_empty() => format!("{game}#Unknown"),
            _ => UNKNOWN_NAME.to_string(),
        }
    }
}

impl MatchDocument {
    /// Structural validity: the shape every downstream pass relies on.
    /// Non-positive durations are rejected here so score computation
    /// never divides by zero.
    pub fn is_valid(&self) -> bool {
        self.info.game_duration > 0
            && self.info.participants.len() == PARTICIPANTS_PER_MATCH
            && self.info.participants.iter().all(|p| !p.puuid.is_empty())
    }

    pub fn duration_minutes(&self) -> f64 {
        self.info.game_duration as f64 / 60.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(puuid: &str) -> ParticipantRecord {
        serde_json::from_value(serde_json::json!({ "puuid": puuid })).unwrap()
    }

    #[test]
    fn missing_optional_fields_default_to_zero() {
        let p = participant("abc");
        assert_eq!(p.kills, 0);
        assert_eq!(p.deaths, 0);
        assert_eq!(p.gold_earned, 0);
        assert_eq!(p.vision_score, 0.0);
        assert_eq!(p.display_name(), UNKNOWN_NAME);
    }

    #[test]
    fn display_name_joins_game_name_and_tag() {
        let p: ParticipantRecord = serde_json::from_value(serde_json::json!({
            "puuid": "abc",
            "riotIdGameName": "Alice",
            "riotIdTagline": "EUW",
        }))
        .unwrap();
        assert_eq!(p.display_name(), "Alice#EUW");
    }

    #[test]
    fn validity_rejects_zero_duration_and_wrong_participant_count() {
        let doc = MatchDocument {
            metadata: MatchMetadata {
                match_id: "EUN1_1".into(),
            },
            info: MatchInfo {
                game_duration: 0,
                participants: (0..10).map(|i| participant(&format!("p{i}"))).collect(),
            },
        };
        assert!(!doc.is_valid());

        let mut doc = doc;
        doc.info.game_duration = 1800;
        assert!(doc.is_valid());

        doc.info.participants.pop();
        assert!(!doc.is_valid());
    }
}
