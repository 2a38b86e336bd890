pub mod models;

pub use models::{MatchDocument, MatchInfo, MatchMetadata, ParticipantRecord};
