use serde::Deserialize;
use tokio::sync::Mutex;

use crate::config::settings::AppConfig;
use crate::database::DbPool;

pub mod admin;
pub mod graph;
pub mod matches;
pub mod players;

pub struct AppState {
    pub pool: DbPool,
    pub config: AppConfig,
    /// Serializes full rebuilds against incremental upserts. A second
    /// conflicting request is rejected with 409 rather than interleaved
    /// with the rebuild's reset-then-write sequence.
    pub run_lock: Mutex<()>,
}

#[derive(Debug, Deserialize)]
pub struct GraphParams {
    pub min_weight: Option<u32>,
    pub connected_only: Option<bool>,
}
