/// Calibration weights for the per-match score formulas.
#[derive(Debug, Clone)]
pub struct ScoreSettings {
    pub feed_kill_participation_weight: f64,
    pub op_assist_weight: f64,
    pub op_vision_weight: f64,
}

impl Default for ScoreSettings {
    fn default() -> Self {
        Self {
            feed_kill_participation_weight: 0.35,
            op_assist_weight: 0.965,
            op_vision_weight: 0.15,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GraphSettings {
    pub default_min_edge_weight: u32,
    pub min_cluster_size: usize,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            default_min_edge_weight: 2,
            min_cluster_size: 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub database_path: String,
    pub match_data_dir: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_path: "coplay.db".to_string(),
            match_data_dir: "data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub score: ScoreSettings,
    pub graph: GraphSettings,
    pub storage: StorageSettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Database path, overridable via DATABASE_PATH.
    pub fn database_path(&self) -> String {
        std::env::var("DATABASE_PATH").unwrap_or_else(|_| self.storage.database_path.clone())
    }

    /// Match corpus directory, overridable via MATCH_DATA_DIR.
    pub fn match_data_dir(&self) -> String {
        std::env::var("MATCH_DATA_DIR").unwrap_or_else(|_| self.storage.match_data_dir.clone())
    }
}
