use serde::Serialize;

/// Per-node enrichment pulled from the player store. Scores are already
/// read-normalized where applicable.
#[derive(Debug, Clone)]
pub struct NodeMeta {
    pub label: String,
    pub feedscore: Option<f64>,
    pub opscore: Option<f64>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub cluster: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedscore: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opscore: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub weight: u32,
}

/// One connected cluster of the filtered graph, with the member list and
/// display names the country classifier consumes, plus the stand-out
/// members the renderer highlights.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterSummary {
    pub id: usize,
    pub members: Vec<String>,
    pub names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_op: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worst_feed: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub num_clusters: usize,
    pub min_weight: u32,
    pub connected_only: bool,
}

/// Serializable co-play graph handed to the rendering collaborator.
/// Layout and visualization are out of scope here.
#[derive(Debug, Clone, Serialize)]
pub struct GraphDocument {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub clusters: Vec<ClusterSummary>,
    pub stats: GraphStats,
}
