use std::collections::HashMap;

use anyhow::Result;
use log::info;
use petgraph::visit::EdgeRef;

use crate::config::settings::AppConfig;
use crate::corpus::CorpusReader;
use crate::database::{self, DbPool, PlayerRow};
use crate::graph::clusters::{assign_clusters, summarize_clusters};
use crate::graph::document::{ClusterSummary, GraphStats};
use crate::graph::{EdgeAccumulator, GraphDocument, GraphEdge, GraphFilter, GraphNode, NodeMeta};
use crate::scoring;

/// Builds the serializable co-play graph: a read-only corpus pass plus node
/// enrichment from the player store. Never takes the run lock.
pub struct GraphService {
    config: AppConfig,
    pool: DbPool,
}

impl GraphService {
    pub fn new(config: AppConfig) -> Result<Self> {
        let pool = database::create_pool(&config.database_path())?;
        Self::with_pool(config, pool)
    }

    pub fn with_pool(config: AppConfig, pool: DbPool) -> Result<Self> {
        let conn = database::get_connection(&pool)?;
        database::setup::init_schema(&conn)?;
        Ok(Self { config, pool })
    }

    pub fn build(&self, filter: GraphFilter) -> Result<GraphDocument> {
        let reader = CorpusReader::new(self.config.match_data_dir())?;
        let mut matches = reader.scan()?;

        let mut accumulator = EdgeAccumulator::new();
        for document in matches.by_ref() {
            accumulator.observe_match(&document);
        }
        info!(
            "Graph pass over {} matches ({} skipped)",
            accumulator.matches_processed(),
            matches.skipped()
        );

        let coplay = accumulator.into_graph(filter);
        let assignment = assign_clusters(&coplay);
        let meta = self.load_node_meta()?;

        let nodes = build_nodes(&coplay, &assignment, &meta);
        let edges = build_edges(&coplay);
        let clusters = summarize_clusters(&assignment, &meta, self.config.graph.min_cluster_size);

        let stats = GraphStats {
            total_nodes: nodes.len(),
            total_edges: edges.len(),
            num_clusters: clusters.len(),
            min_weight: filter.min_weight,
            connected_only: filter.connected_only,
        };
        info!(
            "Graph: {} nodes, {} edges, {} clusters (min_weight={})",
            stats.total_nodes, stats.total_edges, stats.num_clusters, stats.min_weight
        );

        Ok(GraphDocument {
            nodes,
            edges,
            clusters,
            stats,
        })
    }

    /// Cluster membership with display names only, the batch the external
    /// country classifier consumes.
    pub fn cluster_batches(&self, min_weight: u32) -> Result<Vec<ClusterSummary>> {
        let document = self.build(GraphFilter {
            min_weight,
            connected_only: true,
        })?;
        Ok(document.clusters)
    }

    fn load_node_meta(&self) -> Result<HashMap<String, NodeMeta>> {
        let conn = database::get_connection(&self.pool)?;
        let rows = database::players::list_all(&conn)?;
        Ok(rows.into_iter().map(|row| (row.puuid.clone(), node_meta(row))).collect())
    }
}

/// Stored opscore holds a raw running average; grading happens here, at read.
fn node_meta(row: PlayerRow) -> NodeMeta {
    let opscore = (row.match_count > 0).then(|| scoring::normalize_op_score(row.opscore));
    let feedscore = (row.match_count > 0).then_some(row.feedscore);
    NodeMeta {
        label: row.latest_name().to_string(),
        feedscore,
        opscore,
        country: row.country,
    }
}

fn build_nodes(
    coplay: &crate::graph::CoPlayGraph,
    assignment: &HashMap<String, usize>,
    meta: &HashMap<String, NodeMeta>,
) -> Vec<GraphNode> {
    coplay
        .index
        .keys()
        .map(|puuid| {
            let node_meta = meta.get(puuid);
            GraphNode {
                id: puuid.clone(),
                label: node_meta
                    .map(|m| m.label.clone())
                    .unwrap_or_else(|| crate::domain::models::UNKNOWN_NAME.to_string()),
                cluster: assignment.get(puuid).copied().unwrap_or(0),
                feedscore: node_meta.and_then(|m| m.feedscore),
                opscore: node_meta.and_then(|m| m.opscore),
                country: node_meta.and_then(|m| m.country.clone()),
            }
        })
        .collect()
}

fn build_edges(coplay: &crate::graph::CoPlayGraph) -> Vec<GraphEdge> {
    coplay
        .graph
        .edge_references()
        .map(|edge| GraphEdge {
            source: coplay.graph[edge.source()].clone(),
            target: coplay.graph[edge.target()].clone(),
            weight: *edge.weight(),
        })
        .collect()
}
