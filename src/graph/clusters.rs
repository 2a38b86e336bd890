//! Cluster assignment over the filtered co-play graph: connected components,
//! with per-cluster stand-out members for the renderer and the name batches
//! the country classifier consumes.

use std::collections::HashMap;

use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;

use super::builder::CoPlayGraph;
use super::document::{ClusterSummary, NodeMeta};
use crate::domain::models::UNKNOWN_NAME;

/// Connected-component label per node, aligned with `graph.index` order
/// (sorted puuid order), so labels are dense and deterministic: the first
/// node of a component in puuid order fixes its cluster id.
pub fn assign_clusters(coplay: &CoPlayGraph) -> HashMap<String, usize> {
    let mut union_find = UnionFind::<usize>::new(coplay.graph.node_count());
    for edge in coplay.graph.edge_references() {
        union_find.union(edge.source().index(), edge.target().index());
    }

    let mut dense_ids: HashMap<usize, usize> = HashMap::new();
    let mut assignment = HashMap::new();
    for (puuid, &node_idx) in &coplay.index {
        let root = union_find.find(node_idx.index());
        let next_id = dense_ids.len();
        let cluster = *dense_ids.entry(root).or_insert(next_id);
        assignment.insert(puuid.clone(), cluster);
    }
    assignment
}

/// Group members per cluster and pick the highlights: highest normalized
/// opscore (`best_op`) and highest feedscore (`worst_feed`). Clusters below
/// `min_cluster_size` are omitted from the summaries (their nodes keep their
/// label in the graph document).
pub fn summarize_clusters(
    assignment: &HashMap<String, usize>,
    meta: &HashMap<String, NodeMeta>,
    min_cluster_size: usize,
) -> Vec<ClusterSummary> {
    let mut members_by_cluster: HashMap<usize, Vec<&String>> = HashMap::new();
    for (puuid, &cluster) in assignment {
        members_by_cluster.entry(cluster).or_default().push(puuid);
    }

    let mut summaries: Vec<ClusterSummary> = members_by_cluster
        .into_iter()
        .filter(|(_, members)| members.len() >= min_cluster_size)
        .map(|(id, mut members)| {
            members.sort();
            build_summary(id, &members, meta)
        })
        .collect();

    summaries.sort_by_key(|s| s.id);
    summaries
}

fn build_summary(id: usize, members: &[&String], meta: &HashMap<String, NodeMeta>) -> ClusterSummary {
    let mut best_op: Option<(&String, f64)> = None;
    let mut worst_feed: Option<(&String, f64)> = None;

    for &puuid in members {
        let Some(node_meta) = meta.get(puuid) else {
            continue;
        };
        if let Some(opscore) = node_meta.opscore {
            if best_op.is_none_or(|(_, best)| opscore > best) {
                best_op = Some((puuid, opscore));
            }
        }
        if let Some(feedscore) = node_meta.feedscore {
            if worst_feed.is_none_or(|(_, worst)| feedscore > worst) {
                worst_feed = Some((puuid, feedscore));
            }
        }
    }

    let names = members
        .iter()
        .map(|&puuid| {
            meta.get(puuid)
                .map(|m| m.label.clone())
                .unwrap_or_else(|| UNKNOWN_NAME.to_string())
        })
        .collect();

    ClusterSummary {
        id,
        members: members.iter().map(|&m| m.clone()).collect(),
        names,
        best_op: best_op.map(|(puuid, _)| puuid.clone()),
        worst_feed: worst_feed.map(|(puuid, _)| puuid.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MatchDocument, MatchInfo, MatchMetadata, ParticipantRecord};
    use crate::graph::builder::{EdgeAccumulator, GraphFilter};

    fn match_with(id: &str, puuids: &[&str]) -> MatchDocument {
        let participants = puuids
            .iter()
            .map(|p| {
                serde_json::from_value::<ParticipantRecord>(serde_json::json!({ "puuid": p }))
                    .unwrap()
            })
            .collect();
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

    fn meta(label: &str, feed: f64, op: f64) -> NodeMeta {
        NodeMeta {
            label: label.to_string(),
            feedscore: Some(feed),
            opscore: Some(op),
            country: None,
        }
    }

    #[test]
    fn two_disjoint_matches_form_two_clusters() {
        let a: Vec<String> = (0..10).map(|i| format!("a{i}")).collect();
        let b: Vec<String> = (0..10).map(|i| format!("b{i}")).collect();
        let refs_a: Vec<&str> = a.iter().map(String::as_str).collect();
        let refs_b: Vec<&str> = b.iter().map(String::as_str).collect();

        let mut acc = EdgeAccumulator::new();
        acc.observe_match(&match_with("EUN1_1", &refs_a));
        acc.observe_match(&match_with("EUN1_2", &refs_b));
        let graph = acc.into_graph(GraphFilter::default());

        let assignment = assign_clusters(&graph);
        let cluster_a = assignment["a0"];
        let cluster_b = assignment["b0"];
        assert_ne!(cluster_a, cluster_b);
        assert!(a.iter().all(|p| assignment[p] == cluster_a));
        assert!(b.iter().all(|p| assignment[p] == cluster_b));
    }

    #[test]
    fn cluster_assignment_is_deterministic() {
        let build = || {
            let mut acc = EdgeAccumulator::new();
            acc.observe_match(&match_with("EUN1_1", &["c", "a", "b", "z", "y", "x"]));
            acc.observe_match(&match_with("EUN1_2", &["q", "r"]));
            assign_clusters(&acc.into_graph(GraphFilter::default()))
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn summaries_pick_best_op_and_worst_feed() {
        let mut acc = EdgeAccumulator::new();
        acc.observe_match(&match_with("EUN1_1", &["a", "b", "c"]));
        let graph = acc.into_graph(GraphFilter::default());
        let assignment = assign_clusters(&graph);

        let mut lookup = HashMap::new();
        lookup.insert("a".to_string(), meta("A#1", 1.0, 3.0));
        lookup.insert("b".to_string(), meta("B#1", 9.0, 5.5));
        lookup.insert("c".to_string(), meta("C#1", 4.0, 9.9));

        let summaries = summarize_clusters(&assignment, &lookup, 2);
        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.members, vec!["a", "b", "c"]);
        assert_eq!(summary.names, vec!["A#1", "B#1", "C#1"]);
        assert_eq!(summary.best_op.as_deref(), Some("c"));
        assert_eq!(summary.worst_feed.as_deref(), Some("b"));
    }

    #[test]
    fn singleton_clusters_are_left_out_of_summaries() {
        // a-b co-occur twice and survive min_weight 2; the lone pair does not.
        let mut acc = EdgeAccumulator::new();
        acc.observe_match(&match_with("EUN1_1", &["a", "b"]));
        acc.observe_match(&match_with("EUN1_2", &["a", "b"]));
        acc.observe_match(&match_with("EUN1_3", &["lone", "other"]));
        let filtered = acc.into_graph(GraphFilter {
            min_weight: 2,
            connected_only: false,
        });

        let assignment = assign_clusters(&filtered);
        let summaries = summarize_clusters(&assignment, &HashMap::new(), 2);

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].members, vec!["a", "b"]);
    }
}
