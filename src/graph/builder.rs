//! Co-play edge accumulation and weight/connectivity filtering.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use petgraph::graph::{NodeIndex, UnGraph};

use crate::domain::MatchDocument;

/// Composable filters applied after the full corpus pass.
#[derive(Debug, Clone, Copy)]
pub struct GraphFilter {
    /// Drop edges with a co-occurrence count below this. 1 keeps everything.
    pub min_weight: u32,
    /// Drop nodes left without any edge after weight filtering.
    pub connected_only: bool,
}

impl Default for GraphFilter {
    fn default() -> Self {
        Self {
            min_weight: 1,
            connected_only: false,
        }
    }
}

/// Weight counters keyed by unordered puuid pair, built in one pass over the
/// corpus. Ordered maps keep the downstream graph deterministic.
#[derive(Debug, Default)]
pub struct EdgeAccumulator {
    nodes: BTreeSet<String>,
    weights: BTreeMap<(String, String), u32>,
    matches_processed: usize,
}

impl EdgeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every unordered pair of distinct participants once for this
    /// match. Co-occurrence across N matches is one edge of weight N.
    /// Duplicate puuids within a match collapse to one participant so a
    /// pair weight stays a count of matches, not of roster entries.
    pub fn observe_match(&mut self, document: &MatchDocument) {
        let mut puuids: Vec<&str> = document
            .info
            .participants
            .iter()
            .map(|p| p.puuid.as_str())
            .collect();
        puuids.sort_unstable();
        puuids.dedup();

        for puuid in &puuids {
            self.nodes.insert((*puuid).to_string());
        }

        // The list is sorted and deduplicated, so (i, j) with i < j is
        // already the canonical unordered key.
        for (i, first) in puuids.iter().enumerate() {
            for second in puuids.iter().skip(i + 1) {
                let key = ((*first).to_string(), (*second).to_string());
                *self.weights.entry(key).or_insert(0) += 1;
            }
        }

        self.matches_processed += 1;
    }

    pub fn matches_processed(&self) -> usize {
        self.matches_processed
    }

    /// Materialize the filtered undirected graph. Nodes are inserted in
    /// sorted puuid order, so indices and cluster ids are stable for a
    /// fixed corpus and filter.
    pub fn into_graph(self, filter: GraphFilter) -> CoPlayGraph {
        let surviving: Vec<((String, String), u32)> = self
            .weights
            .into_iter()
            .filter(|(_, weight)| *weight >= filter.min_weight)
            .collect();

        let node_ids: BTreeSet<String> = if filter.connected_only {
            surviving
                .iter()
                .flat_map(|((a, b), _)| [a.clone(), b.clone()])
                .collect()
        } else {
            self.nodes
        };

        let mut graph = UnGraph::<String, u32>::new_undirected();
        let mut index = BTreeMap::new();
        for id in &node_ids {
            let idx = graph.add_node(id.clone());
            index.insert(id.clone(), idx);
        }

        for ((a, b), weight) in surviving {
            // Both endpoints are present by construction.
            if let (Some(&ia), Some(&ib)) = (index.get(&a), index.get(&b)) {
                graph.add_edge(ia, ib, weight);
            }
        }

        CoPlayGraph {
            graph,
            index,
            matches_processed: self.matches_processed,
            filter,
        }
    }
}

/// The filtered undirected co-play graph. Simple: one edge per player pair.
pub struct CoPlayGraph {
    pub graph: UnGraph<String, u32>,
    pub index: BTreeMap<String, NodeIndex>,
    pub matches_processed: usize,
    pub filter: GraphFilter,
}

impl CoPlayGraph {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn degree(&self, puuid: &str) -> usize {
        self.index
            .get(puuid)
            .map(|&idx| self.graph.neighbors(idx).count())
            .unwrap_or(0)
    }
}
