//! Similarity clustering of probable duplicate records.

use log::{debug, info};
use petgraph::graph::{NodeIndex, UnGraph};
use serde::Serialize;

use crate::matching::similarity;
use crate::models::{Cluster, OrgRecord};

/// How records are grouped into clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterStrategy {
    /// Greedy seed-only chains: record indices are visited in ascending
    /// order, each unassigned index opens a group, and later unassigned
    /// indices join by scoring against the seed alone — never against
    /// other members. Order-dependent; clusters are not maximal cliques,
    /// and a record mutually similar to a non-seed member can be left
    /// out. The default.
    GreedySeed,
    /// Connected components of the similarity graph (edge iff the
    /// token-sort score meets the threshold). Transitive, and a
    /// different, non-compatible output from `GreedySeed`.
    ConnectedComponents,
}

/// Partition records into clusters of probable duplicates using the
/// default greedy seed-only strategy.
///
/// Clustering always scores with the token-sort ratio, whatever mode the
/// duplicate matcher ran with. Groups of size 1 are dropped: a singleton
/// is not a cluster.
pub fn build_clusters(records: &[OrgRecord], cluster_threshold: f64) -> Vec<Cluster> {
    build_clusters_with_strategy(records, cluster_threshold, ClusterStrategy::GreedySeed)
}

/// Partition records into clusters under an explicit strategy.
pub fn build_clusters_with_strategy(
    records: &[OrgRecord],
    cluster_threshold: f64,
    strategy: ClusterStrategy,
) -> Vec<Cluster> {
    let clusters = match strategy {
        ClusterStrategy::GreedySeed => greedy_seed_clusters(records, cluster_threshold),
        ClusterStrategy::ConnectedComponents => component_clusters(records, cluster_threshold),
    };
    info!(
        "found {} clusters of size > 1 at threshold {} ({:?})",
        clusters.len(),
        cluster_threshold,
        strategy
    );
    clusters
}

/// The greedy pass is inherently sequential: whether j joins a group
/// depends on the "used" marks left by every earlier seed.
fn greedy_seed_clusters(records: &[OrgRecord], cluster_threshold: f64) -> Vec<Cluster> {
    let mut used = vec![false; records.len()];
    let mut clusters = Vec::new();

    for i in 0..records.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        let mut members = vec![i];

        for j in (i + 1)..records.len() {
            if used[j] {
                continue;
            }
            let score = similarity::token_sort_ratio(
                &records[i].normalized_name,
                &records[j].normalized_name,
            );
            if score >= cluster_threshold {
                used[j] = true;
                members.push(j);
            }
        }

        if members.len() > 1 {
            clusters.push(Cluster { members });
        }
    }

    clusters
}

fn component_clusters(records: &[OrgRecord], cluster_threshold: f64) -> Vec<Cluster> {
    let mut graph: UnGraph<usize, f64> = UnGraph::new_undirected();
    let node_indices: Vec<NodeIndex> = (0..records.len()).map(|i| graph.add_node(i)).collect();

    for i in 0..records.len() {
        for j in (i + 1)..records.len() {
            let score = similarity::token_sort_ratio(
                &records[i].normalized_name,
                &records[j].normalized_name,
            );
            if score >= cluster_threshold {
                graph.add_edge(node_indices[i], node_indices[j], score);
            }
        }
    }
    debug!(
        "similarity graph: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    let mut visited = vec![false; graph.node_count()];
    let mut clusters = Vec::new();

    for node_idx in graph.node_indices() {
        if visited[node_idx.index()] {
            continue;
        }
        let mut component = Vec::new();
        let mut stack = vec![node_idx];

        while let Some(current) = stack.pop() {
            if visited[current.index()] {
                continue;
            }
            visited[current.index()] = true;
            component.push(graph[current]);

            for neighbor in graph.neighbors(current) {
                if !visited[neighbor.index()] {
                    stack.push(neighbor);
                }
            }
        }

        if component.len() > 1 {
            component.sort_unstable();
            clusters.push(Cluster { members: component });
        }
    }

    clusters
}
