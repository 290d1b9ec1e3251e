//! Plain adjacency-map graph representation (component H).
//!
//! A node table plus `(source_id, target_id)` edges is enough; no graph
//! library is pulled in for this.

use crate::models::{Edge, Node};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct TopologyGraph {
    nodes: HashMap<String, Node>,
    edges: Vec<Edge>,
    adjacency: HashMap<String, Vec<String>>,
    insertion_order: Vec<String>,
}

impl TopologyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) {
        if !self.nodes.contains_key(&node.node_id) {
            self.insertion_order.push(node.node_id.clone());
            self.adjacency.entry(node.node_id.clone()).or_default();
            self.nodes.insert(node.node_id.clone(), node);
        }
    }

    pub fn add_edge(&mut self, edge: Edge) {
        self.adjacency
            .entry(edge.source.clone())
            .or_default()
            .push(edge.target.clone());
        self.edges.push(edge);
    }

    pub fn contains_node(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.insertion_order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn degree_centrality(&self) -> HashMap<String, f64> {
        if self.nodes.is_empty() {
            return HashMap::new();
        }
        let mut counts: HashMap<String, u64> =
            self.nodes.keys().map(|id| (id.clone(), 0)).collect();
        for edge in &self.edges {
            *counts.entry(edge.source.clone()).or_insert(0) += 1;
            *counts.entry(edge.target.clone()).or_insert(0) += 1;
        }
        let scale = (self.nodes.len().saturating_sub(1)).max(1) as f64;
        counts
            .into_iter()
            .map(|(id, count)| (id, count as f64 / scale))
            .collect()
    }

    /// PageRank with damping 0.85 over 20 iterations; dangling-node mass is
    /// redistributed uniformly across every node.
    pub fn pagerank(&self, damping: f64, iterations: u32) -> HashMap<String, f64> {
        let node_ids: Vec<&String> = self.insertion_order.iter().collect();
        if node_ids.is_empty() {
            return HashMap::new();
        }
        let n = node_ids.len() as f64;
        let mut rank: HashMap<String, f64> =
            node_ids.iter().map(|id| ((*id).clone(), 1.0 / n)).collect();
        let out_degree: HashMap<&String, usize> = node_ids
            .iter()
            .map(|id| (*id, self.adjacency.get(*id).map(Vec::len).unwrap_or(0)))
            .collect();

        for _ in 0..iterations {
            let mut new_rank: HashMap<String, f64> = node_ids
                .iter()
                .map(|id| ((*id).clone(), (1.0 - damping) / n))
                .collect();
            for id in &node_ids {
                let targets = self.adjacency.get(*id).cloned().unwrap_or_default();
                let current = rank[*id];
                if targets.is_empty() {
                    for dest in &node_ids {
                        *new_rank.get_mut(*dest).unwrap() += damping * current / n;
                    }
                } else {
                    let degree = out_degree[*id].max(1) as f64;
                    let share = damping * current / degree;
                    for dest in &targets {
                        if let Some(slot) = new_rank.get_mut(dest) {
                            *slot += share;
                        }
                    }
                }
            }
            rank = new_rank;
        }
        rank
    }

    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph topology {\n");
        for node in self.nodes() {
            out.push_str(&format!(
                "  \"{}\" [label=\"{}\\n({})\"];\n",
                node.node_id, node.name, node.namespace
            ));
        }
        for edge in &self.edges {
            out.push_str(&format!(
                "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
                edge.source, edge.target, edge.label
            ));
        }
        out.push('}');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeKind;

    fn node(id: &str) -> Node {
        Node {
            node_id: id.to_string(),
            name: id.to_string(),
            namespace: "default".to_string(),
            kind: NodeKind::Deployment,
            labels: Default::default(),
        }
    }

    #[test]
    fn pagerank_sums_to_one() {
        let mut graph = TopologyGraph::new();
        for id in ["web", "api", "db"] {
            graph.add_node(node(id));
        }
        graph.add_edge(Edge {
            source: "web".to_string(),
            target: "api".to_string(),
            label: "calls".to_string(),
            weight: 1.0,
        });
        graph.add_edge(Edge {
            source: "api".to_string(),
            target: "db".to_string(),
            label: "calls".to_string(),
            weight: 1.0,
        });
        let rank = graph.pagerank(0.85, 20);
        let total: f64 = rank.values().sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert!(rank.values().all(|v| *v > 0.0));
    }

    #[test]
    fn sink_node_accumulates_highest_rank() {
        let mut graph = TopologyGraph::new();
        for id in ["web", "api", "db"] {
            graph.add_node(node(id));
        }
        graph.add_edge(Edge {
            source: "web".to_string(),
            target: "api".to_string(),
            label: "calls".to_string(),
            weight: 1.0,
        });
        graph.add_edge(Edge {
            source: "api".to_string(),
            target: "db".to_string(),
            label: "calls".to_string(),
            weight: 1.0,
        });
        let rank = graph.pagerank(0.85, 20);
        let db_rank = rank["db"];
        assert!(db_rank > rank["web"]);
        assert!(db_rank > rank["api"]);
    }
}
