//! Topology graph analysis and RCA hint generation (component H).

use crate::graph::TopologyGraph;
use crate::ingest::{edges_from_traces, load_manifests, nodes_from_manifests};
use crate::models::{Edge, GraphMetrics, Node, NodeKind, RcaHint, TopologyReport};
use crate::error::TopologyResult;
use std::collections::HashMap;
use std::path::Path;

pub struct TopologyAnalyzer {
    pub error_threshold: f64,
}

impl Default for TopologyAnalyzer {
    fn default() -> Self {
        Self { error_threshold: 0.05 }
    }
}

impl TopologyAnalyzer {
    pub fn new(error_threshold: f64) -> Self {
        Self { error_threshold }
    }

    pub fn analyze(
        &self,
        manifest_paths: &[impl AsRef<Path>],
        trace_paths: &[impl AsRef<Path>],
    ) -> TopologyResult<TopologyReport> {
        let mut graph = TopologyGraph::new();
        let mut warnings = Vec::new();

        if manifest_paths.is_empty() {
            warnings.push("No manifests provided; graph nodes will rely on trace data only.".to_string());
        } else {
            let documents = load_manifests(manifest_paths)?;
            for node in nodes_from_manifests(&documents) {
                graph.add_node(node);
            }
        }

        let (edges, stats) = if trace_paths.is_empty() {
            warnings.push("No traces provided; edges and error metrics are empty.".to_string());
            (Vec::new(), HashMap::new())
        } else {
            edges_from_traces(trace_paths)?
        };

        let name_to_node: HashMap<String, String> = graph
            .nodes()
            .map(|node| (node.name.clone(), node.node_id.clone()))
            .collect();

        for edge in edges {
            let source_id = name_to_node.get(&edge.source).cloned().unwrap_or_else(|| edge.source.clone());
            let target_id = name_to_node.get(&edge.target).cloned().unwrap_or_else(|| edge.target.clone());
            if !graph.contains_node(&source_id) {
                graph.add_node(node_stub(&source_id));
            }
            if !graph.contains_node(&target_id) {
                graph.add_node(node_stub(&target_id));
            }
            graph.add_edge(Edge {
                source: source_id,
                target: target_id,
                label: edge.label,
                weight: edge.weight,
            });
        }

        let degree_centrality = graph.degree_centrality();
        let pagerank = graph.pagerank(0.85, 20);
        let error_rate = error_rates(&stats);

        let metrics = GraphMetrics {
            degree_centrality,
            pagerank,
            error_rate,
        };

        let hints = generate_hints(&graph, &metrics, self.error_threshold);

        Ok(TopologyReport {
            nodes: graph.nodes().cloned().collect(),
            edges: graph.edges().to_vec(),
            metrics,
            hints,
            warnings,
        })
    }
}

fn error_rates(stats: &HashMap<String, (f64, f64)>) -> HashMap<String, f64> {
    stats
        .iter()
        .map(|(service, (total, errors))| {
            let rate = if *total > 0.0 { errors / total } else { 0.0 };
            (service.clone(), rate)
        })
        .collect()
}

fn generate_hints(graph: &TopologyGraph, metrics: &GraphMetrics, threshold: f64) -> Vec<RcaHint> {
    let max_pagerank = if metrics.pagerank.is_empty() {
        1.0
    } else {
        metrics.pagerank.values().cloned().fold(f64::MIN, f64::max)
    };

    let mut hints: Vec<RcaHint> = Vec::new();
    for node in graph.nodes() {
        let service_name = &node.name;
        let service_error = *metrics.error_rate.get(service_name).unwrap_or(&0.0);
        let service_rank = *metrics.pagerank.get(&node.node_id).unwrap_or(&0.0);
        let score = (service_error * 0.7) + ((service_rank / max_pagerank) * 0.3);

        let mut notes = Vec::new();
        if service_error >= threshold {
            notes.push(format!("Error rate {:.2}% exceeds threshold.", service_error * 100.0));
        }
        if service_rank >= max_pagerank * 0.6 {
            notes.push("High topology centrality.".to_string());
        }
        if !notes.is_empty() {
            hints.push(RcaHint {
                node_id: node.node_id.clone(),
                service: service_name.clone(),
                score: round4(score),
                error_rate: round4(service_error),
                pagerank: round4(service_rank),
                notes,
            });
        }
    }
    hints.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    hints
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn node_stub(service_name: &str) -> Node {
    let (namespace, name) = match service_name.split_once('/') {
        Some((ns, n)) => (ns.to_string(), n.to_string()),
        None => ("unknown".to_string(), service_name.to_string()),
    };
    Node {
        node_id: service_name.to_string(),
        name,
        namespace,
        kind: NodeKind::SynthesizedStub,
        labels: HashMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn s6_web_api_db_chain_flags_db_as_rca_hint() {
        let dir = std::env::temp_dir().join(format!("mindops-topology-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let manifest_path = dir.join("manifests.yaml");
        std::fs::write(
            &manifest_path,
            r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  namespace: default
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: api
  namespace: default
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: db
  namespace: default
"#,
        )
        .unwrap();

        let trace_path = dir.join("traces.json");
        let spans = serde_json::json!([
            {"traceId": "t1", "spanId": "w1", "startTime": 0.0, "endTime": 10.0, "name": "root",
             "status": {"code": "OK"},
             "attributes": [{"key": "service.name", "value": {"stringValue": "web"}}]},
            {"traceId": "t1", "spanId": "a1", "parentSpanId": "w1", "startTime": 1.0, "endTime": 9.0,
             "name": "call", "status": {"code": "OK"},
             "attributes": [{"key": "service.name", "value": {"stringValue": "api"}}]},
            {"traceId": "t1", "spanId": "d1", "parentSpanId": "a1", "startTime": 2.0, "endTime": 8.0,
             "name": "query", "status": {"code": "STATUS_CODE_ERROR"},
             "attributes": [{"key": "service.name", "value": {"stringValue": "db"}}]},
            {"traceId": "t2", "spanId": "w2", "startTime": 0.0, "endTime": 10.0, "name": "root",
             "status": {"code": "OK"},
             "attributes": [{"key": "service.name", "value": {"stringValue": "web"}}]},
            {"traceId": "t2", "spanId": "a2", "parentSpanId": "w2", "startTime": 1.0, "endTime": 9.0,
             "name": "call", "status": {"code": "OK"},
             "attributes": [{"key": "service.name", "value": {"stringValue": "api"}}]},
            {"traceId": "t2", "spanId": "d2", "parentSpanId": "a2", "startTime": 2.0, "endTime": 8.0,
             "name": "query", "status": {"code": "OK"},
             "attributes": [{"key": "service.name", "value": {"stringValue": "db"}}]},
        ]);
        let mut f = std::fs::File::create(&trace_path).unwrap();
        write!(f, "{}", spans).unwrap();

        let analyzer = TopologyAnalyzer::default();
        let report = analyzer.analyze(&[manifest_path], &[trace_path]).unwrap();

        let db_hint = report.hints.iter().find(|h| h.service == "db");
        assert!(db_hint.is_some(), "expected an RCA hint for db");
        let db_hint = db_hint.unwrap();
        assert!(db_hint.error_rate > 0.0);
        assert!(report
            .hints
            .iter()
            .all(|h| h.service != "db" || h.score >= db_hint.score));

        std::fs::remove_dir_all(&dir).ok();
    }
}
