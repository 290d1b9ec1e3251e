use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Deployment,
    StatefulSet,
    DaemonSet,
    Service,
    SynthesizedStub,
}

impl NodeKind {
    pub fn from_manifest_kind(kind: &str) -> Option<Self> {
        match kind {
            "Deployment" => Some(Self::Deployment),
            "StatefulSet" => Some(Self::StatefulSet),
            "DaemonSet" => Some(Self::DaemonSet),
            "Service" => Some(Self::Service),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub node_id: String,
    pub name: String,
    pub namespace: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(default = "default_label")]
    pub label: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_label() -> String {
    "calls".to_string()
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphMetrics {
    pub degree_centrality: HashMap<String, f64>,
    pub pagerank: HashMap<String, f64>,
    pub error_rate: HashMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RcaHint {
    pub node_id: String,
    pub service: String,
    pub score: f64,
    pub error_rate: f64,
    pub pagerank: f64,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyReport {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub metrics: GraphMetrics,
    pub hints: Vec<RcaHint>,
    #[serde(default)]
    pub warnings: Vec<String>,
}
