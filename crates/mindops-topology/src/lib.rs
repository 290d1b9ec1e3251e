//! Service topology graph construction, ranking, and RCA hint generation
//! (component H).

pub mod analyzer;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod models;

pub use analyzer::TopologyAnalyzer;
pub use error::{TopologyError, TopologyResult};
pub use graph::TopologyGraph;
pub use ingest::{edges_from_traces, load_manifests, nodes_from_manifests};
pub use models::{Edge, GraphMetrics, Node, NodeKind, RcaHint, TopologyReport};
