pub mod builder;
pub mod clusters;
pub mod document;

pub use builder::{CoPlayGraph, EdgeAccumulator, GraphFilter};
pub use document::{GraphDocument, GraphEdge, GraphNode, NodeMeta};
