//! Navigation graph model

pub mod components;
pub mod network;

pub use components::{GraphEdge, GraphNode};
pub use network::{BuildStats, RouterGraph, WayTypeEdges};
