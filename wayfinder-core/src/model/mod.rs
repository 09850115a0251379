//! Data model for indoor routing
//!
//! Contains the map entities the engine consumes and the navigation graph built from them.

pub mod altitude;
pub mod graph;
pub mod permissions;
pub mod spaces;
pub mod waytype;

pub use altitude::{AltitudeArea, AltitudeProfile};
pub use graph::{BuildStats, GraphEdge, GraphNode, RouterGraph, WayTypeEdges};
pub use permissions::Permissions;
pub use spaces::{Area, Level, Space, SpaceEnvelope, locate_space};
pub use waytype::{WayType, WayTypeCatalog};
