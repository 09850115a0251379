//! This module turns a map snapshot (levels, spaces, areas, way types,
//! altitude areas, nodes and edges) into a routable graph.

mod builder;
mod config;
mod processor;
pub mod raw_types;
pub mod snapshot;

pub(crate) use builder::union_masks;
pub use builder::build_router_graph;
pub use config::BuildConfig;
pub use raw_types::{
    MapData, RawAltitudeArea, RawArea, RawEdge, RawLevel, RawNode, RawPolygon, RawSlope, RawSpace,
    RawWayType,
};
pub use snapshot::{SNAPSHOT_SCHEMA_VERSION, SnapshotFile};
