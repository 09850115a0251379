//! Per-request pathfinding over an immutable [`RouterGraph`](crate::RouterGraph).

mod anchor;
mod cancel;
mod config;
mod cost;
mod dijkstra;
mod engine;
mod path;

pub use cancel::CancelFlag;
pub use config::EngineConfig;
pub use engine::find_route;
pub use path::{CustomPoint, Hop, Location, NodePath, PathNode};
