//! Indoor multi-level routing engine.
//!
//! Map geometry is turned into an immutable [`RouterGraph`] snapshot by the
//! [`loading`] pipeline. Each request resolves its [`RouteOptions`], runs a
//! permission- and preference-aware Dijkstra search over the snapshot
//! ([`routing::find_route`]) and narrates the resulting node path as a
//! [`Route`] ([`route::assemble`]).

pub mod error;
pub mod loading;
pub mod model;
pub mod options;
pub mod prelude;
pub mod route;
pub mod routing;

pub use error::{BuildError, Error, OptionsError, RoutingError};
pub use loading::{BuildConfig, MapData, build_router_graph};
pub use model::{Permissions, RouterGraph};
pub use options::{RawRouteOptions, RouteOptions};
pub use route::{InstructionTable, Route, RouteItem, assemble};
pub use routing::{CancelFlag, EngineConfig, Location, NodePath, find_route};

/// Authored id of a level
pub type LevelId = u32;
/// Authored id of a space
pub type SpaceId = u32;
/// Authored id of an area
pub type AreaId = u32;
/// Authored id of a way type
pub type WayTypeId = u32;
/// Authored id of a graph node
pub type MapNodeId = u32;
/// Opaque access restriction identifier
pub type AccessRestrictionId = u32;
/// Monotonically increasing map-update version
pub type MapVersion = u64;
/// Meters
pub type Distance = f64;
/// Seconds
pub type Seconds = f64;
