pub use crate::error::{BuildError, Error, OptionsError, RoutingError};

// Graph building
pub use crate::loading::{BuildConfig, MapData, SnapshotFile, build_router_graph};
pub use crate::model::{Permissions, RouterGraph, WayType, WayTypeCatalog};

// Options and search
pub use crate::options::{
    RawRouteOptions, RestrictionPreference, RouteMode, RouteOptions, WalkSpeed, WayTypePolicy,
    resolve,
};
pub use crate::routing::{CancelFlag, EngineConfig, Location, NodePath, find_route};

// Route narration
pub use crate::route::{InstructionTable, Route, RouteItem, assemble};

// Core identifiers
pub use crate::{AccessRestrictionId, LevelId, MapNodeId, MapVersion, SpaceId, WayTypeId};
