//! Route option preferences and their resolution.

mod raw;
mod resolver;
mod types;

pub use raw::RawRouteOptions;
pub use resolver::resolve;
pub use types::{
    OptionChoice, RestrictionPreference, RouteMode, RouteOptions, WalkSpeed, WayTypePolicy,
};

pub const KEY_MODE: &str = "mode";
pub const KEY_WALK_SPEED: &str = "walk_speed";
pub const KEY_RESTRICTIONS: &str = "restrictions";
/// Way type policies are keyed `waytype_<name>`
pub const WAYTYPE_KEY_PREFIX: &str = "waytype_";
