//! Data-driven catalog of way types (stairs, escalators, elevators, ...)

use hashbrown::HashMap;
use serde::Serialize;

use crate::{Seconds, WayTypeId};

/// Category of traversal attached to an edge.
///
/// Edges without a way type are plain walking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WayType {
    pub id: WayTypeId,
    /// Slug used as the option key (`waytype_<name>`)
    pub name: String,
    pub title: String,
    pub title_plural: String,
    pub icon_name: Option<String>,
    /// Upward and downward travel can be avoided independently
    pub up_separate: bool,
    pub avoid_by_default: bool,
    /// Speed multiplier relative to plain walking
    pub speed: f64,
    /// Speed multiplier for upward travel on separable way types
    pub speed_up: f64,
    /// Fixed time charged whenever a route enters this way type
    pub extra_seconds: Seconds,
    pub description: Option<String>,
    pub up_description: Option<String>,
    pub down_description: Option<String>,
}

impl WayType {
    pub fn speed_for(&self, rise: f64) -> f64 {
        if self.up_separate && rise > 0.0 {
            self.speed_up
        } else {
            self.speed
        }
    }

    /// Option key under which a policy for this way type is stored
    pub fn option_key(&self) -> String {
        format!("{}{}", crate::options::WAYTYPE_KEY_PREFIX, self.name)
    }
}

/// Immutable way type catalog, ordered by id.
#[derive(Debug, Clone, Default)]
pub struct WayTypeCatalog {
    types: Vec<WayType>,
    by_id: HashMap<WayTypeId, usize>,
    by_name: HashMap<String, usize>,
}

impl WayTypeCatalog {
    /// Builds the catalog. Callers must have rejected duplicate ids and names.
    pub(crate) fn from_types(mut types: Vec<WayType>) -> Self {
        types.sort_by_key(|waytype| waytype.id);
        let by_id = types
            .iter()
            .enumerate()
            .map(|(idx, waytype)| (waytype.id, idx))
            .collect();
        let by_name = types
            .iter()
            .enumerate()
            .map(|(idx, waytype)| (waytype.name.clone(), idx))
            .collect();
        Self {
            types,
            by_id,
            by_name,
        }
    }

    pub fn get(&self, id: WayTypeId) -> Option<&WayType> {
        self.by_id.get(&id).map(|&idx| &self.types[idx])
    }

    pub fn by_name(&self, name: &str) -> Option<&WayType> {
        self.by_name.get(name).map(|&idx| &self.types[idx])
    }

    /// Dense position of a way type, used to index per-way-type tables
    pub fn index_of(&self, id: WayTypeId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WayType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn test_waytype(id: WayTypeId, name: &str, up_separate: bool) -> WayType {
    WayType {
        id,
        name: name.to_string(),
        title: name.to_string(),
        title_plural: format!("{name}s"),
        icon_name: None,
        up_separate,
        avoid_by_default: false,
        speed: 1.0,
        speed_up: 1.0,
        extra_seconds: 0.0,
        description: None,
        up_description: None,
        down_description: None,
    }
}
