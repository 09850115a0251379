use std::fmt;
use std::hash::{Hash, Hasher};

use geo::Point;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::{AreaId, Distance, LevelId, MapNodeId, MapVersion, Seconds, SpaceId, WayTypeId};

/// Route endpoint as requested by the caller
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Location {
    /// An existing graph node
    Node { id: MapNodeId },
    /// A custom location
    Point { level: LevelId, x: f64, y: f64 },
    /// Any accessible node of a space
    Space { id: SpaceId },
    /// Any accessible node of an area
    Area { id: AreaId },
}

impl Location {
    fn key(&self) -> (u8, u64, u64, u64) {
        match *self {
            Location::Node { id } => (0, u64::from(id), 0, 0),
            Location::Point { level, x, y } => (1, u64::from(level), x.to_bits(), y.to_bits()),
            Location::Space { id } => (2, u64::from(id), 0, 0),
            Location::Area { id } => (3, u64::from(id), 0, 0),
        }
    }
}

// Bitwise coordinate comparison, so locations can key caches
impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Node { id } => write!(f, "node {id}"),
            Location::Point { level, x, y } => write!(f, "({x}, {y}) on level {level}"),
            Location::Space { id } => write!(f, "space {id}"),
            Location::Area { id } => write!(f, "area {id}"),
        }
    }
}

/// Request-scoped node placed at a custom location
#[derive(Debug, Clone, PartialEq)]
pub struct CustomPoint {
    pub level: LevelId,
    pub space: SpaceId,
    pub point: Point<f64>,
    pub altitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathNode {
    Graph(NodeIndex),
    Custom(CustomPoint),
    /// Virtual anchor standing for a whole space or area; joined by zero-length hops
    Container,
}

/// One traversed edge, real or virtual
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hop {
    /// `None` for plain walking
    pub waytype: Option<WayTypeId>,
    pub distance: Distance,
    pub rise: f64,
    /// Travel time including any way type entry charge
    pub seconds: Seconds,
    /// Search cost the hop contributed
    pub cost: f64,
}

/// Search result: `nodes.len() == hops.len() + 1`, `hops[i]` leads from
/// `nodes[i]` to `nodes[i + 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct NodePath {
    pub version: MapVersion,
    pub origin: Location,
    pub destination: Location,
    pub nodes: Vec<PathNode>,
    pub hops: Vec<Hop>,
}

impl NodePath {
    pub fn distance(&self) -> Distance {
        self.hops.iter().map(|hop| hop.distance).sum()
    }

    pub fn duration(&self) -> Seconds {
        self.hops.iter().map(|hop| hop.seconds).sum()
    }

    pub fn cost(&self) -> f64 {
        self.hops.iter().map(|hop| hop.cost).sum()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn locations_hash_by_value() {
        let mut seen = HashSet::new();
        seen.insert(Location::Point {
            level: 0,
            x: 1.5,
            y: 2.0,
        });
        assert!(seen.contains(&Location::Point {
            level: 0,
            x: 1.5,
            y: 2.0
        }));
        assert!(!seen.contains(&Location::Node { id: 0 }));
        assert_ne!(Location::Space { id: 3 }, Location::Area { id: 3 });
    }

    #[test]
    fn locations_deserialize_tagged() {
        let location: Location = serde_json::from_str(r#"{"type":"node","id":7}"#).unwrap();
        assert_eq!(location, Location::Node { id: 7 });
        assert_eq!(location.to_string(), "node 7");
    }
}
