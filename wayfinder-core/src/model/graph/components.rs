//! Navigation graph components - nodes and directed edges

use geo::Point;

use crate::{AccessRestrictionId, AreaId, Distance, LevelId, MapNodeId, SpaceId, WayTypeId};

/// Navigation graph node
#[derive(Debug, Clone)]
pub struct GraphNode {
    /// Authored id of the node
    pub id: MapNodeId,
    pub point: Point<f64>,
    pub altitude: f64,
    pub level: LevelId,
    pub space: SpaceId,
    /// Areas covering the node, sorted
    pub areas: Vec<AreaId>,
    /// Every restriction guarding the node: its own, its space's and its areas', sorted
    pub restrictions: Vec<AccessRestrictionId>,
}

impl GraphNode {
    pub fn is_restricted(&self) -> bool {
        !self.restrictions.is_empty()
    }
}

/// Directed navigation graph edge
#[derive(Debug, Clone)]
pub struct GraphEdge {
    /// `None` for plain walking
    pub waytype: Option<WayTypeId>,
    pub distance: Distance,
    /// Altitude delta `to - from`
    pub rise: f64,
    pub access_restriction: Option<AccessRestrictionId>,
}
