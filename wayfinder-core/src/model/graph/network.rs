//! Immutable, versioned navigation graph snapshot

use fixedbitset::FixedBitSet;
use geo::Point;
use hashbrown::HashMap;
use petgraph::graph::{DiGraph, EdgeIndex, EdgeReference, NodeIndex};
use rstar::{AABB, RTree};
use serde::Serialize;

use super::{GraphEdge, GraphNode};
use crate::loading::BuildConfig;
use crate::model::{AltitudeArea, Area, Level, Space, SpaceEnvelope, WayTypeCatalog, altitude};
use crate::{AreaId, LevelId, MapNodeId, MapVersion, SpaceId, WayTypeId};

/// Edge index sets of one way type, for bulk masking
#[derive(Debug, Clone)]
pub struct WayTypeEdges {
    pub all: FixedBitSet,
    /// Edges with positive rise
    pub upward: FixedBitSet,
    /// Edges with negative rise
    pub downward: FixedBitSet,
}

impl WayTypeEdges {
    pub(crate) fn with_capacity(edge_count: usize) -> Self {
        Self {
            all: FixedBitSet::with_capacity(edge_count),
            upward: FixedBitSet::with_capacity(edge_count),
            downward: FixedBitSet::with_capacity(edge_count),
        }
    }
}

/// Counters reported by the graph builder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub nodes: usize,
    pub edges: usize,
    pub spaces: usize,
    pub skipped_levels: usize,
    pub skipped_spaces: usize,
    pub skipped_areas: usize,
    pub skipped_waytypes: usize,
    pub skipped_altitude_areas: usize,
    pub skipped_nodes: usize,
    pub skipped_edges: usize,
}

/// Routable snapshot of a map version. Never mutated after the builder
/// hands it out; a map update produces a new snapshot.
#[derive(Debug, Clone)]
pub struct RouterGraph {
    pub(crate) version: MapVersion,
    pub(crate) graph: DiGraph<GraphNode, GraphEdge>,
    pub(crate) node_lookup: HashMap<MapNodeId, NodeIndex>,
    pub(crate) waytypes: WayTypeCatalog,
    /// Parallel to the catalog order
    pub(crate) waytype_edges: Vec<WayTypeEdges>,
    pub(crate) levels: HashMap<LevelId, Level>,
    pub(crate) spaces: HashMap<SpaceId, Space>,
    pub(crate) areas: HashMap<AreaId, Area>,
    pub(crate) space_nodes: HashMap<SpaceId, Vec<NodeIndex>>,
    pub(crate) area_nodes: HashMap<AreaId, Vec<NodeIndex>>,
    pub(crate) space_index: HashMap<LevelId, RTree<SpaceEnvelope>>,
    pub(crate) altitude_areas: HashMap<LevelId, Vec<AltitudeArea>>,
    pub(crate) config: BuildConfig,
    pub(crate) stats: BuildStats,
}

impl RouterGraph {
    pub fn version(&self) -> MapVersion {
        self.version
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, index: NodeIndex) -> &GraphNode {
        &self.graph[index]
    }

    pub fn edge(&self, index: EdgeIndex) -> &GraphEdge {
        &self.graph[index]
    }

    pub fn node_index(&self, id: MapNodeId) -> Option<NodeIndex> {
        self.node_lookup.get(&id).copied()
    }

    pub fn find_edge(&self, from: NodeIndex, to: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(from, to)
    }

    /// Outgoing edges of a node
    pub fn edges(&self, node: NodeIndex) -> impl Iterator<Item = EdgeReference<'_, GraphEdge>> {
        self.graph.edges(node)
    }

    pub fn waytypes(&self) -> &WayTypeCatalog {
        &self.waytypes
    }

    pub fn waytype_edges(&self, waytype: WayTypeId) -> Option<&WayTypeEdges> {
        self.waytypes
            .index_of(waytype)
            .map(|idx| &self.waytype_edges[idx])
    }

    pub fn level(&self, id: LevelId) -> Option<&Level> {
        self.levels.get(&id)
    }

    /// Level a stacked level belongs to for narration purposes
    pub fn primary_level(&self, id: LevelId) -> LevelId {
        let mut current = id;
        for _ in 0..=self.levels.len() {
            match self.levels.get(&current).and_then(|level| level.on_top_of) {
                Some(below) => current = below,
                None => return current,
            }
        }
        current
    }

    pub fn space(&self, id: SpaceId) -> Option<&Space> {
        self.spaces.get(&id)
    }

    pub fn area(&self, id: AreaId) -> Option<&Area> {
        self.areas.get(&id)
    }

    pub fn space_nodes(&self, space: SpaceId) -> &[NodeIndex] {
        self.space_nodes.get(&space).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn area_nodes(&self, area: AreaId) -> &[NodeIndex] {
        self.area_nodes.get(&area).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Spaces of `level` whose bounding box lies within `radius` of `point`, sorted by id
    pub fn spaces_near(&self, level: LevelId, point: &Point<f64>, radius: f64) -> Vec<&Space> {
        let query = AABB::from_corners(
            [point.x() - radius, point.y() - radius],
            [point.x() + radius, point.y() + radius],
        );
        let Some(tree) = self.space_index.get(&level) else {
            return Vec::new();
        };
        let mut spaces: Vec<&Space> = tree
            .locate_in_envelope_intersecting(&query)
            .filter_map(|entry| self.spaces.get(&entry.space))
            .collect();
        spaces.sort_by_key(|space| space.id);
        spaces
    }

    /// Areas of `space` covering `point`, sorted by id
    pub fn areas_at(&self, space: SpaceId, point: &Point<f64>) -> Vec<&Area> {
        let mut areas: Vec<&Area> = self
            .areas
            .values()
            .filter(|area| area.space == space && area.covers(point))
            .collect();
        areas.sort_by_key(|area| area.id);
        areas
    }

    /// Floor altitude at an arbitrary point, falling back to the level base altitude
    pub fn altitude_at(&self, level: LevelId, point: &Point<f64>) -> f64 {
        self.altitude_areas
            .get(&level)
            .and_then(|areas| {
                altitude::resolve_altitude(
                    areas,
                    point,
                    self.config.altitude_tolerance,
                    self.config.altitude_buffer_radius,
                )
            })
            .or_else(|| self.levels.get(&level).map(|level| level.base_altitude))
            .unwrap_or(0.0)
    }
}
