//! Per-request view of the graph: which nodes and edges a request may use and
//! what each traversal costs under its options.

use fixedbitset::FixedBitSet;
use petgraph::graph::{EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef;

use super::EngineConfig;
use super::path::Hop;
use crate::loading::union_masks;
use crate::model::{GraphEdge, Permissions, RouterGraph};
use crate::options::{RestrictionPreference, RouteMode, RouteOptions, WayTypePolicy};
use crate::{AccessRestrictionId, Distance, WayTypeId};

pub(crate) struct CostModel<'a> {
    graph: &'a RouterGraph,
    permissions: &'a Permissions,
    /// Avoided way type edges and edges guarded by a hidden restriction
    blocked_edges: FixedBitSet,
    /// Nodes guarded by a restriction the caller cannot see
    hidden_nodes: FixedBitSet,
    /// Restricted nodes the caller can see
    restricted_nodes: FixedBitSet,
    mode: RouteMode,
    /// Meters per second of plain walking for this request
    walk_speed: f64,
    restriction_factor: f64,
}

impl<'a> CostModel<'a> {
    pub(crate) fn new(
        graph: &'a RouterGraph,
        permissions: &'a Permissions,
        options: &RouteOptions,
        config: &EngineConfig,
    ) -> Self {
        let node_count = graph.node_count();
        let mut hidden_nodes = FixedBitSet::with_capacity(node_count);
        let mut restricted_nodes = FixedBitSet::with_capacity(node_count);
        for index in graph.graph.node_indices() {
            let node = &graph.graph[index];
            if !node.is_restricted() {
                continue;
            }
            if permissions.allows_all(&node.restrictions) {
                restricted_nodes.insert(index.index());
            } else {
                hidden_nodes.insert(index.index());
            }
        }

        let mut blocked_edges = union_masks(
            graph.edge_count(),
            graph.waytypes().iter().filter_map(|waytype| {
                let edges = graph.waytype_edges(waytype.id)?;
                match options.policy(&waytype.name) {
                    WayTypePolicy::Allow => None,
                    WayTypePolicy::Avoid => Some(&edges.all),
                    WayTypePolicy::AvoidUp => Some(&edges.upward),
                    WayTypePolicy::AvoidDown => Some(&edges.downward),
                }
            }),
        );
        for edge in graph.graph.edge_indices() {
            if let Some(restriction) = graph.graph[edge].access_restriction {
                if !permissions.allows(restriction) {
                    blocked_edges.insert(edge.index());
                }
            }
        }

        let restriction_factor = match options.restrictions() {
            RestrictionPreference::Avoid => config.restriction_penalty,
            RestrictionPreference::Normal => 1.0,
            RestrictionPreference::Prefer => 1.0 / config.restriction_penalty,
        };

        Self {
            graph,
            permissions,
            blocked_edges,
            hidden_nodes,
            restricted_nodes,
            mode: options.mode(),
            walk_speed: config.base_walk_speed * options.walk_speed().multiplier(),
            restriction_factor,
        }
    }

    pub(crate) fn graph(&self) -> &'a RouterGraph {
        self.graph
    }

    pub(crate) fn permits(&self, restriction: Option<AccessRestrictionId>) -> bool {
        restriction.is_none_or(|restriction| self.permissions.allows(restriction))
    }

    pub(crate) fn node_allowed(&self, node: NodeIndex) -> bool {
        !self.hidden_nodes.contains(node.index())
    }

    pub(crate) fn node_restricted(&self, node: NodeIndex) -> bool {
        self.restricted_nodes.contains(node.index())
    }

    /// Hop over a real edge, `None` when the request may not use it.
    /// `arrived_by` is the way type the source node was reached through.
    pub(crate) fn edge_hop(
        &self,
        edge: EdgeReference<'_, GraphEdge>,
        arrived_by: Option<WayTypeId>,
    ) -> Option<Hop> {
        if self.blocked_edges.contains(edge.id().index())
            || !self.node_allowed(edge.source())
            || !self.node_allowed(edge.target())
        {
            return None;
        }
        let weight = edge.weight();
        let (speed, extra) = match weight.waytype.and_then(|id| self.graph.waytypes().get(id)) {
            Some(waytype) => {
                let entering = arrived_by != Some(waytype.id);
                let extra = if entering { waytype.extra_seconds } else { 0.0 };
                (waytype.speed_for(weight.rise), extra)
            }
            None => (1.0, 0.0),
        };
        let touches_restricted = weight.access_restriction.is_some()
            || self.node_restricted(edge.source())
            || self.node_restricted(edge.target());
        Some(self.hop(
            weight.waytype,
            weight.distance,
            weight.rise,
            speed,
            extra,
            touches_restricted,
        ))
    }

    /// Plain walking hop between a virtual anchor and a real node
    pub(crate) fn link_hop(&self, node: NodeIndex, distance: Distance, rise: f64) -> Hop {
        self.hop(None, distance, rise, 1.0, 0.0, self.node_restricted(node))
    }

    fn hop(
        &self,
        waytype: Option<WayTypeId>,
        distance: Distance,
        rise: f64,
        speed: f64,
        extra_seconds: f64,
        touches_restricted: bool,
    ) -> Hop {
        let seconds = distance / (self.walk_speed * speed) + extra_seconds;
        let base = match self.mode {
            RouteMode::Fastest => seconds,
            RouteMode::Shortest => distance,
        };
        let cost = if touches_restricted {
            base * self.restriction_factor
        } else {
            base
        };
        Hop {
            waytype,
            distance,
            rise,
            seconds,
            cost,
        }
    }
}
