//! Placing request endpoints on the graph.

use geo::Point;
use log::trace;
use petgraph::graph::NodeIndex;

use super::EngineConfig;
use super::cost::CostModel;
use super::path::{CustomPoint, Location, PathNode};
use crate::RoutingError;
use crate::model::locate_space;

/// Straight connection between a virtual anchor and a real node
#[derive(Debug, Clone, Copy)]
pub(crate) struct AnchorLink {
    pub(crate) node: NodeIndex,
    pub(crate) distance: f64,
    /// `node.altitude - anchor altitude`
    pub(crate) rise: f64,
}

#[derive(Debug, Clone)]
pub(crate) enum Anchor {
    Node(NodeIndex),
    Virtual {
        node: PathNode,
        links: Vec<AnchorLink>,
    },
}

pub(crate) fn resolve_anchor(
    cost: &CostModel<'_>,
    config: &EngineConfig,
    location: &Location,
) -> Result<Anchor, RoutingError> {
    let graph = cost.graph();
    let unreachable = |reason: String| Err(RoutingError::LocationUnreachable(reason));

    match *location {
        Location::Node { id } => {
            let Some(index) = graph.node_index(id) else {
                return unreachable(format!("unknown node {id}"));
            };
            if !cost.node_allowed(index) {
                return unreachable(format!("node {id} is not accessible"));
            }
            Ok(Anchor::Node(index))
        }
        Location::Point { level, x, y } => {
            if graph.level(level).is_none() {
                return unreachable(format!("unknown level {level}"));
            }
            let point = Point::new(x, y);
            let tolerance = config.anchor_tolerance;
            let candidates = graph.spaces_near(level, &point, tolerance);
            let Some(space) = locate_space(candidates, &point, tolerance) else {
                return unreachable(format!("{location} is not inside any space"));
            };
            if !cost.permits(space.access_restriction) {
                return unreachable(format!("{location} is inside an inaccessible space"));
            }
            if graph
                .areas_at(space.id, &point)
                .iter()
                .any(|area| !cost.permits(area.access_restriction))
            {
                return unreachable(format!("{location} is inside an inaccessible area"));
            }

            let altitude = graph.altitude_at(level, &point);
            let links: Vec<AnchorLink> = graph
                .space_nodes(space.id)
                .iter()
                .copied()
                .filter(|&index| cost.node_allowed(index))
                .map(|index| {
                    let node = graph.node(index);
                    let rise = node.altitude - altitude;
                    let flat = (node.point.x() - x).hypot(node.point.y() - y);
                    AnchorLink {
                        node: index,
                        distance: flat.hypot(rise),
                        rise,
                    }
                })
                .collect();
            if links.is_empty() {
                return unreachable(format!("{} has no accessible nodes", space.display_name()));
            }
            trace!(
                "Placed {location} in space {} with {} links",
                space.id,
                links.len()
            );
            Ok(Anchor::Virtual {
                node: PathNode::Custom(CustomPoint {
                    level,
                    space: space.id,
                    point,
                    altitude,
                }),
                links,
            })
        }
        Location::Space { id } => {
            let Some(space) = graph.space(id) else {
                return unreachable(format!("unknown space {id}"));
            };
            if !cost.permits(space.access_restriction) {
                return unreachable(format!("{} is not accessible", space.display_name()));
            }
            container_anchor(cost, graph.space_nodes(id), location)
        }
        Location::Area { id } => {
            let Some(area) = graph.area(id) else {
                return unreachable(format!("unknown area {id}"));
            };
            let space_permitted = graph
                .space(area.space)
                .is_some_and(|space| cost.permits(space.access_restriction));
            if !space_permitted || !cost.permits(area.access_restriction) {
                return unreachable(format!("area {id} is not accessible"));
            }
            container_anchor(cost, graph.area_nodes(id), location)
        }
    }
}

fn container_anchor(
    cost: &CostModel<'_>,
    nodes: &[NodeIndex],
    location: &Location,
) -> Result<Anchor, RoutingError> {
    let links: Vec<AnchorLink> = nodes
        .iter()
        .copied()
        .filter(|&index| cost.node_allowed(index))
        .map(|node| AnchorLink {
            node,
            distance: 0.0,
            rise: 0.0,
        })
        .collect();
    if links.is_empty() {
        return Err(RoutingError::LocationUnreachable(format!(
            "{location} has no accessible nodes"
        )));
    }
    Ok(Anchor::Virtual {
        node: PathNode::Container,
        links,
    })
}
