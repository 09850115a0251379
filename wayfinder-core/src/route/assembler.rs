use log::debug;

use super::instructions::{InstructionTable, Transition, fill};
use super::{Coordinates, Route, RouteEndpoint, RouteItem, format_distance, format_duration};
use crate::model::RouterGraph;
use crate::options::RouteOptions;
use crate::routing::{Hop, Location, NodePath, PathNode};
use crate::{LevelId, SpaceId};

/// A located point of the path with the hop that reached it
#[derive(Debug, Clone, Copy)]
struct Stop {
    coordinates: Coordinates,
    space: SpaceId,
    incoming: Option<Hop>,
}

/// Narrates a search result.
///
/// Virtual space and area anchors are dropped along with their zero-length
/// hops. Items are emitted at the first and last point and wherever a space
/// or level is entered or the way type of the next hop differs from the
/// previous one.
pub fn assemble(
    path: &NodePath,
    graph: &RouterGraph,
    options: &RouteOptions,
    instructions: &InstructionTable,
) -> Route {
    if path.version != graph.version() {
        debug!(
            "Assembling a path of map v{} against map v{}",
            path.version,
            graph.version()
        );
    }

    let stops = collect_stops(path, graph);
    let origin = endpoint(&path.origin, stops.first(), graph, instructions);
    let destination = endpoint(&path.destination, stops.last(), graph, instructions);

    let mut items = Vec::new();
    for (idx, stop) in stops.iter().enumerate() {
        let is_first = idx == 0;
        let is_last = idx + 1 == stops.len();
        let previous = idx.checked_sub(1).map(|prev| &stops[prev]);
        let outgoing = stops.get(idx + 1).and_then(|next| next.incoming);

        let level_entered = previous.is_some_and(|prev| {
            graph.primary_level(prev.coordinates.level)
                != graph.primary_level(stop.coordinates.level)
        });
        let space_entered = previous.is_some_and(|prev| prev.space != stop.space);
        let arrived_by = stop.incoming.and_then(|hop| hop.waytype);
        let leaving_by = outgoing.and_then(|hop| hop.waytype);
        let waytype_changed = outgoing.is_some() && leaving_by != arrived_by;

        if !(is_first || is_last || level_entered || space_entered || waytype_changed) {
            continue;
        }

        let space_name = space_name(graph, stop.space);
        let mut descriptions = Vec::new();
        if is_first {
            descriptions.extend(
                instructions.describe(Transition::Start, &[("space", space_name.as_str())]),
            );
        }
        if level_entered {
            let level = level_name(graph, stop.coordinates.level);
            descriptions.extend(
                instructions.describe(Transition::EnterLevel, &[("level", level.as_str())]),
            );
        }
        if space_entered {
            descriptions.extend(
                instructions.describe(Transition::EnterSpace, &[("space", space_name.as_str())]),
            );
        }
        let starting_waytype = if waytype_changed { leaving_by } else { None };
        if let (Some(id), Some(hop)) = (starting_waytype, outgoing) {
            if let Some(waytype) = graph.waytypes().get(id) {
                descriptions.extend(instructions.describe_waytype(waytype, hop.rise));
            }
        }
        if is_last {
            descriptions.extend(instructions.describe(
                Transition::Arrive,
                &[("destination", destination.title.as_str())],
            ));
        }

        items.push(RouteItem {
            coordinates: stop.coordinates,
            in_space: stop.space,
            waytype: starting_waytype,
            space: space_entered.then_some(stop.space),
            level: level_entered.then(|| graph.primary_level(stop.coordinates.level)),
            descriptions,
        });
    }

    let distance = path.distance();
    let duration = path.duration().round() as u32;
    let distance_str = format_distance(distance);
    let duration_str = format_duration(duration);
    let summary = fill(
        &instructions.summary,
        &[
            ("origin", origin.title.as_str()),
            ("destination", destination.title.as_str()),
            ("distance", distance_str.as_str()),
            ("duration", duration_str.as_str()),
        ],
    );

    Route {
        version: path.version,
        origin,
        destination,
        distance,
        duration,
        distance_str,
        duration_str,
        summary,
        options_summary: options.summary(graph.waytypes()),
        items,
    }
}

fn collect_stops(path: &NodePath, graph: &RouterGraph) -> Vec<Stop> {
    let mut stops: Vec<Stop> = Vec::with_capacity(path.nodes.len());
    for (idx, node) in path.nodes.iter().enumerate() {
        let (coordinates, space) = match node {
            PathNode::Graph(index) => {
                let Some(node) = graph.graph.node_weight(*index) else {
                    continue;
                };
                let coordinates = Coordinates {
                    level: node.level,
                    x: node.point.x(),
                    y: node.point.y(),
                    altitude: node.altitude,
                };
                (coordinates, node.space)
            }
            PathNode::Custom(custom) => {
                let coordinates = Coordinates {
                    level: custom.level,
                    x: custom.point.x(),
                    y: custom.point.y(),
                    altitude: custom.altitude,
                };
                (coordinates, custom.space)
            }
            PathNode::Container => continue,
        };
        // The hop into the first located point only leaves a virtual anchor
        let incoming = if stops.is_empty() {
            None
        } else {
            idx.checked_sub(1).and_then(|hop| path.hops.get(hop)).copied()
        };
        stops.push(Stop {
            coordinates,
            space,
            incoming,
        });
    }
    stops
}

fn endpoint(
    location: &Location,
    stop: Option<&Stop>,
    graph: &RouterGraph,
    instructions: &InstructionTable,
) -> RouteEndpoint {
    let title = match *location {
        Location::Node { .. } | Location::Space { .. } => stop
            .map(|stop| space_name(graph, stop.space))
            .unwrap_or_else(|| location.to_string()),
        Location::Point { .. } => {
            let space = stop
                .map(|stop| space_name(graph, stop.space))
                .unwrap_or_default();
            fill(&instructions.custom_location, &[("space", space.as_str())])
        }
        Location::Area { id } => graph
            .area(id)
            .and_then(|area| area.title.clone())
            .unwrap_or_else(|| location.to_string()),
    };
    RouteEndpoint {
        location: *location,
        title,
    }
}

fn space_name(graph: &RouterGraph, space: SpaceId) -> String {
    graph
        .space(space)
        .map(|space| space.display_name())
        .unwrap_or_else(|| format!("space {space}"))
}

fn level_name(graph: &RouterGraph, level: LevelId) -> String {
    let primary = graph.primary_level(level);
    graph
        .level(primary)
        .map(|level| level.display_name().to_string())
        .unwrap_or_else(|| primary.to_string())
}
