#![allow(dead_code)]

use wayfinder_core::loading::{RawEdge, RawLevel, RawNode, RawPolygon, RawSpace, RawWayType};
use wayfinder_core::prelude::*;
use wayfinder_core::routing::PathNode;

pub const STAIRS: u32 = 1;
pub const OFFICE_RESTRICTION: u32 = 7;
pub const LAB_RESTRICTION: u32 = 9;

pub fn level(id: u32, label: &str, title: &str, base_altitude: f64) -> RawLevel {
    RawLevel {
        id,
        short_label: label.to_string(),
        title: Some(title.to_string()),
        base_altitude,
        ..RawLevel::default()
    }
}

pub fn space(id: u32, level: u32, title: &str, min: [f64; 2], max: [f64; 2]) -> RawSpace {
    RawSpace {
        id,
        level,
        title: Some(title.to_string()),
        geometry: RawPolygon::rect(min, max),
        ..RawSpace::default()
    }
}

pub fn node(id: u32, level: u32, point: [f64; 2]) -> RawNode {
    RawNode {
        id,
        level,
        point,
        ..RawNode::default()
    }
}

pub fn walk(from: u32, to: u32) -> RawEdge {
    RawEdge {
        from,
        to,
        both_ways: true,
        ..RawEdge::default()
    }
}

/// Two levels joined by a single staircase.
///
/// Ground floor: corridor nodes 1-2-3-4 (2 m, 3 m, 4 m apart), a restricted
/// office (node 5) east of the corridor, a stairwell (node 6) north of node 1.
/// First floor: landing (node 7, above node 6) and library (node 8).
pub fn building() -> MapData {
    let mut stairs = RawWayType::new(STAIRS, "stairs");
    stairs.title = "Stairs".to_string();
    stairs.title_plural = "Stairs".to_string();
    stairs.up_separate = true;

    let mut office = space(11, 0, "Office", [20.0, 0.0], [30.0, 4.0]);
    office.access_restriction = Some(OFFICE_RESTRICTION);

    MapData {
        version: 3,
        levels: vec![
            level(0, "0", "Ground floor", 0.0),
            level(1, "1", "First floor", 4.0),
        ],
        spaces: vec![
            space(10, 0, "Corridor", [0.0, 0.0], [20.0, 4.0]),
            office,
            space(12, 0, "Stairwell", [0.0, 4.0], [4.0, 8.0]),
            space(20, 1, "Landing", [0.0, 4.0], [4.0, 8.0]),
            space(21, 1, "Library", [4.0, 4.0], [20.0, 8.0]),
        ],
        way_types: vec![stairs],
        nodes: vec![
            node(1, 0, [2.0, 2.0]),
            node(2, 0, [4.0, 2.0]),
            node(3, 0, [7.0, 2.0]),
            node(4, 0, [11.0, 2.0]),
            node(5, 0, [25.0, 2.0]),
            node(6, 0, [2.0, 6.0]),
            node(7, 1, [2.0, 6.0]),
            node(8, 1, [10.0, 6.0]),
        ],
        edges: vec![
            walk(1, 2),
            walk(2, 3),
            walk(3, 4),
            walk(4, 5),
            walk(1, 6),
            RawEdge {
                from: 6,
                to: 7,
                waytype: Some(STAIRS),
                distance: Some(5.0),
                both_ways: true,
                ..RawEdge::default()
            },
            walk(7, 8),
        ],
        ..MapData::default()
    }
}

/// Node 1 reaches node 4 through node 2 (3 m + 3 m) or node 3 (1 m + 5 m).
pub fn diamond() -> MapData {
    let one_way = |from, to, distance| RawEdge {
        from,
        to,
        distance: Some(distance),
        ..RawEdge::default()
    };
    MapData {
        version: 1,
        levels: vec![level(0, "0", "Ground floor", 0.0)],
        spaces: vec![space(1, 0, "Hall", [0.0, 0.0], [10.0, 10.0])],
        nodes: vec![
            node(1, 0, [1.0, 5.0]),
            node(2, 0, [5.0, 8.0]),
            node(3, 0, [5.0, 2.0]),
            node(4, 0, [9.0, 5.0]),
        ],
        edges: vec![
            one_way(1, 2, 3.0),
            one_way(2, 4, 3.0),
            one_way(1, 3, 1.0),
            one_way(3, 4, 5.0),
        ],
        ..MapData::default()
    }
}

/// A restricted lab between two halls (node 1 -> 2 -> 3, 10 m + 10 m) and an
/// unrestricted detour through the north corridor (1 -> 4 -> 5 -> 3, 7 m + 20 m + 7 m).
pub fn shortcut() -> MapData {
    let mut lab = space(2, 0, "Lab", [10.0, 0.0], [20.0, 10.0]);
    lab.access_restriction = Some(LAB_RESTRICTION);
    MapData {
        version: 1,
        levels: vec![level(0, "0", "Ground floor", 0.0)],
        spaces: vec![
            space(1, 0, "West hall", [0.0, 0.0], [10.0, 10.0]),
            lab,
            space(3, 0, "East hall", [20.0, 0.0], [30.0, 10.0]),
            space(4, 0, "North corridor", [0.0, 10.0], [30.0, 14.0]),
        ],
        nodes: vec![
            node(1, 0, [5.0, 5.0]),
            node(2, 0, [15.0, 5.0]),
            node(3, 0, [25.0, 5.0]),
            node(4, 0, [5.0, 12.0]),
            node(5, 0, [25.0, 12.0]),
        ],
        edges: vec![walk(1, 2), walk(2, 3), walk(1, 4), walk(4, 5), walk(5, 3)],
        ..MapData::default()
    }
}

pub fn build(map: &MapData) -> RouterGraph {
    build_router_graph(map, &BuildConfig::default()).expect("fixture map builds")
}

pub fn options(graph: &RouterGraph, overrides: &str) -> RouteOptions {
    let raw: RawRouteOptions = overrides.parse().expect("valid option string");
    resolve(
        graph.waytypes(),
        &RouteOptions::defaults(graph.waytypes()),
        None,
        &raw,
        false,
    )
    .expect("valid options")
}

pub fn node_at(id: u32) -> Location {
    Location::Node { id }
}

pub fn route(
    graph: &RouterGraph,
    permissions: &Permissions,
    options: &RouteOptions,
    origin: Location,
    destination: Location,
) -> Result<Route, RoutingError> {
    let path = node_path(graph, permissions, options, origin, destination)?;
    Ok(assemble(&path, graph, options, &InstructionTable::default()))
}

pub fn node_path(
    graph: &RouterGraph,
    permissions: &Permissions,
    options: &RouteOptions,
    origin: Location,
    destination: Location,
) -> Result<NodePath, RoutingError> {
    find_route(
        graph,
        permissions,
        options,
        &EngineConfig::default(),
        &origin,
        &destination,
        &CancelFlag::new(),
    )
}

/// Authored ids of the real nodes along a path
pub fn node_ids(graph: &RouterGraph, path: &NodePath) -> Vec<u32> {
    path.nodes
        .iter()
        .filter_map(|node| match node {
            PathNode::Graph(index) => Some(graph.node(*index).id),
            _ => None,
        })
        .collect()
}
