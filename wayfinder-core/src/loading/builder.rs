use std::time::Instant;

use fixedbitset::FixedBitSet;
use geo::Point;
use hashbrown::HashMap;
use itertools::Itertools;
use log::{info, warn};
use petgraph::graph::{DiGraph, NodeIndex};
use rayon::prelude::*;
use rstar::RTree;

use super::config::BuildConfig;
use super::processor::{ProcessedMap, process_map};
use super::raw_types::{MapData, RawEdge, RawNode};
use crate::model::{
    AltitudeArea, Area, BuildStats, GraphEdge, GraphNode, RouterGraph, Space, SpaceEnvelope, WayTypeEdges,
    altitude::resolve_altitude, locate_space,
};
use crate::{AreaId, BuildError, LevelId, SpaceId};

const MAX_EDGE_SAMPLES: usize = 1024;

/// Builds an immutable routing graph from a map snapshot
///
/// # Errors
///
/// Returns [`BuildError::EmptyGraph`] if no node survives validation.
/// Inconsistent single entities are skipped and logged instead.
pub fn build_router_graph(map: &MapData, config: &BuildConfig) -> Result<RouterGraph, BuildError> {
    let started = Instant::now();
    info!("Building router graph for map version {}", map.version);

    let mut stats = BuildStats::default();
    let processed = process_map(map, &mut stats);
    let space_index = build_space_index(&processed.spaces);

    let nodes = resolve_nodes(&map.nodes, &processed, &space_index, config, &mut stats);
    if nodes.is_empty() {
        return Err(BuildError::EmptyGraph);
    }

    let mut graph = DiGraph::with_capacity(nodes.len(), map.edges.len());
    let mut node_lookup = HashMap::with_capacity(nodes.len());
    let mut space_nodes: HashMap<SpaceId, Vec<NodeIndex>> = HashMap::new();
    let mut area_nodes: HashMap<AreaId, Vec<NodeIndex>> = HashMap::new();
    for node in nodes {
        let (id, space, areas) = (node.id, node.space, node.areas.clone());
        let index = graph.add_node(node);
        node_lookup.insert(id, index);
        space_nodes.entry(space).or_default().push(index);
        for area in areas {
            area_nodes.entry(area).or_default().push(index);
        }
    }

    for raw in &map.edges {
        if let Err(reason) = add_edges(&mut graph, &node_lookup, &processed, config, raw) {
            warn!("Skipping edge {} -> {}: {reason}", raw.from, raw.to);
            stats.skipped_edges += 1;
        }
    }

    let waytype_edges = index_waytype_edges(&graph, &processed);

    stats.nodes = graph.node_count();
    stats.edges = graph.edge_count();
    stats.spaces = processed.spaces.len();
    info!(
        "Router graph v{} built in {:.2?}: {} nodes, {} edges, {} spaces ({} nodes, {} edges, {} spaces skipped)",
        map.version,
        started.elapsed(),
        stats.nodes,
        stats.edges,
        stats.spaces,
        stats.skipped_nodes,
        stats.skipped_edges,
        stats.skipped_spaces,
    );

    let ProcessedMap {
        levels,
        spaces,
        areas,
        waytypes,
        altitude_areas,
    } = processed;

    Ok(RouterGraph {
        version: map.version,
        graph,
        node_lookup,
        waytypes,
        waytype_edges,
        levels,
        spaces,
        areas,
        space_nodes,
        area_nodes,
        space_index,
        altitude_areas,
        config: config.clone(),
        stats,
    })
}

fn build_space_index(spaces: &HashMap<SpaceId, Space>) -> HashMap<LevelId, RTree<SpaceEnvelope>> {
    spaces
        .values()
        .filter_map(|space| SpaceEnvelope::new(space).map(|entry| (space.level, entry)))
        .into_group_map()
        .into_iter()
        .map(|(level, entries)| (level, RTree::bulk_load(entries)))
        .collect()
}

/// Places every authored node in a space, resolves its altitude and areas.
/// The result is ordered by authored id so graph indices are stable.
fn resolve_nodes(
    raw_nodes: &[RawNode],
    processed: &ProcessedMap,
    space_index: &HashMap<LevelId, RTree<SpaceEnvelope>>,
    config: &BuildConfig,
    stats: &mut BuildStats,
) -> Vec<GraphNode> {
    let mut areas_by_space: HashMap<SpaceId, Vec<&Area>> = HashMap::new();
    for area in processed.areas.values() {
        areas_by_space.entry(area.space).or_default().push(area);
    }
    for areas in areas_by_space.values_mut() {
        areas.sort_by_key(|area| area.id);
    }

    let sorted: Vec<&RawNode> = raw_nodes.iter().sorted_by_key(|node| node.id).collect();
    let resolved: Vec<Result<GraphNode, String>> = sorted
        .par_iter()
        .map(|raw| resolve_node(raw, processed, space_index, &areas_by_space, config))
        .collect();

    let mut nodes: Vec<GraphNode> = Vec::with_capacity(resolved.len());
    for result in resolved {
        match result {
            Ok(node) if nodes.last().is_some_and(|last| last.id == node.id) => {
                warn!("Skipping node {}: duplicate id", node.id);
                stats.skipped_nodes += 1;
            }
            Ok(node) => nodes.push(node),
            Err(reason) => {
                warn!("{reason}");
                stats.skipped_nodes += 1;
            }
        }
    }
    nodes
}

fn resolve_node(
    raw: &RawNode,
    processed: &ProcessedMap,
    space_index: &HashMap<LevelId, RTree<SpaceEnvelope>>,
    areas_by_space: &HashMap<SpaceId, Vec<&Area>>,
    config: &BuildConfig,
) -> Result<GraphNode, String> {
    let [x, y] = raw.point;
    if !(x.is_finite() && y.is_finite()) {
        return Err(format!("Skipping node {}: invalid coordinates", raw.id));
    }
    let level = processed
        .levels
        .get(&raw.level)
        .ok_or_else(|| format!("Skipping node {}: unknown level {}", raw.id, raw.level))?;
    let point = Point::new(x, y);

    let space = match raw.space {
        Some(space_id) => processed
            .spaces
            .get(&space_id)
            .filter(|space| space.level == raw.level)
            .ok_or_else(|| {
                format!(
                    "Skipping node {}: space {space_id} is unknown, unusable or not on level {}",
                    raw.id, raw.level
                )
            })?,
        None => {
            let tolerance = config.node_space_tolerance;
            let candidates = space_index
                .get(&raw.level)
                .into_iter()
                .flat_map(|tree| {
                    tree.locate_in_envelope_intersecting(&rstar::AABB::from_corners(
                        [x - tolerance, y - tolerance],
                        [x + tolerance, y + tolerance],
                    ))
                })
                .filter_map(|entry| processed.spaces.get(&entry.space));
            locate_space(candidates, &point, tolerance)
                .ok_or_else(|| format!("Skipping node {}: not inside any space", raw.id))?
        }
    };

    let areas: Vec<&Area> = areas_by_space
        .get(&space.id)
        .map(|areas| areas.iter().copied().filter(|area| area.covers(&point)).collect())
        .unwrap_or_default();

    let restrictions: Vec<_> = raw
        .access_restriction
        .into_iter()
        .chain(space.access_restriction)
        .chain(areas.iter().filter_map(|area| area.access_restriction))
        .sorted_unstable()
        .dedup()
        .collect();

    let altitude = processed
        .altitude_areas
        .get(&raw.level)
        .and_then(|candidates| {
            resolve_altitude(
                candidates,
                &point,
                config.altitude_tolerance,
                config.altitude_buffer_radius,
            )
        })
        .unwrap_or(level.base_altitude);

    Ok(GraphNode {
        id: raw.id,
        point,
        altitude,
        level: raw.level,
        space: space.id,
        areas: areas.iter().map(|area| area.id).collect(),
        restrictions,
    })
}

/// Adds one authored connection. Without an authored distance, edges between
/// levels are measured as a straight line and edges within a level follow
/// the floor altitude between their endpoints.
fn add_edges(
    graph: &mut DiGraph<GraphNode, GraphEdge>,
    node_lookup: &HashMap<u32, NodeIndex>,
    processed: &ProcessedMap,
    config: &BuildConfig,
    raw: &RawEdge,
) -> Result<(), String> {
    let from = *node_lookup
        .get(&raw.from)
        .ok_or_else(|| format!("unknown node {}", raw.from))?;
    let to = *node_lookup
        .get(&raw.to)
        .ok_or_else(|| format!("unknown node {}", raw.to))?;
    if from == to {
        return Err("edge connects a node to itself".to_string());
    }
    if let Some(waytype) = raw.waytype {
        if processed.waytypes.get(waytype).is_none() {
            return Err(format!("unknown way type {waytype}"));
        }
    }

    let rise = graph[to].altitude - graph[from].altitude;
    let distance = match raw.distance {
        Some(distance) if distance.is_finite() && distance >= 0.0 => distance,
        Some(distance) => return Err(format!("invalid distance {distance}")),
        None => {
            let (source, target) = (&graph[from], &graph[to]);
            match processed.altitude_areas.get(&source.level) {
                Some(areas) if source.level == target.level => {
                    floor_length(areas, source, target, config)
                }
                _ => {
                    let flat = target.point - source.point;
                    flat.x().hypot(flat.y()).hypot(rise)
                }
            }
        }
    };

    let mut directions = vec![(from, to, rise)];
    if raw.both_ways {
        directions.push((to, from, -rise));
    }
    for (source, target, rise) in directions {
        if graph.find_edge(source, target).is_some() {
            warn!(
                "Duplicate edge {} -> {}, keeping the first one",
                graph[source].id, graph[target].id
            );
            continue;
        }
        graph.add_edge(
            source,
            target,
            GraphEdge {
                waytype: raw.waytype,
                distance,
                rise,
                access_restriction: raw.access_restriction,
            },
        );
    }
    Ok(())
}

/// Walking length between two nodes of one level, sampling the floor
/// altitude every `edge_sample_spacing` meters. Samples outside every
/// altitude area interpolate between the endpoint altitudes.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn floor_length(
    areas: &[AltitudeArea],
    from: &GraphNode,
    to: &GraphNode,
    config: &BuildConfig,
) -> f64 {
    let delta = to.point - from.point;
    let flat = delta.x().hypot(delta.y());
    let steps = ((flat / config.edge_sample_spacing).ceil() as usize).clamp(1, MAX_EDGE_SAMPLES);
    let step_length = flat / steps as f64;

    let mut length = 0.0;
    let mut previous = from.altitude;
    for step in 1..=steps {
        let t = step as f64 / steps as f64;
        let altitude = if step == steps {
            to.altitude
        } else {
            let sample = from.point + delta * t;
            resolve_altitude(
                areas,
                &sample,
                config.altitude_tolerance,
                config.altitude_buffer_radius,
            )
            .unwrap_or(from.altitude + (to.altitude - from.altitude) * t)
        };
        length += step_length.hypot(altitude - previous);
        previous = altitude;
    }
    length
}

fn index_waytype_edges(
    graph: &DiGraph<GraphNode, GraphEdge>,
    processed: &ProcessedMap,
) -> Vec<WayTypeEdges> {
    let edge_count = graph.edge_count();
    let mut tables: Vec<WayTypeEdges> = (0..processed.waytypes.len())
        .map(|_| WayTypeEdges::with_capacity(edge_count))
        .collect();

    for edge in graph.edge_indices() {
        let weight = &graph[edge];
        let Some(slot) = weight.waytype.and_then(|id| processed.waytypes.index_of(id)) else {
            continue;
        };
        let table = &mut tables[slot];
        let bit = edge.index();
        table.all.insert(bit);
        if weight.rise > 0.0 {
            table.upward.insert(bit);
        } else if weight.rise < 0.0 {
            table.downward.insert(bit);
        }
    }
    tables
}

/// Union of the given edge sets, sized for `edge_count` edges
pub(crate) fn union_masks<'a>(
    edge_count: usize,
    masks: impl IntoIterator<Item = &'a FixedBitSet>,
) -> FixedBitSet {
    let mut union = FixedBitSet::with_capacity(edge_count);
    for mask in masks {
        union.union_with(mask);
    }
    union
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::raw_types::{
        RawAltitudeArea, RawArea, RawLevel, RawPolygon, RawSlope, RawSpace, RawWayType,
    };

    fn node(id: u32, level: u32, point: [f64; 2]) -> RawNode {
        RawNode {
            id,
            level,
            point,
            ..RawNode::default()
        }
    }

    fn edge(from: u32, to: u32, waytype: Option<u32>) -> RawEdge {
        RawEdge {
            from,
            to,
            waytype,
            ..RawEdge::default()
        }
    }

    fn two_level_map() -> MapData {
        let mut stairs = RawWayType::new(1, "stairs");
        stairs.up_separate = true;
        MapData {
            version: 7,
            levels: vec![
                RawLevel {
                    id: 0,
                    short_label: "0".into(),
                    ..RawLevel::default()
                },
                RawLevel {
                    id: 1,
                    short_label: "1".into(),
                    base_altitude: 4.0,
                    ..RawLevel::default()
                },
            ],
            spaces: vec![
                RawSpace {
                    id: 10,
                    level: 0,
                    geometry: RawPolygon::rect([0.0, 0.0], [10.0, 10.0]),
                    ..RawSpace::default()
                },
                RawSpace {
                    id: 11,
                    level: 1,
                    geometry: RawPolygon::rect([0.0, 0.0], [10.0, 10.0]),
                    access_restriction: Some(5),
                    ..RawSpace::default()
                },
            ],
            areas: vec![RawArea {
                id: 20,
                space: 10,
                geometry: RawPolygon::rect([0.0, 0.0], [3.0, 3.0]),
                access_restriction: Some(6),
                ..RawArea::default()
            }],
            way_types: vec![stairs],
            altitude_areas: vec![RawAltitudeArea {
                id: 1,
                level: 0,
                geometry: RawPolygon::rect([0.0, 0.0], [10.0, 10.0]),
                slope: Some(RawSlope {
                    from: [0.0, 0.0],
                    from_altitude: 0.0,
                    to: [10.0, 0.0],
                    to_altitude: 1.0,
                }),
                ..RawAltitudeArea::default()
            }],
            nodes: vec![
                node(3, 1, [5.0, 5.0]),
                node(1, 0, [1.0, 1.0]),
                node(2, 0, [5.0, 5.0]),
                node(4, 0, [50.0, 50.0]),
            ],
            edges: vec![
                RawEdge {
                    both_ways: true,
                    ..edge(1, 2, None)
                },
                RawEdge {
                    both_ways: true,
                    ..edge(2, 3, Some(1))
                },
                edge(1, 4, None),
                edge(1, 2, Some(9)),
            ],
        }
    }

    #[test]
    fn nodes_get_space_areas_restrictions_and_altitude() {
        let graph = build_router_graph(&two_level_map(), &BuildConfig::default()).unwrap();

        assert_eq!(graph.version(), 7);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.stats().skipped_nodes, 1);

        let first = graph.node(graph.node_index(1).unwrap());
        assert_eq!(first.space, 10);
        assert_eq!(first.areas, vec![20]);
        assert_eq!(first.restrictions, vec![6]);
        assert!((first.altitude - 0.1).abs() < 1e-9);

        let upstairs = graph.node(graph.node_index(3).unwrap());
        assert_eq!(upstairs.restrictions, vec![5]);
        assert!((upstairs.altitude - 4.0).abs() < 1e-9);

        // Indices follow authored id order
        assert_eq!(graph.node_index(1).map(NodeIndex::index), Some(0));
        assert_eq!(graph.space_nodes(10).len(), 2);
    }

    #[test]
    fn edges_carry_rise_and_waytype_masks() {
        let graph = build_router_graph(&two_level_map(), &BuildConfig::default()).unwrap();

        // 1<->2 and 2<->3; the edge to the skipped node and the unknown way type are dropped
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.stats().skipped_edges, 2);

        let lower = graph.node_index(2).unwrap();
        let upper = graph.node_index(3).unwrap();
        let up = graph.find_edge(lower, upper).unwrap();
        let down = graph.find_edge(upper, lower).unwrap();
        assert!((graph.edge(up).rise - 3.5).abs() < 1e-9);
        assert!((graph.edge(up).distance - 3.5).abs() < 1e-9);
        assert!((graph.edge(down).rise + 3.5).abs() < 1e-9);

        let stairs = graph.waytype_edges(1).unwrap();
        assert!(stairs.upward.contains(up.index()));
        assert!(stairs.downward.contains(down.index()));
        assert_eq!(stairs.all.count_ones(..), 2);
    }

    #[test]
    fn edges_follow_the_floor_onto_a_ramp() {
        // flat floor up to x = 10, then a ramp rising 5 m over the next 10 m
        let map = MapData {
            version: 1,
            levels: vec![RawLevel {
                id: 0,
                short_label: "0".into(),
                ..RawLevel::default()
            }],
            spaces: vec![RawSpace {
                id: 1,
                level: 0,
                geometry: RawPolygon::rect([0.0, 0.0], [20.0, 10.0]),
                ..RawSpace::default()
            }],
            altitude_areas: vec![
                RawAltitudeArea {
                    id: 1,
                    level: 0,
                    geometry: RawPolygon::rect([0.0, 0.0], [10.0, 10.0]),
                    ..RawAltitudeArea::default()
                },
                RawAltitudeArea {
                    id: 2,
                    level: 0,
                    geometry: RawPolygon::rect([10.0, 0.0], [20.0, 10.0]),
                    slope: Some(RawSlope {
                        from: [10.0, 0.0],
                        from_altitude: 0.0,
                        to: [20.0, 0.0],
                        to_altitude: 5.0,
                    }),
                    ..RawAltitudeArea::default()
                },
            ],
            nodes: vec![node(1, 0, [5.0, 5.0]), node(2, 0, [15.0, 5.0])],
            edges: vec![edge(1, 2, None)],
            ..MapData::default()
        };
        let graph = build_router_graph(&map, &BuildConfig::default()).unwrap();
        let from = graph.node_index(1).unwrap();
        let to = graph.node_index(2).unwrap();
        let ramp = graph.edge(graph.find_edge(from, to).unwrap());

        assert!((ramp.rise - 2.5).abs() < 1e-9);
        let expected = 5.0 + 5.0_f64.hypot(2.5);
        assert!((ramp.distance - expected).abs() < 1e-6, "{}", ramp.distance);
        assert!(ramp.distance > 10.0_f64.hypot(2.5));
    }

    #[test]
    fn map_without_nodes_fails() {
        let mut map = two_level_map();
        map.nodes.clear();
        assert_eq!(
            build_router_graph(&map, &BuildConfig::default()).unwrap_err(),
            BuildError::EmptyGraph
        );
    }
}
