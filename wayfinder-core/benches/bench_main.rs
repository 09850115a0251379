//! Graph build and route search on a synthetic multi-level grid

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use wayfinder_core::loading::{RawEdge, RawLevel, RawNode, RawPolygon, RawSpace, RawWayType};
use wayfinder_core::prelude::*;

const SPACING: f64 = 2.0;
const LEVEL_HEIGHT: f64 = 4.0;

/// `levels` stacked floors of `side` x `side` nodes, joined by stairs in two corners
fn grid_map(levels: u32, side: u32) -> MapData {
    let extent = f64::from(side) * SPACING;
    let node_id = |level: u32, row: u32, col: u32| level * side * side + row * side + col + 1;

    let mut stairs = RawWayType::new(1, "stairs");
    stairs.up_separate = true;
    let mut map = MapData {
        version: 1,
        way_types: vec![stairs],
        ..MapData::default()
    };

    for level in 0..levels {
        map.levels.push(RawLevel {
            id: level,
            short_label: level.to_string(),
            base_altitude: f64::from(level) * LEVEL_HEIGHT,
            ..RawLevel::default()
        });
        map.spaces.push(RawSpace {
            id: level + 1,
            level,
            geometry: RawPolygon::rect([-1.0, -1.0], [extent, extent]),
            ..RawSpace::default()
        });
        for row in 0..side {
            for col in 0..side {
                let id = node_id(level, row, col);
                map.nodes.push(RawNode {
                    id,
                    level,
                    point: [f64::from(col) * SPACING, f64::from(row) * SPACING],
                    ..RawNode::default()
                });
                let neighbours = [(row, col + 1), (row + 1, col)];
                for (r, c) in neighbours {
                    if r < side && c < side {
                        map.edges.push(RawEdge {
                            from: id,
                            to: node_id(level, r, c),
                            both_ways: true,
                            ..RawEdge::default()
                        });
                    }
                }
            }
        }
        if level + 1 < levels {
            for (row, col) in [(0, 0), (side - 1, side - 1)] {
                map.edges.push(RawEdge {
                    from: node_id(level, row, col),
                    to: node_id(level + 1, row, col),
                    waytype: Some(1),
                    both_ways: true,
                    ..RawEdge::default()
                });
            }
        }
    }
    map
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_router_graph");
    group.sample_size(10);
    for side in [20, 50] {
        let map = grid_map(3, side);
        group.bench_with_input(BenchmarkId::from_parameter(side), &map, |b, map| {
            b.iter(|| build_router_graph(black_box(map), &BuildConfig::default()));
        });
    }
    group.finish();
}

fn bench_find_route(c: &mut Criterion) {
    let side = 50;
    let graph = build_router_graph(&grid_map(3, side), &BuildConfig::default())
        .expect("grid map builds");
    let defaults = RouteOptions::defaults(graph.waytypes());
    let avoid_up: RawRouteOptions = "waytype_stairs=avoid_up".parse().expect("valid options");
    let avoid_up = resolve(graph.waytypes(), &defaults, None, &avoid_up, false)
        .expect("valid options");
    let permissions = Permissions::none();
    let config = EngineConfig::default();
    let origin = Location::Point {
        level: 0,
        x: 1.0,
        y: 1.0,
    };
    let destination = Location::Node {
        id: 3 * side * side,
    };

    let mut group = c.benchmark_group("find_route");
    for (name, options) in [("defaults", &defaults), ("avoid_up", &avoid_up)] {
        group.bench_function(name, |b| {
            b.iter(|| {
                find_route(
                    &graph,
                    &permissions,
                    options,
                    &config,
                    black_box(&origin),
                    black_box(&destination),
                    &CancelFlag::new(),
                )
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_find_route);
criterion_main!(benches);
