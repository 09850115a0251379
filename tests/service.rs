use std::sync::Arc;

use wayfinder::prelude::*;
use wayfinder::{RouteRequest, RoutingService, ServiceConfig};
use wayfinder_core::loading::{RawEdge, RawLevel, RawNode, RawPolygon, RawSpace, RawWayType};

/// Hall with nodes 1-2-3 in a row (5 m apart) and a lift from node 3 to node 4 upstairs
fn hall(version: u64) -> MapData {
    let node = |id, level, point| RawNode {
        id,
        level,
        point,
        ..RawNode::default()
    };
    let mut lift = RawWayType::new(1, "lift");
    lift.extra_seconds = 20.0;

    MapData {
        version,
        levels: vec![
            RawLevel {
                id: 0,
                short_label: "0".to_string(),
                ..RawLevel::default()
            },
            RawLevel {
                id: 1,
                short_label: "1".to_string(),
                base_altitude: 5.0,
                ..RawLevel::default()
            },
        ],
        spaces: vec![
            RawSpace {
                id: 1,
                level: 0,
                title: Some("Hall".to_string()),
                geometry: RawPolygon::rect([0.0, 0.0], [20.0, 10.0]),
                ..RawSpace::default()
            },
            RawSpace {
                id: 2,
                level: 1,
                title: Some("Gallery".to_string()),
                geometry: RawPolygon::rect([0.0, 0.0], [20.0, 10.0]),
                ..RawSpace::default()
            },
        ],
        way_types: vec![lift],
        nodes: vec![
            node(1, 0, [0.0, 5.0]),
            node(2, 0, [5.0, 5.0]),
            node(3, 0, [10.0, 5.0]),
            node(4, 1, [10.0, 5.0]),
        ],
        edges: vec![
            RawEdge {
                from: 1,
                to: 2,
                both_ways: true,
                ..RawEdge::default()
            },
            RawEdge {
                from: 2,
                to: 3,
                both_ways: true,
                ..RawEdge::default()
            },
            RawEdge {
                from: 3,
                to: 4,
                waytype: Some(1),
                both_ways: true,
                ..RawEdge::default()
            },
        ],
        ..MapData::default()
    }
}

fn service() -> RoutingService {
    RoutingService::new(ServiceConfig::default()).unwrap()
}

fn request(from: u32, to: u32) -> RouteRequest {
    RouteRequest::new(Location::Node { id: from }, Location::Node { id: to })
}

#[test]
fn nothing_published_is_not_yet_routable() {
    let service = service();
    let result = service.route(&request(1, 3));
    assert!(matches!(
        result,
        Err(Error::Routing(RoutingError::NotYetRoutable(_)))
    ));
}

#[test]
fn announced_version_pauses_routing_until_published() {
    let service = service();
    service.publish(&hall(1)).unwrap();
    assert!(service.route(&request(1, 3)).is_ok());

    service.announce(2);
    assert!(matches!(
        service.route(&request(1, 3)),
        Err(Error::Routing(RoutingError::NotYetRoutable(_)))
    ));

    service.publish(&hall(2)).unwrap();
    let route = service.route(&request(1, 3)).unwrap();
    assert_eq!(route.version, 2);
}

#[test]
fn background_rebuild_swaps_snapshot() {
    let service = service();
    service.publish(&hall(1)).unwrap();
    let held = service.store().load().unwrap();

    let handle = service.rebuild_in_background(hall(5));
    assert_eq!(handle.join().unwrap().unwrap(), 5);

    assert_eq!(service.store().version(), Some(5));
    // readers keep the snapshot they loaded
    assert_eq!(held.version(), 1);
}

#[test]
fn older_graphs_never_replace_newer_ones() {
    let service = service();
    service.publish(&hall(4)).unwrap();
    let result = service.publish(&hall(3));
    assert!(matches!(
        result,
        Err(Error::Build(BuildError::StaleMap {
            version: 3,
            live: 4
        }))
    ));
    assert_eq!(service.store().version(), Some(4));
    assert_eq!(service.route(&request(1, 3)).unwrap().version, 4);
}

#[test]
fn failed_build_keeps_serving_the_live_graph() {
    let service = service();
    service.publish(&hall(1)).unwrap();

    let mut broken = hall(2);
    broken.nodes.clear();
    assert!(matches!(
        service.publish(&broken),
        Err(Error::Build(BuildError::EmptyGraph))
    ));
    assert_eq!(service.store().announced(), 1);
    assert_eq!(service.route(&request(1, 3)).unwrap().version, 1);

    let mut broken = hall(3);
    broken.nodes.clear();
    let handle = service.rebuild_in_background(broken);
    assert!(handle.join().unwrap().is_err());
    assert_eq!(service.route(&request(1, 3)).unwrap().version, 1);

    service.publish(&hall(4)).unwrap();
    assert_eq!(service.route(&request(1, 3)).unwrap().version, 4);
}

#[test]
fn failed_first_build_leaves_nothing_to_route() {
    let service = service();
    let mut broken = hall(1);
    broken.nodes.clear();
    assert!(service.publish(&broken).is_err());
    assert_eq!(service.store().announced(), 0);
    assert!(matches!(
        service.route(&request(1, 3)),
        Err(Error::Routing(RoutingError::NotYetRoutable(_)))
    ));
}

#[test]
fn repeated_requests_hit_the_cache() {
    let service = service();
    service.publish(&hall(1)).unwrap();

    let first = service.route(&request(1, 3)).unwrap();
    let second = service.route(&request(1, 3)).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(service.cache().len(), 1);

    let other: RawRouteOptions = "mode=shortest".parse().unwrap();
    let third = service
        .route(&request(1, 3).with_options(other))
        .unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(service.cache().len(), 2);
}

#[test]
fn expired_entries_are_recomputed() {
    let config = ServiceConfig::from_toml_str("[cache]\nttl_secs = 0\n").unwrap();
    let service = RoutingService::new(config).unwrap();
    service.publish(&hall(1)).unwrap();

    let first = service.route(&request(1, 3)).unwrap();
    let second = service.route(&request(1, 3)).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first, second);
}

#[test]
fn lift_entry_is_charged_once() {
    let service = service();
    service.publish(&hall(1)).unwrap();
    let route = service.route(&request(1, 4)).unwrap();
    // 10 m walking, 5 m lift, 20 s waiting for the lift
    assert_eq!(route.distance, 15.0);
    assert_eq!(route.duration, 35);
    assert_eq!(route.items.len(), 3);
    assert_eq!(route.items[1].waytype, Some(1));
}

#[test]
fn option_tiers_follow_service_config() {
    let service = service();
    service.publish(&hall(1)).unwrap();

    let stale: RawRouteOptions = "waytype_escalator=avoid".parse().unwrap();
    let stored = request(1, 4).with_stored_options(stale.clone());
    assert!(service.route(&stored).is_ok());

    let overridden = request(1, 4).with_options(stale.clone());
    assert!(matches!(
        service.route(&overridden),
        Err(Error::Options(OptionsError::InvalidRouteOptions(_)))
    ));

    let lenient = RoutingService::new(ServiceConfig {
        ignore_unknown_options: true,
        ..ServiceConfig::default()
    })
    .unwrap();
    lenient.publish(&hall(1)).unwrap();
    assert!(lenient.route(&request(1, 4).with_options(stale)).is_ok());

    let avoid_lift: RawRouteOptions = "waytype_lift=avoid".parse().unwrap();
    assert!(matches!(
        service.route(&request(1, 4).with_stored_options(avoid_lift)),
        Err(Error::Routing(RoutingError::NoRouteFound(_)))
    ));
}

#[test]
fn batch_results_keep_request_order() {
    let service = service();
    service.publish(&hall(1)).unwrap();

    let requests = vec![request(1, 3), request(3, 1), request(1, 99), request(2, 4)];
    let results = service.route_many(&requests);
    assert_eq!(results.len(), 4);
    assert_eq!(results[0].as_ref().unwrap().distance, 10.0);
    assert_eq!(results[1].as_ref().unwrap().distance, 10.0);
    assert!(matches!(
        results[2],
        Err(Error::Routing(RoutingError::LocationUnreachable(_)))
    ));
    assert_eq!(results[3].as_ref().unwrap().distance, 10.0);
}
