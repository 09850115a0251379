use std::time::Instant;

use log::debug;

use super::anchor::resolve_anchor;
use super::cost::CostModel;
use super::dijkstra::search;
use super::{CancelFlag, EngineConfig, Location, NodePath};
use crate::model::{Permissions, RouterGraph};
use crate::options::RouteOptions;
use crate::RoutingError;

/// Cheapest path between two locations for one request.
///
/// Never mutates `graph`: virtual anchors and every working array live only
/// for the duration of the call. The result is a pure function of the inputs.
///
/// # Errors
///
/// - [`RoutingError::LocationUnreachable`] when an endpoint cannot be placed on the graph
/// - [`RoutingError::NoRouteFound`] when both endpoints are placed but no permitted path joins them
/// - [`RoutingError::Cancelled`] when `cancel` is tripped during the search
pub fn find_route(
    graph: &RouterGraph,
    permissions: &Permissions,
    options: &RouteOptions,
    config: &EngineConfig,
    origin: &Location,
    destination: &Location,
    cancel: &CancelFlag,
) -> Result<NodePath, RoutingError> {
    let started = Instant::now();
    let cost = CostModel::new(graph, permissions, options, config);
    let origin_anchor = resolve_anchor(&cost, config, origin)?;
    let destination_anchor = resolve_anchor(&cost, config, destination)?;

    let found = search(
        &cost,
        &origin_anchor,
        &destination_anchor,
        cancel,
        config.cancel_check_interval,
    )?;
    let Some((nodes, hops)) = found else {
        return Err(RoutingError::NoRouteFound(format!(
            "no permitted path from {origin} to {destination}"
        )));
    };

    let path = NodePath {
        version: graph.version(),
        origin: *origin,
        destination: *destination,
        nodes,
        hops,
    };
    debug!(
        "Route {origin} -> {destination} on map v{}: {} hops, {:.1} m, took {:?}",
        graph.version(),
        path.hops.len(),
        path.distance(),
        started.elapsed()
    );
    Ok(path)
}
