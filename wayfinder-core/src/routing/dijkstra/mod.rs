//! Single-pair Dijkstra over the graph of one request.
//!
//! Search vertices are the graph's node indices, followed by two request-scoped
//! slots for a virtual origin and a virtual destination.

mod state;

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use log::debug;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

use self::state::State;
use super::CancelFlag;
use super::anchor::{Anchor, AnchorLink};
use super::cost::CostModel;
use super::path::{Hop, PathNode};
use crate::{RoutingError, WayTypeId};

#[derive(Debug, Clone, Copy)]
struct Predecessor {
    vertex: usize,
    hop: Hop,
}

struct SearchSpace<'a, 'g> {
    cost: &'a CostModel<'g>,
    node_count: usize,
    origin: &'a Anchor,
    destination: &'a Anchor,
    destination_links: HashMap<NodeIndex, AnchorLink>,
}

impl<'a, 'g> SearchSpace<'a, 'g> {
    fn new(cost: &'a CostModel<'g>, origin: &'a Anchor, destination: &'a Anchor) -> Self {
        let destination_links = match destination {
            Anchor::Node(_) => HashMap::new(),
            Anchor::Virtual { links, .. } => links.iter().map(|link| (link.node, *link)).collect(),
        };
        Self {
            cost,
            node_count: cost.graph().node_count(),
            origin,
            destination,
            destination_links,
        }
    }

    fn virtual_origin(&self) -> usize {
        self.node_count
    }

    fn virtual_destination(&self) -> usize {
        self.node_count + 1
    }

    fn origin_vertex(&self) -> usize {
        match self.origin {
            Anchor::Node(index) => index.index(),
            Anchor::Virtual { .. } => self.virtual_origin(),
        }
    }

    fn destination_vertex(&self) -> usize {
        match self.destination {
            Anchor::Node(index) => index.index(),
            Anchor::Virtual { .. } => self.virtual_destination(),
        }
    }

    fn path_node(&self, vertex: usize) -> PathNode {
        let anchor = if vertex == self.virtual_origin() {
            self.origin
        } else if vertex == self.virtual_destination() {
            self.destination
        } else {
            return PathNode::Graph(NodeIndex::new(vertex));
        };
        match anchor {
            Anchor::Virtual { node, .. } => node.clone(),
            Anchor::Node(index) => PathNode::Graph(*index),
        }
    }

    fn neighbours(&self, vertex: usize, arrived_by: Option<WayTypeId>, out: &mut Vec<(usize, Hop)>) {
        if vertex == self.virtual_origin() {
            if let Anchor::Virtual { links, .. } = self.origin {
                out.extend(links.iter().map(|link| {
                    let hop = self.cost.link_hop(link.node, link.distance, link.rise);
                    (link.node.index(), hop)
                }));
            }
            return;
        }
        if vertex == self.virtual_destination() {
            return;
        }

        let node = NodeIndex::new(vertex);
        for edge in self.cost.graph().edges(node) {
            if let Some(hop) = self.cost.edge_hop(edge, arrived_by) {
                out.push((edge.target().index(), hop));
            }
        }
        if let Some(link) = self.destination_links.get(&node) {
            let hop = self.cost.link_hop(node, link.distance, -link.rise);
            out.push((self.virtual_destination(), hop));
        }
    }
}

/// Cheapest path from `origin` to `destination`, `None` when the destination
/// cannot be reached. Equal-cost alternatives resolve to the lowest predecessor id.
pub(super) fn search(
    cost: &CostModel<'_>,
    origin: &Anchor,
    destination: &Anchor,
    cancel: &CancelFlag,
    check_interval: usize,
) -> Result<Option<(Vec<PathNode>, Vec<Hop>)>, RoutingError> {
    if cancel.is_cancelled() {
        return Err(RoutingError::Cancelled);
    }

    let space = SearchSpace::new(cost, origin, destination);
    let vertex_count = space.node_count + 2;
    let start = space.origin_vertex();
    let target = space.destination_vertex();

    let mut costs = vec![f64::INFINITY; vertex_count];
    let mut predecessors: Vec<Option<Predecessor>> = vec![None; vertex_count];
    let mut settled = FixedBitSet::with_capacity(vertex_count);
    let mut heap = BinaryHeap::new();
    let mut neighbours = Vec::new();

    costs[start] = 0.0;
    heap.push(State {
        cost: 0.0,
        vertex: start,
    });

    let mut settled_count = 0usize;
    let mut found = false;
    while let Some(State { cost, vertex }) = heap.pop() {
        if settled.contains(vertex) {
            continue;
        }
        settled.insert(vertex);
        if vertex == target {
            found = true;
            break;
        }

        settled_count += 1;
        if settled_count % check_interval.max(1) == 0 && cancel.is_cancelled() {
            debug!("Search cancelled after settling {settled_count} vertices");
            return Err(RoutingError::Cancelled);
        }

        let arrived_by = predecessors[vertex].and_then(|pred| pred.hop.waytype);
        neighbours.clear();
        space.neighbours(vertex, arrived_by, &mut neighbours);

        for &(next, hop) in &neighbours {
            if settled.contains(next) {
                continue;
            }
            let next_cost = cost + hop.cost;
            match next_cost.total_cmp(&costs[next]) {
                Ordering::Less => {
                    costs[next] = next_cost;
                    predecessors[next] = Some(Predecessor { vertex, hop });
                    heap.push(State {
                        cost: next_cost,
                        vertex: next,
                    });
                }
                Ordering::Equal => {
                    if predecessors[next].is_some_and(|pred| vertex < pred.vertex) {
                        predecessors[next] = Some(Predecessor { vertex, hop });
                    }
                }
                Ordering::Greater => {}
            }
        }
    }

    debug!("Search settled {settled_count} vertices, destination reached: {found}");
    if !found {
        return Ok(None);
    }

    let mut vertices = vec![target];
    let mut hops = Vec::new();
    let mut current = target;
    while let Some(pred) = predecessors[current] {
        hops.push(pred.hop);
        vertices.push(pred.vertex);
        current = pred.vertex;
    }
    vertices.reverse();
    hops.reverse();

    let nodes = vertices
        .into_iter()
        .map(|vertex| space.path_node(vertex))
        .collect();
    Ok(Some((nodes, hops)))
}
