//! Least-cost routing over the live graph.
//!
//! Dijkstra's algorithm on the current edge weights, which the cost model
//! guarantees to be non-negative. The predecessor of each node is tracked
//! as an edge rather than a node, so a path through parallel segments comes
//! back as the exact segments chosen.
//!
//! Ties are broken deterministically: a predecessor is only replaced by a
//! strictly cheaper one, and equal-cost heap entries pop in node-index order.

use ordered_float::OrderedFloat;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::error::{AssignResult, AssignmentError};
use super::graph::RoutingGraph;
use super::types::{JunctionId, SegmentId};

/// Computes the minimum-weight route between two junctions as an ordered
/// list of segment IDs. `start == end` yields an empty route.
pub fn shortest_path(
    network: &RoutingGraph,
    start: &JunctionId,
    end: &JunctionId,
) -> AssignResult<Vec<SegmentId>> {
    let start_node = network.node(start)?;
    let end_node = network.node(end)?;

    if start_node == end_node {
        return Ok(vec![]);
    }

    let graph = network.inner();
    let n = graph.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut prev_edge: Vec<Option<EdgeIndex>> = vec![None; n];

    dist[start_node.index()] = 0.0;

    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, NodeIndex)>> = BinaryHeap::new();
    heap.push(Reverse((OrderedFloat(0.0), start_node)));

    while let Some(Reverse((OrderedFloat(cost), node))) = heap.pop() {
        if node == end_node {
            return Ok(reconstruct(network, &prev_edge, end_node));
        }

        // Stale heap entry
        if cost > dist[node.index()] {
            continue;
        }

        for edge in graph.edges(node) {
            let neighbor = edge.target();
            let new_cost = cost + edge.weight().weight;

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = Some(edge.id());
                heap.push(Reverse((OrderedFloat(new_cost), neighbor)));
            }
        }
    }

    Err(AssignmentError::NoPath {
        from: start.clone(),
        to: end.clone(),
    })
}

fn reconstruct(
    network: &RoutingGraph,
    prev_edge: &[Option<EdgeIndex>],
    end: NodeIndex,
) -> Vec<SegmentId> {
    let graph = network.inner();
    let mut segments = Vec::new();
    let mut current = end;

    while let Some(edge) = prev_edge[current.index()] {
        let Some((source, _)) = graph.edge_endpoints(edge) else {
            break;
        };
        segments.push(graph[edge].id.clone());
        current = source;
    }

    segments.reverse();
    segments
}

/// Sum of the current weights along a route
pub fn path_cost(network: &RoutingGraph, route: &[SegmentId]) -> AssignResult<f64> {
    route.iter().try_fold(0.0, |total, segment| {
        network
            .weight(segment)
            .map(|weight| total + weight)
            .ok_or_else(|| AssignmentError::SegmentNotFound(segment.clone()))
    })
}
