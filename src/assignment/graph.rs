//! Road network graph for routing
//!
//! A directed multigraph: every road segment is its own edge, so parallel
//! segments between the same pair of junctions are all kept and routing can
//! choose among them. Topology is fixed after [`RoutingGraph::build`]; only
//! edge weights change afterwards.

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use std::collections::HashMap;

use super::cost::CostModel;
use super::error::{AssignResult, AssignmentError};
use super::network::NetworkDescription;
use super::types::{JunctionId, RoadSegment, SegmentId};

#[derive(Debug, Clone, Default)]
pub struct RoutingGraph {
    /// The underlying petgraph directed graph
    graph: DiGraph<JunctionId, RoadSegment>,

    /// Maps junction IDs to their node indices in the graph
    junction_to_node: HashMap<JunctionId, NodeIndex>,

    /// Maps segment IDs to their edge indices in the graph
    segment_to_edge: HashMap<SegmentId, EdgeIndex>,
}

impl RoutingGraph {
    /// Builds the graph with every weight set to the free-flow cost
    pub fn build(description: &NetworkDescription, cost: &CostModel) -> AssignResult<Self> {
        description.validate()?;

        let mut network = Self::default();

        for junction in &description.junctions {
            let node = network.graph.add_node(junction.id.clone());
            network.junction_to_node.insert(junction.id.clone(), node);
        }

        for spec in &description.segments {
            let geometry = spec.geometry();
            let weight = cost.travel_time(&spec.id, &geometry, 0)?;

            let start_node = network.node(&spec.from)?;
            let end_node = network.node(&spec.to)?;

            let edge = network.graph.add_edge(
                start_node,
                end_node,
                RoadSegment {
                    id: spec.id.clone(),
                    from: spec.from.clone(),
                    to: spec.to.clone(),
                    geometry,
                    weight,
                },
            );
            network.segment_to_edge.insert(spec.id.clone(), edge);
        }

        log::debug!(
            "Built routing graph: {} junctions, {} segments",
            network.junction_count(),
            network.segment_count()
        );

        Ok(network)
    }

    /// Sets the weight of a single segment
    pub fn update_weight(&mut self, segment: &SegmentId, weight: f64) -> AssignResult<()> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(AssignmentError::InvalidWeight {
                segment: segment.clone(),
                weight,
            });
        }

        let edge = self.edge(segment)?;
        let data = self
            .graph
            .edge_weight_mut(edge)
            .ok_or_else(|| AssignmentError::SegmentNotFound(segment.clone()))?;
        data.weight = weight;
        Ok(())
    }

    /// Current weight of a segment
    pub fn weight(&self, segment: &SegmentId) -> Option<f64> {
        self.segment(segment).map(|s| s.weight)
    }

    /// Gets a segment by ID
    pub fn segment(&self, segment: &SegmentId) -> Option<&RoadSegment> {
        let edge = self.segment_to_edge.get(segment)?;
        self.graph.edge_weight(*edge)
    }

    /// All segments in build order
    pub fn segments(&self) -> impl Iterator<Item = &RoadSegment> {
        self.graph.edge_weights()
    }

    pub fn segment_ids(&self) -> Vec<SegmentId> {
        self.segments().map(|s| s.id.clone()).collect()
    }

    pub fn contains_junction(&self, junction: &JunctionId) -> bool {
        self.junction_to_node.contains_key(junction)
    }

    pub fn junction_count(&self) -> usize {
        self.junction_to_node.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segment_to_edge.len()
    }

    pub(crate) fn node(&self, junction: &JunctionId) -> AssignResult<NodeIndex> {
        self.junction_to_node
            .get(junction)
            .copied()
            .ok_or_else(|| AssignmentError::JunctionNotFound(junction.clone()))
    }

    pub(crate) fn edge(&self, segment: &SegmentId) -> AssignResult<EdgeIndex> {
        self.segment_to_edge
            .get(segment)
            .copied()
            .ok_or_else(|| AssignmentError::SegmentNotFound(segment.clone()))
    }

    pub(crate) fn inner(&self) -> &DiGraph<JunctionId, RoadSegment> {
        &self.graph
    }
}
