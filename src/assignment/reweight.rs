//! Per-tick graph reweighting
//!
//! A full pass over every edge: read the live occupancy, price it with the
//! cost model, write it back. All new weights are computed before any is
//! written, so a failure leaves the previous tick's weights intact.

use super::cost::CostModel;
use super::error::AssignResult;
use super::graph::RoutingGraph;
use super::types::SegmentId;
use crate::simulation::TrafficSimulator;

/// Refreshes every edge weight from the simulator. Returns the number of
/// segments updated.
pub fn reweight<S: TrafficSimulator + ?Sized>(
    network: &mut RoutingGraph,
    cost: &CostModel,
    simulator: &S,
) -> AssignResult<usize> {
    let mut weights: Vec<(SegmentId, f64)> = Vec::with_capacity(network.segment_count());

    for segment in network.segments() {
        let volume = simulator.segment_vehicle_count(&segment.id)?;
        let weight = cost.travel_time(&segment.id, &segment.geometry, volume)?;
        weights.push((segment.id.clone(), weight));
    }

    for (segment, weight) in &weights {
        network.update_weight(segment, *weight)?;
    }

    log::trace!("Reweighted {} segments", weights.len());
    Ok(weights.len())
}
