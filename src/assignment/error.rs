//! Controller error type.

use std::path::PathBuf;

use thiserror::Error;

use super::types::{JunctionId, SegmentId, VehicleId};
use crate::simulation::SimulatorError;

/// Errors produced by the routing controller.
#[derive(Debug, Error)]
pub enum AssignmentError {
    #[error("segment {segment} is degenerate: {reason}")]
    DegenerateSegment { segment: SegmentId, reason: String },

    #[error("malformed network description: {0}")]
    MalformedNetwork(String),

    #[error("junction {0} not found in network")]
    JunctionNotFound(JunctionId),

    #[error("segment {0} not found in network")]
    SegmentNotFound(SegmentId),

    #[error("invalid cost model parameter {name} = {value}")]
    InvalidCostParameter { name: &'static str, value: f64 },

    #[error("invalid weight {weight} for segment {segment}")]
    InvalidWeight { segment: SegmentId, weight: f64 },

    #[error("no path from {from} to {to}")]
    NoPath { from: JunctionId, to: JunctionId },

    #[error("simulator rejected new route for {vehicle}: {source}")]
    RouteRejected {
        vehicle: VehicleId,
        #[source]
        source: SimulatorError,
    },

    #[error("simulator error: {0}")]
    Simulator(#[from] SimulatorError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse network description: {0}")]
    Json(#[from] serde_json::Error),
}

impl AssignmentError {
    /// Whether the error concerns a single vehicle and must not stop the sweep
    /// over the rest of the fleet.
    pub fn is_vehicle_local(&self) -> bool {
        matches!(
            self,
            AssignmentError::NoPath { .. }
                | AssignmentError::RouteRejected { .. }
                | AssignmentError::Simulator(_)
        )
    }
}

pub type AssignResult<T> = Result<T, AssignmentError>;
