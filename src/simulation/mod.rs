//! Traffic simulator control interface
//!
//! The controller never owns vehicle state: it queries the simulator and
//! issues commands through [`TrafficSimulator`]. [`LocalSimulator`] is a
//! small in-process implementation used by the binary and the tests.

mod local;
mod vehicle;

use thiserror::Error;

use crate::assignment::{SegmentId, VehicleId};

pub use local::{LocalSimulator, LocalSimulatorConfig};
pub use vehicle::SimVehicle;

/// Outcome of advancing the simulation by one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Running,
    /// The simulator has nothing left to simulate
    Ended,
}

/// Errors reported by a simulator
#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("simulation session is not open")]
    NotOpen,

    #[error("vehicle {0} is not known to the simulator")]
    UnknownVehicle(VehicleId),

    #[error("vehicle {0} already exists")]
    DuplicateVehicle(VehicleId),

    #[error("segment {0} is not known to the simulator")]
    UnknownSegment(SegmentId),

    #[error("route {0} is not known to the simulator")]
    UnknownRoute(String),

    #[error("route {0} already exists")]
    DuplicateRoute(String),

    #[error("invalid route: {0}")]
    InvalidRoute(String),

    #[error("route change refused for {vehicle}: {reason}")]
    RouteRejected { vehicle: VehicleId, reason: String },

    #[error("{0}")]
    Other(String),
}

pub type SimResult<T> = Result<T, SimulatorError>;

/// Query/command surface of a running traffic simulation
pub trait TrafficSimulator {
    /// Opens the session; must precede the first step
    fn open(&mut self) -> SimResult<()>;

    /// Closes the session after the last step
    fn close(&mut self) -> SimResult<()>;

    /// Advances the simulation by one discrete step
    fn step(&mut self) -> SimResult<StepStatus>;

    /// Vehicles currently loaded in the simulation, in simulator order
    fn active_vehicles(&self) -> SimResult<Vec<VehicleId>>;

    /// Segment the vehicle is on, or `None` if it is not on the network
    fn vehicle_segment(&self, vehicle: &VehicleId) -> SimResult<Option<SegmentId>>;

    /// A named numeric vehicle parameter, or `None` if the vehicle lacks it
    fn vehicle_parameter(&self, vehicle: &VehicleId, name: &str) -> SimResult<Option<f64>>;

    /// Number of vehicles currently on a segment
    fn segment_vehicle_count(&self, segment: &SegmentId) -> SimResult<usize>;

    /// Registers a named route
    fn add_route(&mut self, route_id: &str, segments: &[SegmentId]) -> SimResult<()>;

    /// Inserts a vehicle on a registered route
    fn add_vehicle(
        &mut self,
        vehicle: &VehicleId,
        route_id: &str,
        type_id: Option<&str>,
    ) -> SimResult<()>;

    fn set_vehicle_parameter(&mut self, vehicle: &VehicleId, name: &str, value: f64)
        -> SimResult<()>;

    /// Replaces the vehicle's remaining route
    fn set_route(&mut self, vehicle: &VehicleId, segments: &[SegmentId]) -> SimResult<()>;

    fn remove_vehicle(&mut self, vehicle: &VehicleId) -> SimResult<()>;
}
