//! Vehicle state inside the in-process simulator

use ordered_float::OrderedFloat;
use std::collections::HashMap;

use crate::assignment::{SegmentId, VehicleId, BATTERY_ENERGY_PARAMETER};

/// A vehicle in the in-process simulation
#[derive(Debug, Clone)]
pub struct SimVehicle {
    pub id: VehicleId,
    pub type_id: Option<String>,
    /// Remaining route, starting with the segment the vehicle is on
    pub route: Vec<SegmentId>,
    pub route_index: usize,
    pub lane: usize,
    pub distance_along_segment: OrderedFloat<f64>,
    /// Whether the vehicle has entered the network
    pub departed: bool,
    /// Fraction of the speed limit this driver travels at
    pub speed_factor: f64,
    pub parameters: HashMap<String, f64>,
}

impl SimVehicle {
    pub fn new(
        id: VehicleId,
        type_id: Option<String>,
        route: Vec<SegmentId>,
        speed_factor: f64,
    ) -> Self {
        Self {
            id,
            type_id,
            route,
            route_index: 0,
            lane: 0,
            distance_along_segment: OrderedFloat(0.0),
            departed: false,
            speed_factor,
            parameters: HashMap::new(),
        }
    }

    /// Segment the vehicle is currently on; `None` before departure
    pub fn current_segment(&self) -> Option<&SegmentId> {
        if !self.departed {
            return None;
        }
        self.route.get(self.route_index)
    }

    pub fn next_segment(&self) -> Option<&SegmentId> {
        self.route.get(self.route_index + 1)
    }

    pub fn energy(&self) -> Option<f64> {
        self.parameters.get(BATTERY_ENERGY_PARAMETER).copied()
    }

    /// An electric vehicle with an empty battery halts where it is
    pub fn is_depleted(&self) -> bool {
        self.energy().is_some_and(|energy| energy <= 0.0)
    }

    /// Consumes energy for the distance travelled, clamping at zero
    pub fn drain(&mut self, distance: f64, energy_per_metre: f64) {
        if let Some(energy) = self.parameters.get_mut(BATTERY_ENERGY_PARAMETER) {
            *energy = (*energy - distance * energy_per_metre).max(0.0);
        }
    }
}
