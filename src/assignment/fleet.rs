//! Vehicle fleet lifecycle: spawn, reroute, retire
//!
//! The fleet controller owns no vehicle state. Every decision reads the
//! simulator and answers with simulator commands.

use super::error::{AssignResult, AssignmentError};
use super::graph::RoutingGraph;
use super::router::shortest_path;
use super::types::{
    route_id_for, JunctionId, SegmentId, VehicleClass, VehicleId, BATTERY_ENERGY_PARAMETER,
};
use crate::simulation::TrafficSimulator;

/// Readings at or below this value count as an empty battery
pub const DEFAULT_DEPLETION_TOLERANCE: f64 = 0.005;

/// A batch of identical vehicles to insert
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    pub count: u64,
    pub origin: JunctionId,
    pub destination: JunctionId,
    pub class: VehicleClass,
    /// Initial battery reserve for electric vehicles
    pub initial_energy: Option<f64>,
}

/// Result of a reroute attempt that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum RerouteOutcome {
    /// The simulator accepted the new route
    Rerouted { segments: Vec<SegmentId> },
    /// The vehicle is not on a routable segment right now
    NotLocated,
}

#[derive(Debug, Clone)]
pub struct FleetController {
    /// Vehicle parameter holding the remaining energy
    pub energy_parameter: String,
    pub depletion_tolerance: f64,
}

impl Default for FleetController {
    fn default() -> Self {
        Self {
            energy_parameter: BATTERY_ENERGY_PARAMETER.to_owned(),
            depletion_tolerance: DEFAULT_DEPLETION_TOLERANCE,
        }
    }
}

impl FleetController {
    pub fn new(energy_parameter: impl Into<String>, depletion_tolerance: f64) -> Self {
        Self {
            energy_parameter: energy_parameter.into(),
            depletion_tolerance,
        }
    }

    /// Spawns `request.count` vehicles, each with a freshly computed route.
    ///
    /// IDs are the class prefix followed by `counter`, `counter + 1`, ...
    /// Returns the counter to pass to the next call.
    pub fn spawn_batch<S: TrafficSimulator + ?Sized>(
        &self,
        network: &RoutingGraph,
        simulator: &mut S,
        request: &SpawnRequest,
        counter: u64,
    ) -> AssignResult<u64> {
        let mut counter = counter;

        for _ in 0..request.count {
            let route = shortest_path(network, &request.origin, &request.destination)?;
            let vehicle = request.class.vehicle_id(counter);
            let route_id = route_id_for(&vehicle);

            simulator.add_route(&route_id, &route)?;
            simulator.add_vehicle(&vehicle, &route_id, request.class.type_id())?;

            if request.class == VehicleClass::Electric {
                if let Some(energy) = request.initial_energy {
                    simulator.set_vehicle_parameter(&vehicle, &self.energy_parameter, energy)?;
                }
            }

            log::trace!("Spawned {} on {} ({} segments)", vehicle, route_id, route.len());
            counter += 1;
        }

        log::info!(
            "Spawned {} {:?} vehicles from {} to {}",
            request.count,
            request.class,
            request.origin,
            request.destination
        );

        Ok(counter)
    }

    /// Recomputes a vehicle's route from the start of its current segment.
    ///
    /// A vehicle that is not on a known segment is left alone. A route the
    /// simulator refuses comes back as [`AssignmentError::RouteRejected`]; the
    /// vehicle then keeps its previous route.
    pub fn reroute<S: TrafficSimulator + ?Sized>(
        &self,
        network: &RoutingGraph,
        simulator: &mut S,
        vehicle: &VehicleId,
        destination: &JunctionId,
    ) -> AssignResult<RerouteOutcome> {
        let Some(segment_id) = simulator.vehicle_segment(vehicle)? else {
            return Ok(RerouteOutcome::NotLocated);
        };
        // Connector segments inside junctions are not part of the graph
        let Some(segment) = network.segment(&segment_id) else {
            return Ok(RerouteOutcome::NotLocated);
        };

        let route = shortest_path(network, &segment.from, destination)?;

        simulator
            .set_route(vehicle, &route)
            .map_err(|source| AssignmentError::RouteRejected {
                vehicle: vehicle.clone(),
                source,
            })?;

        Ok(RerouteOutcome::Rerouted { segments: route })
    }

    /// Removes the vehicle if its energy reserve is exhausted, including an
    /// overdrawn (negative) reserve. Vehicles without an energy reading are
    /// never removed.
    pub fn check_and_remove<S: TrafficSimulator + ?Sized>(
        &self,
        simulator: &mut S,
        vehicle: &VehicleId,
    ) -> AssignResult<bool> {
        let Some(energy) = simulator.vehicle_parameter(vehicle, &self.energy_parameter)? else {
            return Ok(false);
        };

        if energy.is_nan() || energy > self.depletion_tolerance {
            return Ok(false);
        }

        simulator.remove_vehicle(vehicle)?;
        log::debug!("Retired depleted vehicle {}", vehicle);
        Ok(true)
    }
}
