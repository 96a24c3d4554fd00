//! In-process traffic simulator
//!
//! A small queue-based simulation: vehicles follow each other per lane at a
//! fixed spacing, travel at a fraction of the speed limit and hop to the next
//! segment of their route when it has room. There are no signals and no lane
//! changes within a segment.

use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use super::vehicle::SimVehicle;
use super::{SimResult, SimulatorError, StepStatus, TrafficSimulator};
use crate::assignment::{
    JunctionId, NetworkDescription, SegmentId, VehicleId, BATTERY_ENERGY_PARAMETER,
    ELECTRIC_TYPE_ID,
};

/// Tunables for [`LocalSimulator`]
#[derive(Debug, Clone)]
pub struct LocalSimulatorConfig {
    /// Simulated seconds per step
    pub step_length: f64,
    /// Battery drain per metre travelled
    pub energy_per_metre: f64,
    /// Initial battery reserve of electric vehicles
    pub max_battery_capacity: f64,
    /// Vehicle length in metres
    pub vehicle_length: f64,
    /// Standstill gap kept to the vehicle ahead, in metres
    pub min_gap: f64,
    /// Simulation time after which the run ends
    pub end_time: Option<f64>,
    /// Seed for reproducible driver behaviour
    pub seed: Option<u64>,
}

impl Default for LocalSimulatorConfig {
    fn default() -> Self {
        Self {
            step_length: 1.0,
            energy_per_metre: 1.0,
            max_battery_capacity: 2000.0,
            vehicle_length: 5.0,
            min_gap: 2.5,
            end_time: None,
            seed: None,
        }
    }
}

impl LocalSimulatorConfig {
    fn spacing(&self) -> f64 {
        self.vehicle_length + self.min_gap
    }
}

#[derive(Debug, Clone)]
struct SimSegment {
    from: JunctionId,
    to: JunctionId,
    length: f64,
    speed_limit: f64,
    /// Per-lane vehicles keyed by distance along the segment
    lanes: Vec<BTreeMap<OrderedFloat<f64>, VehicleId>>,
}

impl SimSegment {
    fn vehicle_count(&self) -> usize {
        self.lanes.iter().map(BTreeMap::len).sum()
    }

    /// Lane with the most room at the segment entrance, if any has enough
    fn entry_lane(&self, spacing: f64) -> Option<usize> {
        self.lanes
            .iter()
            .enumerate()
            .map(|(lane, vehicles)| {
                let room = vehicles.keys().next().map_or(f64::INFINITY, |rear| rear.0);
                (lane, room)
            })
            .filter(|(_, room)| *room >= spacing)
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(lane, _)| lane)
    }

    fn vehicle_ahead(&self, lane: usize, distance: OrderedFloat<f64>) -> Option<f64> {
        self.lanes[lane]
            .range((Bound::Excluded(distance), Bound::Unbounded))
            .next()
            .map(|(ahead, _)| ahead.0)
    }
}

/// In-process implementation of [`TrafficSimulator`]
pub struct LocalSimulator {
    config: LocalSimulatorConfig,
    segments: HashMap<SegmentId, SimSegment>,
    routes: HashMap<String, Vec<SegmentId>>,
    vehicles: HashMap<VehicleId, SimVehicle>,
    /// Vehicle IDs in insertion order
    load_order: Vec<VehicleId>,
    open: bool,
    time: f64,
    loaded: usize,
    arrived: usize,
    removed: usize,
    rng: Option<StdRng>,
}

impl LocalSimulator {
    pub fn new(network: &NetworkDescription, config: LocalSimulatorConfig) -> Self {
        let segments = network
            .segments
            .iter()
            .map(|spec| {
                let lanes = spec.lanes.max(1) as usize;
                (
                    spec.id.clone(),
                    SimSegment {
                        from: spec.from.clone(),
                        to: spec.to.clone(),
                        length: spec.length,
                        speed_limit: spec.speed_limit,
                        lanes: vec![BTreeMap::new(); lanes],
                    },
                )
            })
            .collect();

        let rng = config.seed.map(StdRng::seed_from_u64);

        Self {
            config,
            segments,
            routes: HashMap::new(),
            vehicles: HashMap::new(),
            load_order: Vec::new(),
            open: false,
            time: 0.0,
            loaded: 0,
            arrived: 0,
            removed: 0,
            rng,
        }
    }

    /// Current simulation time in seconds
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Vehicles that reached the end of their route
    pub fn arrived_count(&self) -> usize {
        self.arrived
    }

    /// Vehicles removed by command
    pub fn removed_count(&self) -> usize {
        self.removed
    }

    pub fn vehicle(&self, vehicle: &VehicleId) -> Option<&SimVehicle> {
        self.vehicles.get(vehicle)
    }

    /// Get a random value in the given range, using seeded RNG if available
    fn random_range(&mut self, range: std::ops::RangeInclusive<f64>) -> f64 {
        match &mut self.rng {
            Some(rng) => rng.random_range(range),
            None => rand::rng().random_range(range),
        }
    }

    /// Checks that every segment exists and each one starts where the
    /// previous one ends
    fn check_route(&self, segments: &[SegmentId]) -> SimResult<Result<(), String>> {
        if segments.is_empty() {
            return Ok(Err("route is empty".to_owned()));
        }

        let mut previous: Option<&SimSegment> = None;
        for id in segments {
            let segment = self
                .segments
                .get(id)
                .ok_or_else(|| SimulatorError::UnknownSegment(id.clone()))?;
            if let Some(previous) = previous {
                if previous.to != segment.from {
                    return Ok(Err(format!("segment {} does not connect", id)));
                }
            }
            previous = Some(segment);
        }

        Ok(Ok(()))
    }

    /// Inserts waiting vehicles whose first segment has room
    fn depart_waiting(&mut self) {
        let spacing = self.config.spacing();

        for id in &self.load_order {
            let Some(vehicle) = self.vehicles.get_mut(id) else {
                continue;
            };
            if vehicle.departed {
                continue;
            }
            let Some(segment) = vehicle
                .route
                .get(vehicle.route_index)
                .and_then(|first| self.segments.get_mut(first))
            else {
                continue;
            };
            if let Some(lane) = segment.entry_lane(spacing) {
                segment.lanes[lane].insert(OrderedFloat(0.0), id.clone());
                vehicle.lane = lane;
                vehicle.distance_along_segment = OrderedFloat(0.0);
                vehicle.departed = true;
            }
        }
    }

    /// Moves every departed vehicle, leaders first within each lane
    fn advance_vehicles(&mut self) {
        let mut order: Vec<(SegmentId, usize, OrderedFloat<f64>, VehicleId)> = self
            .vehicles
            .values()
            .filter_map(|vehicle| {
                vehicle.current_segment().map(|segment| {
                    (
                        segment.clone(),
                        vehicle.lane,
                        vehicle.distance_along_segment,
                        vehicle.id.clone(),
                    )
                })
            })
            .collect();
        order.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then(a.1.cmp(&b.1))
                .then(b.2.cmp(&a.2))
                .then(a.3.cmp(&b.3))
        });

        for (_, _, _, id) in order {
            self.advance_vehicle(&id);
        }
    }

    fn advance_vehicle(&mut self, id: &VehicleId) {
        let spacing = self.config.spacing();
        let energy_per_metre = self.config.energy_per_metre;
        let step_length = self.config.step_length;

        let Some(vehicle) = self.vehicles.get_mut(id) else {
            return;
        };
        if vehicle.is_depleted() {
            return;
        }
        let Some(segment_id) = vehicle.current_segment().cloned() else {
            return;
        };
        let Some(segment) = self.segments.get(&segment_id) else {
            return;
        };

        let position = vehicle.distance_along_segment;
        let mut target = position.0 + segment.speed_limit * vehicle.speed_factor * step_length;

        if let Some(ahead) = segment.vehicle_ahead(vehicle.lane, position) {
            target = target.min(ahead - spacing);
        }
        if let Some(energy) = vehicle.energy() {
            if energy_per_metre > 0.0 {
                target = target.min(position.0 + energy / energy_per_metre);
            }
        }
        let target = target.clamp(position.0, segment.length);
        let travelled = target - position.0;
        let at_end = target >= segment.length;
        let next = vehicle.next_segment().cloned();

        vehicle.drain(travelled, energy_per_metre);

        if at_end && next.is_none() {
            self.finish_vehicle(id, &segment_id);
            return;
        }

        let entry = match (&next, at_end) {
            (Some(next), true) => self
                .segments
                .get(next)
                .and_then(|segment| segment.entry_lane(spacing))
                .map(|lane| (next.clone(), lane)),
            _ => None,
        };

        let Some(vehicle) = self.vehicles.get_mut(id) else {
            return;
        };
        if let Some(segment) = self.segments.get_mut(&segment_id) {
            segment.lanes[vehicle.lane].remove(&position);
        }

        match entry {
            Some((next_id, lane)) => {
                if let Some(next_segment) = self.segments.get_mut(&next_id) {
                    next_segment.lanes[lane].insert(OrderedFloat(0.0), id.clone());
                }
                vehicle.route_index += 1;
                vehicle.lane = lane;
                vehicle.distance_along_segment = OrderedFloat(0.0);
            }
            None => {
                vehicle.distance_along_segment = OrderedFloat(target);
                if let Some(segment) = self.segments.get_mut(&segment_id) {
                    segment.lanes[vehicle.lane].insert(OrderedFloat(target), id.clone());
                }
            }
        }
    }

    /// Takes a vehicle that reached the end of its route off the network
    fn finish_vehicle(&mut self, id: &VehicleId, segment_id: &SegmentId) {
        if let Some(vehicle) = self.vehicles.remove(id) {
            if let Some(segment) = self.segments.get_mut(segment_id) {
                segment.lanes[vehicle.lane].remove(&vehicle.distance_along_segment);
            }
            self.load_order.retain(|loaded| loaded != id);
            self.arrived += 1;
            log::trace!("Vehicle {} arrived at t={:.1}", id, self.time);
        }
    }
}

impl TrafficSimulator for LocalSimulator {
    fn open(&mut self) -> SimResult<()> {
        self.open = true;
        log::debug!("Local simulator session opened");
        Ok(())
    }

    fn close(&mut self) -> SimResult<()> {
        self.open = false;
        log::debug!("Local simulator session closed at t={:.1}", self.time);
        Ok(())
    }

    fn step(&mut self) -> SimResult<StepStatus> {
        if !self.open {
            return Err(SimulatorError::NotOpen);
        }

        self.time += self.config.step_length;
        self.depart_waiting();
        self.advance_vehicles();

        let out_of_time = self.config.end_time.is_some_and(|end| self.time >= end);
        let drained = self.loaded > 0 && self.vehicles.is_empty();
        if out_of_time || drained {
            return Ok(StepStatus::Ended);
        }
        Ok(StepStatus::Running)
    }

    fn active_vehicles(&self) -> SimResult<Vec<VehicleId>> {
        Ok(self.load_order.clone())
    }

    fn vehicle_segment(&self, vehicle: &VehicleId) -> SimResult<Option<SegmentId>> {
        self.vehicles
            .get(vehicle)
            .map(|v| v.current_segment().cloned())
            .ok_or_else(|| SimulatorError::UnknownVehicle(vehicle.clone()))
    }

    fn vehicle_parameter(&self, vehicle: &VehicleId, name: &str) -> SimResult<Option<f64>> {
        self.vehicles
            .get(vehicle)
            .map(|v| v.parameters.get(name).copied())
            .ok_or_else(|| SimulatorError::UnknownVehicle(vehicle.clone()))
    }

    fn segment_vehicle_count(&self, segment: &SegmentId) -> SimResult<usize> {
        self.segments
            .get(segment)
            .map(SimSegment::vehicle_count)
            .ok_or_else(|| SimulatorError::UnknownSegment(segment.clone()))
    }

    fn add_route(&mut self, route_id: &str, segments: &[SegmentId]) -> SimResult<()> {
        if self.routes.contains_key(route_id) {
            return Err(SimulatorError::DuplicateRoute(route_id.to_owned()));
        }
        self.check_route(segments)?
            .map_err(|reason| SimulatorError::InvalidRoute(format!("{}: {}", route_id, reason)))?;

        self.routes.insert(route_id.to_owned(), segments.to_vec());
        Ok(())
    }

    fn add_vehicle(
        &mut self,
        vehicle: &VehicleId,
        route_id: &str,
        type_id: Option<&str>,
    ) -> SimResult<()> {
        if self.vehicles.contains_key(vehicle) {
            return Err(SimulatorError::DuplicateVehicle(vehicle.clone()));
        }
        let route = self
            .routes
            .get(route_id)
            .cloned()
            .ok_or_else(|| SimulatorError::UnknownRoute(route_id.to_owned()))?;

        let speed_factor = self.random_range(0.8..=1.0);
        let mut sim_vehicle = SimVehicle::new(
            vehicle.clone(),
            type_id.map(str::to_owned),
            route,
            speed_factor,
        );
        if type_id == Some(ELECTRIC_TYPE_ID) {
            sim_vehicle.parameters.insert(
                BATTERY_ENERGY_PARAMETER.to_owned(),
                self.config.max_battery_capacity,
            );
        }

        self.vehicles.insert(vehicle.clone(), sim_vehicle);
        self.load_order.push(vehicle.clone());
        self.loaded += 1;
        Ok(())
    }

    fn set_vehicle_parameter(
        &mut self,
        vehicle: &VehicleId,
        name: &str,
        value: f64,
    ) -> SimResult<()> {
        let sim_vehicle = self
            .vehicles
            .get_mut(vehicle)
            .ok_or_else(|| SimulatorError::UnknownVehicle(vehicle.clone()))?;
        sim_vehicle.parameters.insert(name.to_owned(), value);
        Ok(())
    }

    fn set_route(&mut self, vehicle: &VehicleId, segments: &[SegmentId]) -> SimResult<()> {
        let current = self
            .vehicles
            .get(vehicle)
            .ok_or_else(|| SimulatorError::UnknownVehicle(vehicle.clone()))?
            .current_segment()
            .cloned();

        let rejected = |reason: String| SimulatorError::RouteRejected {
            vehicle: vehicle.clone(),
            reason,
        };

        let Some(current) = current else {
            return Err(rejected("vehicle is not on the network".to_owned()));
        };
        self.check_route(segments)?.map_err(rejected)?;
        if segments.first() != Some(&current) {
            return Err(rejected(format!(
                "route must start on current segment {}",
                current
            )));
        }

        if let Some(sim_vehicle) = self.vehicles.get_mut(vehicle) {
            sim_vehicle.route = segments.to_vec();
            sim_vehicle.route_index = 0;
        }
        Ok(())
    }

    fn remove_vehicle(&mut self, vehicle: &VehicleId) -> SimResult<()> {
        let removed = self
            .vehicles
            .remove(vehicle)
            .ok_or_else(|| SimulatorError::UnknownVehicle(vehicle.clone()))?;

        if let Some(segment) = removed.current_segment() {
            if let Some(segment) = self.segments.get_mut(segment) {
                segment.lanes[removed.lane].remove(&removed.distance_along_segment);
            }
        }
        self.load_order.retain(|loaded| loaded != vehicle);
        self.removed += 1;
        Ok(())
    }
}
