//! Shared fixtures: a scripted simulator that records every command, and a
//! few small networks.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use traffic_assign::assignment::{NetworkDescription, SegmentId, VehicleId};
use traffic_assign::simulation::{SimResult, SimulatorError, StepStatus, TrafficSimulator};

/// A command issued to the scripted simulator
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Step,
    AddRoute(String, Vec<SegmentId>),
    AddVehicle(VehicleId, String, Option<String>),
    SetParameter(VehicleId, String, f64),
    SetRoute(VehicleId, Vec<SegmentId>),
    Remove(VehicleId),
}

/// Simulator double whose state is set directly by the test
#[derive(Debug, Default)]
pub struct ScriptedSimulator {
    pub open: bool,
    pub closed: bool,
    pub steps: u64,
    /// Report `Ended` once this many steps have run
    pub end_after: Option<u64>,
    pub vehicles: Vec<VehicleId>,
    pub positions: HashMap<VehicleId, SegmentId>,
    pub parameters: HashMap<(VehicleId, String), f64>,
    pub occupancy: HashMap<SegmentId, usize>,
    /// Vehicles whose route changes are refused
    pub reject_routes: HashSet<VehicleId>,
    /// Vehicles whose position query fails
    pub failing_vehicles: HashSet<VehicleId>,
    pub commands: Vec<Command>,
}

impl ScriptedSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places an already-running vehicle on a segment
    pub fn place(&mut self, vehicle: &str, segment: &str) {
        let vehicle = VehicleId::from(vehicle);
        if !self.vehicles.contains(&vehicle) {
            self.vehicles.push(vehicle.clone());
        }
        self.positions.insert(vehicle, segment.into());
    }

    /// Adds a vehicle that has not entered the network yet
    pub fn load(&mut self, vehicle: &str) {
        self.vehicles.push(vehicle.into());
    }

    pub fn set_energy(&mut self, vehicle: &str, name: &str, energy: f64) {
        self.parameters
            .insert((vehicle.into(), name.to_owned()), energy);
    }

    pub fn set_occupancy(&mut self, segment: &str, count: usize) {
        self.occupancy.insert(segment.into(), count);
    }

    pub fn route_changes_for(&self, vehicle: &str) -> Vec<Vec<SegmentId>> {
        let vehicle = VehicleId::from(vehicle);
        self.commands
            .iter()
            .filter_map(|command| match command {
                Command::SetRoute(id, route) if *id == vehicle => Some(route.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn removals(&self) -> Vec<VehicleId> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                Command::Remove(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    fn known(&self, vehicle: &VehicleId) -> SimResult<()> {
        if self.vehicles.contains(vehicle) {
            Ok(())
        } else {
            Err(SimulatorError::UnknownVehicle(vehicle.clone()))
        }
    }
}

impl TrafficSimulator for ScriptedSimulator {
    fn open(&mut self) -> SimResult<()> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> SimResult<()> {
        self.open = false;
        self.closed = true;
        Ok(())
    }

    fn step(&mut self) -> SimResult<StepStatus> {
        if !self.open {
            return Err(SimulatorError::NotOpen);
        }
        self.steps += 1;
        self.commands.push(Command::Step);
        if self.end_after.is_some_and(|end| self.steps >= end) {
            return Ok(StepStatus::Ended);
        }
        Ok(StepStatus::Running)
    }

    fn active_vehicles(&self) -> SimResult<Vec<VehicleId>> {
        Ok(self.vehicles.clone())
    }

    fn vehicle_segment(&self, vehicle: &VehicleId) -> SimResult<Option<SegmentId>> {
        if self.failing_vehicles.contains(vehicle) {
            return Err(SimulatorError::Other(format!("lost contact with {}", vehicle)));
        }
        self.known(vehicle)?;
        Ok(self.positions.get(vehicle).cloned())
    }

    fn vehicle_parameter(&self, vehicle: &VehicleId, name: &str) -> SimResult<Option<f64>> {
        self.known(vehicle)?;
        Ok(self
            .parameters
            .get(&(vehicle.clone(), name.to_owned()))
            .copied())
    }

    fn segment_vehicle_count(&self, segment: &SegmentId) -> SimResult<usize> {
        Ok(self.occupancy.get(segment).copied().unwrap_or(0))
    }

    fn add_route(&mut self, route_id: &str, segments: &[SegmentId]) -> SimResult<()> {
        self.commands
            .push(Command::AddRoute(route_id.to_owned(), segments.to_vec()));
        Ok(())
    }

    fn add_vehicle(
        &mut self,
        vehicle: &VehicleId,
        route_id: &str,
        type_id: Option<&str>,
    ) -> SimResult<()> {
        if self.vehicles.contains(vehicle) {
            return Err(SimulatorError::DuplicateVehicle(vehicle.clone()));
        }
        self.vehicles.push(vehicle.clone());
        self.commands.push(Command::AddVehicle(
            vehicle.clone(),
            route_id.to_owned(),
            type_id.map(str::to_owned),
        ));
        Ok(())
    }

    fn set_vehicle_parameter(
        &mut self,
        vehicle: &VehicleId,
        name: &str,
        value: f64,
    ) -> SimResult<()> {
        self.known(vehicle)?;
        self.parameters
            .insert((vehicle.clone(), name.to_owned()), value);
        self.commands.push(Command::SetParameter(
            vehicle.clone(),
            name.to_owned(),
            value,
        ));
        Ok(())
    }

    fn set_route(&mut self, vehicle: &VehicleId, segments: &[SegmentId]) -> SimResult<()> {
        self.known(vehicle)?;
        if self.reject_routes.contains(vehicle) {
            return Err(SimulatorError::RouteRejected {
                vehicle: vehicle.clone(),
                reason: "cannot switch at current position".to_owned(),
            });
        }
        self.commands
            .push(Command::SetRoute(vehicle.clone(), segments.to_vec()));
        Ok(())
    }

    fn remove_vehicle(&mut self, vehicle: &VehicleId) -> SimResult<()> {
        self.known(vehicle)?;
        self.vehicles.retain(|id| id != vehicle);
        self.positions.remove(vehicle);
        self.commands.push(Command::Remove(vehicle.clone()));
        Ok(())
    }
}

pub fn segments(ids: &[&str]) -> Vec<SegmentId> {
    ids.iter().map(|id| SegmentId::from(*id)).collect()
}

/// Three parallel A→B segments plus a slower detour A→C→B.
///
/// Every segment: 100 m, 10 m/s, one lane. Free-flow time 10 s, capacity 5
/// vehicles at the default 2 s headway. The detour costs 20 s when empty.
pub fn parallel_network() -> NetworkDescription {
    NetworkDescription::new()
        .junction("A")
        .junction("B")
        .junction("C")
        .segment("ab_0", "A", "B", 100.0, 10.0, 1)
        .segment("ab_1", "A", "B", 100.0, 10.0, 1)
        .segment("ab_2", "A", "B", 100.0, 10.0, 1)
        .segment("ac", "A", "C", 100.0, 10.0, 1)
        .segment("cb", "C", "B", 100.0, 10.0, 1)
}

/// Diamond with a dead-end spur:
///
/// ```text
///   A → B → D
///   A → C → D
///   D → E        (E has no way back)
/// ```
///
/// A→B→D is the faster branch when the network is empty.
pub fn diamond_network() -> NetworkDescription {
    NetworkDescription::new()
        .junction("A")
        .junction("B")
        .junction("C")
        .junction("D")
        .junction("E")
        .segment("ab", "A", "B", 100.0, 10.0, 1)
        .segment("bd", "B", "D", 100.0, 10.0, 1)
        .segment("ac", "A", "C", 200.0, 10.0, 1)
        .segment("cd", "C", "D", 200.0, 10.0, 1)
        .segment("de", "D", "E", 100.0, 10.0, 1)
}

/// A `rows × cols` grid with two-way links of identical geometry
pub fn grid_network(rows: usize, cols: usize) -> NetworkDescription {
    let mut description = NetworkDescription::new();
    let name = |r: usize, c: usize| format!("n{}_{}", r, c);

    for r in 0..rows {
        for c in 0..cols {
            description = description.junction(&name(r, c));
        }
    }
    for r in 0..rows {
        for c in 0..cols {
            let here = name(r, c);
            if c + 1 < cols {
                let right = name(r, c + 1);
                description = description
                    .segment(&format!("{}>{}", here, right), &here, &right, 100.0, 10.0, 1)
                    .segment(&format!("{}>{}", right, here), &right, &here, 100.0, 10.0, 1);
            }
            if r + 1 < rows {
                let down = name(r + 1, c);
                description = description
                    .segment(&format!("{}>{}", here, down), &here, &down, 100.0, 10.0, 1)
                    .segment(&format!("{}>{}", down, here), &down, &here, 100.0, 10.0, 1);
            }
        }
    }
    description
}
