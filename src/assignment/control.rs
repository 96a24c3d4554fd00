//! Top-level per-tick orchestration
//!
//! Each tick runs, in order:
//!
//! 1. advance the simulator one step,
//! 2. reweight the whole graph from live occupancy,
//! 3. for every active vehicle, reroute toward the destination and retire it
//!    if its battery is empty.
//!
//! Routing therefore always sees a fully refreshed graph. Failures for one
//! vehicle are logged and counted; anything that would corrupt the graph
//! stops the loop.

use super::cost::CostModel;
use super::error::{AssignResult, AssignmentError};
use super::fleet::{FleetController, RerouteOutcome, SpawnRequest, DEFAULT_DEPLETION_TOLERANCE};
use super::graph::RoutingGraph;
use super::reweight::reweight;
use super::stats::RunStats;
use super::types::{JunctionId, VehicleId, BATTERY_ENERGY_PARAMETER};
use crate::simulation::{StepStatus, TrafficSimulator};

/// Default number of ticks before the loop stops
pub const DEFAULT_HORIZON: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Run configuration for the control loop
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Global destination every vehicle is routed toward
    pub destination: JunctionId,
    /// Number of ticks to run
    pub horizon: u64,
    /// Batches inserted before the first tick
    pub spawn: Vec<SpawnRequest>,
    /// Counter value for the first spawned vehicle
    pub first_vehicle_index: u64,
    pub energy_parameter: String,
    pub depletion_tolerance: f64,
}

impl ControllerConfig {
    pub fn new(destination: impl Into<JunctionId>) -> Self {
        Self {
            destination: destination.into(),
            horizon: DEFAULT_HORIZON,
            spawn: Vec::new(),
            first_vehicle_index: 0,
            energy_parameter: BATTERY_ENERGY_PARAMETER.to_owned(),
            depletion_tolerance: DEFAULT_DEPLETION_TOLERANCE,
        }
    }

    pub fn with_horizon(mut self, horizon: u64) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_spawn(mut self, request: SpawnRequest) -> Self {
        self.spawn.push(request);
        self
    }
}

/// Closed-loop controller driving a simulator
pub struct ControlLoop<S: TrafficSimulator> {
    network: RoutingGraph,
    cost: CostModel,
    simulator: S,
    fleet: FleetController,
    config: ControllerConfig,
    state: LoopState,
    next_vehicle_index: u64,
    stats: RunStats,
}

impl<S: TrafficSimulator> ControlLoop<S> {
    pub fn new(
        network: RoutingGraph,
        cost: CostModel,
        simulator: S,
        config: ControllerConfig,
    ) -> Self {
        let fleet =
            FleetController::new(config.energy_parameter.clone(), config.depletion_tolerance);
        let next_vehicle_index = config.first_vehicle_index;

        Self {
            network,
            cost,
            simulator,
            fleet,
            config,
            state: LoopState::Running,
            next_vehicle_index,
            stats: RunStats::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn ticks(&self) -> u64 {
        self.stats.ticks
    }

    pub fn graph(&self) -> &RoutingGraph {
        &self.network
    }

    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    pub fn simulator_mut(&mut self) -> &mut S {
        &mut self.simulator
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Consumes the loop, handing back the simulator
    pub fn into_simulator(self) -> S {
        self.simulator
    }

    /// Opens the session, spawns the configured fleet, ticks until stopped
    /// and closes the session. The session is closed on failure too.
    pub fn run(&mut self) -> AssignResult<RunStats> {
        if !self.network.contains_junction(&self.config.destination) {
            return Err(AssignmentError::JunctionNotFound(
                self.config.destination.clone(),
            ));
        }

        self.simulator.open()?;
        log::info!(
            "Controller started: {} junctions, {} segments, destination {}, horizon {}",
            self.network.junction_count(),
            self.network.segment_count(),
            self.config.destination,
            self.config.horizon
        );

        let result = self.spawn_fleet().and_then(|_| self.run_ticks());

        let closed = self.simulator.close();
        result?;
        closed?;

        self.stats.log_summary();
        Ok(self.stats.clone())
    }

    /// Inserts every configured spawn batch
    pub fn spawn_fleet(&mut self) -> AssignResult<()> {
        for request in &self.config.spawn {
            let next = self.fleet.spawn_batch(
                &self.network,
                &mut self.simulator,
                request,
                self.next_vehicle_index,
            )?;
            self.stats.vehicles_spawned += next - self.next_vehicle_index;
            self.next_vehicle_index = next;
        }
        Ok(())
    }

    fn run_ticks(&mut self) -> AssignResult<()> {
        while self.state == LoopState::Running {
            self.tick()?;
        }
        Ok(())
    }

    /// Runs one tick and returns the resulting state
    pub fn tick(&mut self) -> AssignResult<LoopState> {
        if self.state == LoopState::Stopped {
            return Ok(LoopState::Stopped);
        }
        if self.stats.ticks >= self.config.horizon {
            self.state = LoopState::Stopped;
            return Ok(self.state);
        }

        let status = self.simulator.step();
        let status = match status {
            Ok(status) => status,
            Err(e) => {
                self.state = LoopState::Stopped;
                return Err(e.into());
            }
        };
        self.stats.ticks += 1;

        if status == StepStatus::Ended {
            log::info!("Simulator ended after {} ticks", self.stats.ticks);
            self.state = LoopState::Stopped;
            return Ok(self.state);
        }

        if let Err(e) = reweight(&mut self.network, &self.cost, &self.simulator) {
            self.state = LoopState::Stopped;
            return Err(e);
        }

        let vehicles = match self.simulator.active_vehicles() {
            Ok(vehicles) => vehicles,
            Err(e) => {
                self.state = LoopState::Stopped;
                return Err(e.into());
            }
        };

        for vehicle in &vehicles {
            self.update_vehicle(vehicle);
        }

        if self.stats.ticks >= self.config.horizon {
            self.state = LoopState::Stopped;
        }
        Ok(self.state)
    }

    /// Reroute-and-retire for one vehicle. Never fails: every error is local
    /// to this vehicle.
    fn update_vehicle(&mut self, vehicle: &VehicleId) {
        match self.fleet.reroute(
            &self.network,
            &mut self.simulator,
            vehicle,
            &self.config.destination,
        ) {
            Ok(RerouteOutcome::Rerouted { .. }) => self.stats.reroutes_applied += 1,
            Ok(RerouteOutcome::NotLocated) => {
                log::trace!("Vehicle {} not on the network, skipping", vehicle);
                self.stats.vehicles_not_located += 1;
            }
            Err(e @ AssignmentError::NoPath { .. }) => {
                log::debug!("Keeping route of {}: {}", vehicle, e);
                self.stats.no_path += 1;
            }
            Err(e @ AssignmentError::RouteRejected { .. }) => {
                log::debug!("{}", e);
                self.stats.routes_rejected += 1;
            }
            Err(e) if e.is_vehicle_local() => {
                log::warn!("Failed to reroute {}: {}", vehicle, e);
                self.stats.vehicle_errors += 1;
            }
            Err(e) => {
                log::error!("Reroute of {} hit a network error: {}", vehicle, e);
                self.stats.vehicle_errors += 1;
            }
        }

        match self.fleet.check_and_remove(&mut self.simulator, vehicle) {
            Ok(true) => self.stats.vehicles_retired += 1,
            Ok(false) => {}
            Err(e) => {
                log::warn!("Failed to check energy of {}: {}", vehicle, e);
                self.stats.vehicle_errors += 1;
            }
        }
    }
}
