//! Run statistics for the control loop

/// Counters accumulated over a controller run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ticks: u64,
    pub vehicles_spawned: u64,
    pub reroutes_applied: u64,
    pub vehicles_not_located: u64,
    pub no_path: u64,
    pub routes_rejected: u64,
    pub vehicle_errors: u64,
    pub vehicles_retired: u64,
}

impl RunStats {
    /// Share of reroute attempts on located vehicles that the simulator accepted
    pub fn reroute_success_rate(&self) -> f64 {
        let attempts = self.reroutes_applied + self.no_path + self.routes_rejected;
        if attempts > 0 {
            self.reroutes_applied as f64 / attempts as f64 * 100.0
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        log::info!("=== RUN COMPLETE ===");
        log::info!("Ticks run: {}", self.ticks);
        log::info!("Vehicles spawned: {}", self.vehicles_spawned);
        log::info!("Reroutes applied: {}", self.reroutes_applied);
        log::info!("Vehicles not located: {}", self.vehicles_not_located);
        log::info!("No path: {}", self.no_path);
        log::info!("Routes rejected: {}", self.routes_rejected);
        log::info!("Vehicle errors: {}", self.vehicle_errors);
        log::info!("Vehicles retired: {}", self.vehicles_retired);
        log::info!("Reroute success rate: {:.1}%", self.reroute_success_rate());
    }
}
