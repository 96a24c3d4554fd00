use anyhow::{Context, Result};
use clap::Parser;

use traffic_assign::assignment::{
    ControlLoop, ControllerConfig, CostModel, NetworkDescription, RoutingGraph, SpawnRequest,
    VehicleClass, DEFAULT_ALPHA, DEFAULT_BETA, DEFAULT_TIME_HEADWAY,
};
use traffic_assign::simulation::{LocalSimulator, LocalSimulatorConfig};

#[derive(Parser)]
#[command(name = "traffic_assign")]
#[command(about = "Congestion-aware dynamic rerouting over a traffic simulation")]
struct Cli {
    /// Network description (JSON)
    #[arg(long)]
    network: std::path::PathBuf,

    /// Junction where vehicles are inserted
    #[arg(long, default_value = "A")]
    origin: String,

    /// Junction every vehicle is routed toward
    #[arg(long, default_value = "C")]
    destination: String,

    /// Number of standard vehicles to spawn
    #[arg(long, default_value_t = 0)]
    standard: u64,

    /// Number of electric vehicles to spawn
    #[arg(long, default_value_t = 100)]
    electric: u64,

    /// Initial battery reserve of electric vehicles
    #[arg(long, default_value_t = 1000.0)]
    initial_energy: f64,

    /// Counter value for the first vehicle ID
    #[arg(long, default_value_t = 0)]
    first_index: u64,

    /// Number of simulation ticks to run
    #[arg(long, default_value_t = 1000)]
    ticks: u64,

    /// Minimum time headway between vehicles, in seconds
    #[arg(long, default_value_t = DEFAULT_TIME_HEADWAY)]
    headway: f64,

    /// BPR alpha
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    alpha: f64,

    /// BPR beta
    #[arg(long, default_value_t = DEFAULT_BETA)]
    beta: f64,

    /// Simulated seconds per tick
    #[arg(long, default_value_t = 1.0)]
    step_length: f64,

    /// Battery drain per metre travelled
    #[arg(long, default_value_t = 1.0)]
    energy_per_metre: f64,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    fn controller_config(&self) -> ControllerConfig {
        let mut config = ControllerConfig::new(self.destination.as_str()).with_horizon(self.ticks);
        config.first_vehicle_index = self.first_index;

        if self.standard > 0 {
            config = config.with_spawn(SpawnRequest {
                count: self.standard,
                origin: self.origin.as_str().into(),
                destination: self.destination.as_str().into(),
                class: VehicleClass::Standard,
                initial_energy: None,
            });
        }
        if self.electric > 0 {
            config = config.with_spawn(SpawnRequest {
                count: self.electric,
                origin: self.origin.as_str().into(),
                destination: self.destination.as_str().into(),
                class: VehicleClass::Electric,
                initial_energy: Some(self.initial_energy),
            });
        }
        config
    }

    fn simulator_config(&self) -> LocalSimulatorConfig {
        LocalSimulatorConfig {
            step_length: self.step_length,
            energy_per_metre: self.energy_per_metre,
            seed: self.seed,
            ..LocalSimulatorConfig::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let description = NetworkDescription::load(&cli.network)
        .with_context(|| format!("Failed to load network {}", cli.network.display()))?;

    let cost = CostModel::new()
        .with_headway(cli.headway)
        .with_bpr(cli.alpha, cli.beta)
        .context("Invalid BPR parameters")?;

    let graph = RoutingGraph::build(&description, &cost).context("Failed to build routing graph")?;
    let simulator = LocalSimulator::new(&description, cli.simulator_config());

    let mut control = ControlLoop::new(graph, cost, simulator, cli.controller_config());
    control.run().context("Control loop stopped")?;

    let simulator = control.into_simulator();
    log::info!("Vehicles arrived: {}", simulator.arrived_count());
    log::info!("Simulated time: {:.1}s", simulator.time());

    Ok(())
}
