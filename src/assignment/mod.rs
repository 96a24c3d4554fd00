//! Dynamic routing controller
//!
//! Keeps a road graph whose weights track live congestion and keeps every
//! active vehicle on the currently cheapest route to a single destination.
//!
//! | Module      | Contents                                           |
//! |-------------|----------------------------------------------------|
//! | `cost`      | BPR travel-time model, `CapacityModel` strategy    |
//! | `network`   | JSON network description                           |
//! | `graph`     | `RoutingGraph` multigraph                          |
//! | `reweight`  | per-tick weight refresh                            |
//! | `router`    | Dijkstra `shortest_path`                           |
//! | `fleet`     | spawn, reroute and retire vehicles                 |
//! | `control`   | `ControlLoop` tick orchestration                   |

mod control;
mod cost;
mod error;
mod fleet;
mod graph;
mod network;
mod reweight;
mod router;
mod stats;
mod types;

pub use control::{ControlLoop, ControllerConfig, LoopState, DEFAULT_HORIZON};
pub use cost::{
    CapacityModel, CostModel, HeadwayCapacity, DEFAULT_ALPHA, DEFAULT_BETA, DEFAULT_TIME_HEADWAY,
};
pub use error::{AssignResult, AssignmentError};
pub use fleet::{FleetController, RerouteOutcome, SpawnRequest, DEFAULT_DEPLETION_TOLERANCE};
pub use graph::RoutingGraph;
pub use network::{JunctionSpec, NetworkDescription, SegmentSpec};
pub use reweight::reweight;
pub use router::{path_cost, shortest_path};
pub use stats::RunStats;
pub use types::{
    route_id_for, JunctionId, RoadSegment, SegmentGeometry, SegmentId, VehicleClass, VehicleId,
    BATTERY_ENERGY_PARAMETER, ELECTRIC_TYPE_ID,
};
