//! Dynamic traffic assignment library
//!
//! A closed-loop controller that reroutes vehicles in a running traffic
//! simulation along congestion-aware shortest paths.

pub mod assignment;
pub mod simulation;
