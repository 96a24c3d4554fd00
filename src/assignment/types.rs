//! Core types for the routing controller
//!
//! Identifiers are the simulator's own string names so that routes can be
//! handed back to it without translation.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// A wrapper type for junction (graph node) IDs
    JunctionId
);
string_id!(
    /// A wrapper type for road segment (graph edge) IDs
    SegmentId
);
string_id!(
    /// A wrapper type for vehicle IDs
    VehicleId
);

/// Class of vehicle managed by the fleet controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleClass {
    /// Combustion vehicle with no energy constraint
    Standard,
    /// Battery vehicle, retired once its reserve is exhausted
    Electric,
}

impl VehicleClass {
    /// Prefix combined with the spawn counter to build vehicle IDs
    pub fn id_prefix(self) -> &'static str {
        match self {
            VehicleClass::Standard => "vehicle_",
            VehicleClass::Electric => "electric_vehicle_",
        }
    }

    /// Vehicle type the simulator is asked to instantiate, if any
    pub fn type_id(self) -> Option<&'static str> {
        match self {
            VehicleClass::Standard => None,
            VehicleClass::Electric => Some(ELECTRIC_TYPE_ID),
        }
    }

    /// Builds the vehicle ID for a given spawn counter value
    pub fn vehicle_id(self, index: u64) -> VehicleId {
        VehicleId(format!("{}{}", self.id_prefix(), index))
    }
}

/// Static geometry of a road segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentGeometry {
    /// Length in metres
    pub length: f64,
    /// Speed limit in metres per second
    pub speed_limit: f64,
    /// Number of lanes in this direction
    pub lanes: u32,
}

impl SegmentGeometry {
    pub fn new(length: f64, speed_limit: f64, lanes: u32) -> Self {
        Self {
            length,
            speed_limit,
            lanes,
        }
    }
}

/// A directed road segment connecting two junctions
#[derive(Debug, Clone, PartialEq)]
pub struct RoadSegment {
    pub id: SegmentId,
    pub from: JunctionId,
    pub to: JunctionId,
    pub geometry: SegmentGeometry,
    /// Current travel-time estimate in seconds
    pub weight: f64,
}

/// Route ID registered with the simulator for a spawned vehicle
pub fn route_id_for(vehicle: &VehicleId) -> String {
    format!("route_{}", vehicle)
}

/// Simulator vehicle type of electric vehicles
pub const ELECTRIC_TYPE_ID: &str = "electric";

/// Named vehicle parameter holding the remaining battery energy
pub const BATTERY_ENERGY_PARAMETER: &str = "device.battery.actualBatteryCapacity";
