//! Static network description
//!
//! A declarative JSON document listing junctions and directed road segments.
//! Read once at startup to build the routing graph and the in-process
//! simulator.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{AssignResult, AssignmentError};
use super::types::{JunctionId, SegmentGeometry, SegmentId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JunctionSpec {
    pub id: JunctionId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSpec {
    pub id: SegmentId,
    pub from: JunctionId,
    pub to: JunctionId,
    pub length: f64,
    pub speed_limit: f64,
    #[serde(default = "default_lanes")]
    pub lanes: u32,
}

fn default_lanes() -> u32 {
    1
}

impl SegmentSpec {
    pub fn geometry(&self) -> SegmentGeometry {
        SegmentGeometry::new(self.length, self.speed_limit, self.lanes)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkDescription {
    pub junctions: Vec<JunctionSpec>,
    pub segments: Vec<SegmentSpec>,
}

impl NetworkDescription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a junction (builder style, used by tests and generators)
    pub fn junction(mut self, id: &str) -> Self {
        self.junctions.push(JunctionSpec { id: id.into() });
        self
    }

    /// Adds a directed segment (builder style, used by tests and generators)
    pub fn segment(
        mut self,
        id: &str,
        from: &str,
        to: &str,
        length: f64,
        speed_limit: f64,
        lanes: u32,
    ) -> Self {
        self.segments.push(SegmentSpec {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            length,
            speed_limit,
            lanes,
        });
        self
    }

    pub fn from_json_str(json: &str) -> AssignResult<Self> {
        let description: NetworkDescription = serde_json::from_str(json)?;
        description.validate()?;
        Ok(description)
    }

    pub fn load(path: impl AsRef<Path>) -> AssignResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| AssignmentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Checks referential integrity. Geometry values are left to the cost
    /// model, which reports degenerate segments on its own.
    pub fn validate(&self) -> AssignResult<()> {
        let mut junctions = HashSet::new();
        for junction in &self.junctions {
            if !junctions.insert(&junction.id) {
                return Err(AssignmentError::MalformedNetwork(format!(
                    "duplicate junction {}",
                    junction.id
                )));
            }
        }

        let mut segments = HashSet::new();
        for segment in &self.segments {
            if !segments.insert(&segment.id) {
                return Err(AssignmentError::MalformedNetwork(format!(
                    "duplicate segment {}",
                    segment.id
                )));
            }
            for endpoint in [&segment.from, &segment.to] {
                if !junctions.contains(endpoint) {
                    return Err(AssignmentError::MalformedNetwork(format!(
                        "segment {} references unknown junction {}",
                        segment.id, endpoint
                    )));
                }
            }
        }

        Ok(())
    }
}
