//! Travel-time cost model
//!
//! Converts a segment's geometry and live occupancy into a travel time using
//! the Bureau of Public Roads volume-delay curve.

use super::error::{AssignResult, AssignmentError};
use super::types::{SegmentGeometry, SegmentId};

/// Default BPR scale factor
pub const DEFAULT_ALPHA: f64 = 0.15;

/// Default BPR exponent
pub const DEFAULT_BETA: f64 = 4.0;

/// Default minimum time headway between vehicles, in seconds
pub const DEFAULT_TIME_HEADWAY: f64 = 2.0;

/// Strategy computing a segment's capacity in vehicles
pub trait CapacityModel: Send + Sync {
    fn capacity(&self, geometry: &SegmentGeometry) -> f64;
}

/// Capacity derived from a fixed minimum headway per lane.
///
/// `lanes * (length / headway) * (speed_limit / length)`. The length terms
/// cancel, so capacity depends only on lanes, speed and headway.
#[derive(Debug, Clone, Copy)]
pub struct HeadwayCapacity {
    pub time_headway: f64,
}

impl Default for HeadwayCapacity {
    fn default() -> Self {
        Self {
            time_headway: DEFAULT_TIME_HEADWAY,
        }
    }
}

impl CapacityModel for HeadwayCapacity {
    fn capacity(&self, geometry: &SegmentGeometry) -> f64 {
        let lane_capacity =
            (geometry.length / self.time_headway) * (geometry.speed_limit / geometry.length);
        f64::from(geometry.lanes) * lane_capacity
    }
}

/// BPR volume-delay cost model with a pluggable capacity strategy
pub struct CostModel {
    alpha: f64,
    beta: f64,
    capacity: Box<dyn CapacityModel>,
}

impl Default for CostModel {
    fn default() -> Self {
        Self::new()
    }
}

impl CostModel {
    pub fn new() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            beta: DEFAULT_BETA,
            capacity: Box::new(HeadwayCapacity::default()),
        }
    }

    /// Uses the headway capacity model with the given headway
    pub fn with_headway(self, time_headway: f64) -> Self {
        self.with_capacity_model(HeadwayCapacity { time_headway })
    }

    /// Replaces the capacity strategy
    pub fn with_capacity_model(mut self, model: impl CapacityModel + 'static) -> Self {
        self.capacity = Box::new(model);
        self
    }

    /// Overrides the BPR parameters. `alpha` must be non-negative and `beta`
    /// strictly positive, both finite, so that an empty segment costs exactly
    /// its free-flow time and cost never falls as volume grows.
    pub fn with_bpr(mut self, alpha: f64, beta: f64) -> AssignResult<Self> {
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(AssignmentError::InvalidCostParameter {
                name: "alpha",
                value: alpha,
            });
        }
        if !beta.is_finite() || beta <= 0.0 {
            return Err(AssignmentError::InvalidCostParameter {
                name: "beta",
                value: beta,
            });
        }
        self.alpha = alpha;
        self.beta = beta;
        Ok(self)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn capacity(&self, geometry: &SegmentGeometry) -> f64 {
        self.capacity.capacity(geometry)
    }

    pub fn free_flow_time(&self, geometry: &SegmentGeometry) -> f64 {
        geometry.length / geometry.speed_limit
    }

    /// Travel time in seconds for `volume` vehicles currently on the segment.
    ///
    /// Fails instead of producing a NaN or infinite cost.
    pub fn travel_time(
        &self,
        segment: &SegmentId,
        geometry: &SegmentGeometry,
        volume: usize,
    ) -> AssignResult<f64> {
        let free_flow_time = self.free_flow_time(geometry);
        if !free_flow_time.is_finite() || free_flow_time < 0.0 {
            return Err(AssignmentError::DegenerateSegment {
                segment: segment.clone(),
                reason: format!(
                    "free-flow time {} (length {}, speed limit {})",
                    free_flow_time, geometry.length, geometry.speed_limit
                ),
            });
        }

        let capacity = self.capacity(geometry);
        if !capacity.is_finite() || capacity <= 0.0 {
            return Err(AssignmentError::DegenerateSegment {
                segment: segment.clone(),
                reason: format!("capacity {}", capacity),
            });
        }

        let ratio = volume as f64 / capacity;
        let cost = free_flow_time * (1.0 + self.alpha * ratio.powf(self.beta));
        if !cost.is_finite() {
            return Err(AssignmentError::DegenerateSegment {
                segment: segment.clone(),
                reason: format!("cost overflow at volume {}", volume),
            });
        }

        Ok(cost)
    }
}
