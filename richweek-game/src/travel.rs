//! Route travel-time computation over a sparse distance matrix.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_TRAVEL_PRECISION, EPSILON};
use crate::numbers::round_to;

/// Pairwise distances keyed `"from|to"`. Missing pairs fall back to
/// [`TravelConfig::distance_const`].
pub type DistanceMatrix = BTreeMap<String, f64>;

/// Matrix key for a single hop.
#[must_use]
pub fn hop_key(from: &str, to: &str) -> String {
    format!("{from}|{to}")
}

/// Tuning for route timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelConfig {
    /// Fallback distance for pairs absent from the matrix.
    pub distance_const: f64,
    /// Minimum enforced time per hop; blocks zero-cost loop exploits.
    pub min_hop_time: f64,
    /// Base reduction applied to every hop (0.2 = 20% faster).
    #[serde(default)]
    pub bonus_percent: f64,
    /// Rounding precision for segment times.
    #[serde(default = "default_precision")]
    pub precision: u32,
    /// Additional reduction from upgrades (0.1 = another -10%).
    #[serde(default)]
    pub travel_time_efficiency: f64,
}

const fn default_precision() -> u32 {
    DEFAULT_TRAVEL_PRECISION
}

/// Configuration mistakes caught before any route math runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TravelConfigError {
    #[error("distance_const must be positive")]
    NonPositiveDistanceConst,
    #[error("min_hop_time must not be negative")]
    NegativeMinHopTime,
}

impl TravelConfig {
    /// Validate tuning values.
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), TravelConfigError> {
        if self.distance_const <= 0.0 {
            return Err(TravelConfigError::NonPositiveDistanceConst);
        }
        if self.min_hop_time < 0.0 {
            return Err(TravelConfigError::NegativeMinHopTime);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TravelError {
    #[error("need at least 2 locations")]
    InvalidRoute,
    #[error("route exceeds remaining hours")]
    NotEnoughTime,
}

impl TravelError {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidRoute => "INVALID_ROUTE",
            Self::NotEnoughTime => "NOT_ENOUGH_TIME",
        }
    }
}

/// A priced route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelComputation {
    pub total_travel_time: f64,
    /// Per-hop times, each rounded to the configured precision.
    pub segment_times: Vec<f64>,
    /// Baseline distance over total time; >= 1 means the bonuses beat the
    /// flat-distance walk.
    pub route_efficiency_score: f64,
    pub baseline_linear: f64,
}

/// Price a route hop by hop.
///
/// Segment times are rounded individually; the total accumulates unrounded
/// hops and rounds once at the end, so long routes do not collect per-hop
/// rounding error.
///
/// # Errors
///
/// [`TravelError::InvalidRoute`] for fewer than two locations,
/// [`TravelError::NotEnoughTime`] when the total exceeds `remaining_hours`.
pub fn compute_travel(
    locations: &[String],
    matrix: &DistanceMatrix,
    cfg: &TravelConfig,
    remaining_hours: f64,
) -> Result<TravelComputation, TravelError> {
    if locations.len() < 2 {
        return Err(TravelError::InvalidRoute);
    }
    let bonus_factor =
        ((1.0 - cfg.bonus_percent.max(0.0)) * (1.0 - cfg.travel_time_efficiency.max(0.0))).max(0.0);

    let mut segment_times = Vec::with_capacity(locations.len() - 1);
    let mut baseline = 0.0;
    let mut total = 0.0;
    for pair in locations.windows(2) {
        let dist = matrix
            .get(&hop_key(&pair[0], &pair[1]))
            .copied()
            .unwrap_or(cfg.distance_const);
        baseline += dist;
        let mut hop = dist * bonus_factor;
        if hop < cfg.min_hop_time {
            hop = cfg.min_hop_time;
        }
        segment_times.push(round_to(hop, cfg.precision));
        total += hop;
    }
    let total = round_to(total, cfg.precision);
    let baseline = round_to(baseline, cfg.precision);
    if total > remaining_hours + EPSILON {
        return Err(TravelError::NotEnoughTime);
    }
    Ok(TravelComputation {
        total_travel_time: total,
        route_efficiency_score: round_to(baseline / total, cfg.precision),
        segment_times,
        baseline_linear: baseline,
    })
}
