//! Weekly time budget: base vs effective hours plus spent counters.
//!
//! States are immutable; every allocator returns a fresh value so a failed
//! call can never leave a half-applied week behind.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{EFFECTIVE_HOURS_FLOOR, EPSILON};
use crate::numbers::round2;

/// Errors for week construction and time allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WeekError {
    /// The weekly budget must be positive; anything else is a caller bug.
    #[error("base hours must be > 0")]
    InvalidBaseHours,
    #[error("hours must be > 0")]
    NegativeOrZeroHours,
    #[error("allocation exceeds effective hours")]
    OverAllocation,
}

impl WeekError {
    /// Stable code for reports and purchase-style summaries.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidBaseHours => "INVALID_BASE_HOURS",
            Self::NegativeOrZeroHours => "NEGATIVE_OR_ZERO_HOURS",
            Self::OverAllocation => "OVER_ALLOCATION",
        }
    }
}

/// One week's time ledger, all fields at two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeekState {
    pub base_hours: f64,
    /// Budget after the carry-over penalty, floored at 10% of base.
    pub effective_hours: f64,
    pub spent_travel: f64,
    pub spent_activity: f64,
    /// Hours actually removed from this week (base - effective).
    pub penalty_applied: f64,
}

impl WeekState {
    /// Hours still unallocated this week.
    #[must_use]
    pub fn remaining(&self) -> f64 {
        round2(self.effective_hours - (self.spent_travel + self.spent_activity))
    }
}

/// Start a week. The carry-over penalty shrinks the budget, but never below
/// 10% of the base.
///
/// # Errors
///
/// Returns [`WeekError::InvalidBaseHours`] when `base_hours <= 0`.
pub fn init_week(base_hours: f64, carry_over_penalty: f64) -> Result<WeekState, WeekError> {
    if base_hours <= 0.0 {
        return Err(WeekError::InvalidBaseHours);
    }
    let floor = base_hours * EFFECTIVE_HOURS_FLOOR;
    let mut effective = base_hours - carry_over_penalty.max(0.0);
    if effective < floor {
        effective = floor;
    }
    let effective = round2(effective);
    Ok(WeekState {
        base_hours: round2(base_hours),
        effective_hours: effective,
        spent_travel: 0.0,
        spent_activity: 0.0,
        penalty_applied: round2(base_hours - effective),
    })
}

#[derive(Clone, Copy)]
enum Lane {
    Travel,
    Activity,
}

fn allocate(state: &WeekState, lane: Lane, hours: f64) -> Result<WeekState, WeekError> {
    if hours <= 0.0 {
        return Err(WeekError::NegativeOrZeroHours);
    }
    let hours = round2(hours);
    let (travel, activity) = match lane {
        Lane::Travel => (state.spent_travel + hours, state.spent_activity),
        Lane::Activity => (state.spent_travel, state.spent_activity + hours),
    };
    if travel + activity > state.effective_hours + EPSILON {
        return Err(WeekError::OverAllocation);
    }
    Ok(WeekState {
        spent_travel: round2(travel),
        spent_activity: round2(activity),
        ..*state
    })
}

/// Reserve travel hours.
///
/// # Errors
///
/// Rejects non-positive hours and allocations past the effective budget.
pub fn allocate_travel(state: &WeekState, hours: f64) -> Result<WeekState, WeekError> {
    allocate(state, Lane::Travel, hours)
}

/// Reserve activity hours.
///
/// # Errors
///
/// Rejects non-positive hours and allocations past the effective budget.
pub fn allocate_activity(state: &WeekState, hours: f64) -> Result<WeekState, WeekError> {
    allocate(state, Lane::Activity, hours)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_without_penalty_keeps_full_budget() {
        let w = init_week(40.0, 0.0).unwrap();
        assert!((w.effective_hours - 40.0).abs() < f64::EPSILON);
        assert!(w.penalty_applied.abs() < f64::EPSILON);
        assert!((w.remaining() - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn init_with_penalty_reduces_hours() {
        let w = init_week(40.0, 8.0).unwrap();
        assert!((w.effective_hours - 32.0).abs() < f64::EPSILON);
        assert!((w.penalty_applied - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn init_with_huge_penalty_floors_at_ten_percent() {
        let w = init_week(40.0, 39.0).unwrap();
        assert!((w.effective_hours - 4.0).abs() < f64::EPSILON);
        assert!((w.penalty_applied - 36.0).abs() < f64::EPSILON);
    }

    #[test]
    fn init_rejects_non_positive_budget() {
        assert_eq!(init_week(0.0, 0.0), Err(WeekError::InvalidBaseHours));
        assert_eq!(init_week(-3.0, 0.0), Err(WeekError::InvalidBaseHours));
    }

    #[test]
    fn negative_carry_over_is_ignored() {
        let w = init_week(40.0, -12.0).unwrap();
        assert!((w.effective_hours - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn travel_accumulates_and_remaining_tracks() {
        let w = init_week(40.0, 0.0).unwrap();
        let w = allocate_travel(&w, 5.0).unwrap();
        let w = allocate_travel(&w, 5.0).unwrap();
        assert!((w.spent_travel - 10.0).abs() < f64::EPSILON);
        assert!((w.remaining() - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn over_allocation_rejects_and_leaves_state_intact() {
        let w0 = init_week(40.0, 0.0).unwrap();
        let w1 = allocate_travel(&w0, 3.0).unwrap();
        let before = w1;
        assert_eq!(allocate_activity(&w1, 38.0), Err(WeekError::OverAllocation));
        assert_eq!(w1, before);
        assert!((w1.remaining() - 37.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_and_negative_hours_reject() {
        let w = init_week(40.0, 0.0).unwrap();
        assert_eq!(allocate_travel(&w, 0.0), Err(WeekError::NegativeOrZeroHours));
        assert_eq!(
            allocate_activity(&w, -1.5),
            Err(WeekError::NegativeOrZeroHours)
        );
    }

    #[test]
    fn allocation_up_to_exact_budget_succeeds() {
        let w = init_week(40.0, 0.0).unwrap();
        let w = allocate_travel(&w, 15.5).unwrap();
        let w = allocate_activity(&w, 24.5).unwrap();
        assert!(w.remaining().abs() < f64::EPSILON);
        assert!(w.spent_travel + w.spent_activity <= w.effective_hours + 1e-9);
    }

    #[test]
    fn fractional_hours_round_to_two_decimals() {
        let w = init_week(40.0, 0.0).unwrap();
        let w = allocate_activity(&w, 1.005).unwrap();
        assert!((w.spent_activity - 1.0).abs() < 1e-9);
        let w = allocate_activity(&w, 2.339).unwrap();
        assert!((w.spent_activity - 3.34).abs() < 1e-9);
    }
}
