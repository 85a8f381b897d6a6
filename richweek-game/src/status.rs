//! Status bars: clamped application of resource deltas against thresholds.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::numbers::round2;
use crate::resources::{ResourceKind, Resources};

/// Raised when a threshold is not positive; a caller bug, not a game state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatusError {
    #[error("threshold for {field} must be > 0")]
    NonPositiveThreshold { field: &'static str },
}

/// Per-bar completion markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompletionFlags {
    pub money: bool,
    pub health: bool,
    pub happiness: bool,
    pub education: bool,
}

impl CompletionFlags {
    #[must_use]
    pub const fn get(&self, kind: ResourceKind) -> bool {
        match kind {
            ResourceKind::Money => self.money,
            ResourceKind::Health => self.health,
            ResourceKind::Happiness => self.happiness,
            ResourceKind::Education => self.education,
        }
    }

    fn set(&mut self, kind: ResourceKind, value: bool) {
        match kind {
            ResourceKind::Money => self.money = value,
            ResourceKind::Health => self.health = value,
            ResourceKind::Happiness => self.happiness = value,
            ResourceKind::Education => self.education = value,
        }
    }

    /// True when every bar sits at its threshold.
    #[must_use]
    pub const fn all(&self) -> bool {
        self.money && self.health && self.happiness && self.education
    }
}

/// Result of one delta application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarUpdate {
    /// New bar levels, clamped to `[0, threshold]` and rounded.
    pub bars: Resources,
    pub completion_flags: CompletionFlags,
    /// True when the money delta drove the pre-clamp value below zero.
    pub debt_overdraft: bool,
}

/// Apply resource deltas to the four bars.
///
/// Each field is rounded after the delta, checked for money overdraft
/// before clamping, then clamped to `[0, threshold]`. Inputs are never
/// mutated.
///
/// # Errors
///
/// [`StatusError::NonPositiveThreshold`] when any threshold is `<= 0`.
pub fn apply_deltas(
    bars: &Resources,
    deltas: &Resources,
    thresholds: &Resources,
) -> Result<BarUpdate, StatusError> {
    for kind in ResourceKind::ALL {
        if thresholds.get(kind) <= 0.0 {
            return Err(StatusError::NonPositiveThreshold { field: kind.key() });
        }
    }

    let mut applied = Resources::default();
    for kind in ResourceKind::ALL {
        applied.set(kind, round2(bars.get(kind) + deltas.get(kind)));
    }

    // Overdraft is judged before the clamp eats the negative value.
    let debt_overdraft = applied.money < 0.0;

    let mut clamped = Resources::default();
    let mut completion_flags = CompletionFlags::default();
    for kind in ResourceKind::ALL {
        let limit = thresholds.get(kind);
        let value = round2(applied.get(kind).clamp(0.0, limit));
        clamped.set(kind, value);
        completion_flags.set(kind, value == limit);
    }

    Ok(BarUpdate {
        bars: clamped,
        completion_flags,
        debt_overdraft,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Resources {
        Resources::new(100.0, 40.0, 30.0, 20.0)
    }

    fn thresholds() -> Resources {
        Resources::new(500.0, 100.0, 100.0, 100.0)
    }

    fn delta(kind: ResourceKind, amount: f64) -> Resources {
        let mut d = Resources::default();
        d.set(kind, amount);
        d
    }

    #[test]
    fn overshoot_clamps_to_threshold_and_flags_completion() {
        let r = apply_deltas(&base(), &delta(ResourceKind::Money, 1000.0), &thresholds()).unwrap();
        assert!((r.bars.money - 500.0).abs() < f64::EPSILON);
        assert!(r.completion_flags.money);
        assert!(!r.completion_flags.health);
    }

    #[test]
    fn undershoot_clamps_to_zero() {
        let r = apply_deltas(&base(), &delta(ResourceKind::Health, -999.0), &thresholds()).unwrap();
        assert!(r.bars.health.abs() < f64::EPSILON);
        assert!(!r.debt_overdraft);
    }

    #[test]
    fn money_below_zero_sets_overdraft_before_clamp() {
        let r = apply_deltas(&base(), &delta(ResourceKind::Money, -150.0), &thresholds()).unwrap();
        assert!(r.debt_overdraft);
        assert!(r.bars.money.abs() < f64::EPSILON);
    }

    #[test]
    fn all_bars_at_threshold_sets_every_flag() {
        let full = Resources::new(500.0, 100.0, 100.0, 100.0);
        let r = apply_deltas(&full, &delta(ResourceKind::Money, 1.0), &thresholds()).unwrap();
        assert!(r.completion_flags.all());
    }

    #[test]
    fn inputs_are_untouched_and_output_deterministic() {
        let bars = base();
        let deltas = delta(ResourceKind::Happiness, 10.0);
        let r1 = apply_deltas(&bars, &deltas, &thresholds()).unwrap();
        let r2 = apply_deltas(&bars, &deltas, &thresholds()).unwrap();
        assert_eq!(r1, r2);
        assert_eq!(bars, base());
        assert_eq!(deltas, delta(ResourceKind::Happiness, 10.0));
    }

    #[test]
    fn deltas_round_to_two_decimals() {
        let r = apply_deltas(&base(), &delta(ResourceKind::Money, 0.005), &thresholds()).unwrap();
        assert!((r.bars.money - 100.01).abs() < 1e-9);
    }

    #[test]
    fn non_positive_threshold_is_rejected() {
        let mut bad = thresholds();
        bad.education = 0.0;
        let err = apply_deltas(&base(), &Resources::default(), &bad).unwrap_err();
        assert_eq!(
            err,
            StatusError::NonPositiveThreshold {
                field: "education"
            }
        );
    }
}
