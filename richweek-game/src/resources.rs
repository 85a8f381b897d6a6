//! Resource vocabulary shared by bars, thresholds, deltas, and rewards.

use serde::{Deserialize, Serialize};

/// The four tracked resource dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Money,
    Health,
    Happiness,
    Education,
}

impl ResourceKind {
    /// All kinds in canonical order.
    pub const ALL: [Self; 4] = [Self::Money, Self::Health, Self::Happiness, Self::Education];

    /// Stable string key used in serialized maps and reports.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Money => "money",
            Self::Health => "health",
            Self::Happiness => "happiness",
            Self::Education => "education",
        }
    }
}

/// A bundle of per-resource amounts.
///
/// Doubles as bar levels, thresholds, deltas, rewards, and totals; absent
/// JSON fields deserialize to zero so partial reward maps stay terse.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Resources {
    #[serde(default)]
    pub money: f64,
    #[serde(default)]
    pub health: f64,
    #[serde(default)]
    pub happiness: f64,
    #[serde(default)]
    pub education: f64,
}

impl Resources {
    #[must_use]
    pub const fn new(money: f64, health: f64, happiness: f64, education: f64) -> Self {
        Self {
            money,
            health,
            happiness,
            education,
        }
    }

    /// The same value in every component (uniform thresholds).
    #[must_use]
    pub const fn splat(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    #[must_use]
    pub const fn get(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Money => self.money,
            ResourceKind::Health => self.health,
            ResourceKind::Happiness => self.happiness,
            ResourceKind::Education => self.education,
        }
    }

    pub fn set(&mut self, kind: ResourceKind, value: f64) {
        match kind {
            ResourceKind::Money => self.money = value,
            ResourceKind::Health => self.health = value,
            ResourceKind::Happiness => self.happiness = value,
            ResourceKind::Education => self.education = value,
        }
    }

    pub fn add(&mut self, kind: ResourceKind, delta: f64) {
        self.set(kind, self.get(kind) + delta);
    }

    /// Sum of all four components.
    #[must_use]
    pub fn total(&self) -> f64 {
        ResourceKind::ALL.iter().map(|&k| self.get(k)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_defaults_missing_components() {
        let r: Resources = serde_json::from_str(r#"{"money": 100, "health": 5}"#).unwrap();
        assert!((r.money - 100.0).abs() < f64::EPSILON);
        assert!((r.health - 5.0).abs() < f64::EPSILON);
        assert!(r.happiness.abs() < f64::EPSILON);
        assert!(r.education.abs() < f64::EPSILON);
    }

    #[test]
    fn keyed_access_round_trips() {
        let mut r = Resources::default();
        for (i, kind) in ResourceKind::ALL.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            r.set(*kind, i as f64 + 1.0);
        }
        assert!((r.get(ResourceKind::Money) - 1.0).abs() < f64::EPSILON);
        assert!((r.get(ResourceKind::Education) - 4.0).abs() < f64::EPSILON);
        assert!((r.total() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn kind_keys_are_lowercase_names() {
        assert_eq!(ResourceKind::Money.key(), "money");
        assert_eq!(ResourceKind::Happiness.key(), "happiness");
    }
}
