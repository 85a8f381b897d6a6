//! Purchasable upgrades and per-category bonus multipliers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard ceilings for summed bonuses, keyed by category.
pub type HardCaps = BTreeMap<String, f64>;

/// A purchasable upgrade definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDef {
    pub id: String,
    /// Multiplier bucket, e.g. `travel`, `activity`, `reward`.
    pub category: String,
    pub cost: f64,
    /// Decimal bonus: 0.1 means +10%.
    pub bonus_percent: f64,
    /// Unique upgrades can be owned at most once.
    #[serde(default)]
    pub unique: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UpgradeError {
    #[error("upgrade not found")]
    UnknownUpgrade,
    #[error("not enough money")]
    InsufficientFunds,
    #[error("unique upgrade already owned")]
    Duplicate,
    #[error("definition has negative cost or bonus")]
    InvalidValue,
}

impl UpgradeError {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnknownUpgrade => "UNKNOWN_UPGRADE",
            Self::InsufficientFunds => "INSUFFICIENT_FUNDS",
            Self::Duplicate => "DUPLICATE",
            Self::InvalidValue => "INVALID_VALUE",
        }
    }
}

/// Wallet plus the list of owned upgrade ids.
///
/// Non-unique ids may appear more than once; each copy contributes its
/// bonus again.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpgradeState {
    pub money: f64,
    #[serde(default)]
    pub owned: Vec<String>,
}

impl UpgradeState {
    #[must_use]
    pub const fn new(money: f64) -> Self {
        Self {
            money,
            owned: Vec::new(),
        }
    }

    /// Buy an upgrade by id, deducting its cost.
    ///
    /// Returns a copy of the purchased definition.
    ///
    /// # Errors
    /// In check order: [`UpgradeError::UnknownUpgrade`] for an id absent
    /// from `defs`, [`UpgradeError::InvalidValue`] for a definition with
    /// negative cost or bonus, [`UpgradeError::Duplicate`] for a unique
    /// upgrade already owned, [`UpgradeError::InsufficientFunds`] when the
    /// wallet cannot cover the cost.
    pub fn purchase(&mut self, defs: &[UpgradeDef], upgrade_id: &str) -> Result<UpgradeDef, UpgradeError> {
        let def = defs
            .iter()
            .find(|d| d.id == upgrade_id)
            .ok_or(UpgradeError::UnknownUpgrade)?;
        if def.cost < 0.0 || def.bonus_percent < 0.0 {
            return Err(UpgradeError::InvalidValue);
        }
        if def.unique && self.owned.iter().any(|id| id == &def.id) {
            return Err(UpgradeError::Duplicate);
        }
        if self.money < def.cost {
            return Err(UpgradeError::InsufficientFunds);
        }
        self.money -= def.cost;
        self.owned.push(def.id.clone());
        Ok(def.clone())
    }
}

/// Per-category bonus sums, before and after caps.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MultipliersComputation {
    /// Uncapped sums.
    pub raw: BTreeMap<String, f64>,
    /// Sums after any configured hard cap.
    pub multipliers: BTreeMap<String, f64>,
}

impl MultipliersComputation {
    /// Capped multiplier for a category, zero when absent.
    #[must_use]
    pub fn get(&self, category: &str) -> f64 {
        self.multipliers.get(category).copied().unwrap_or(0.0)
    }
}

/// Sum owned bonuses per category and apply hard caps.
///
/// Owned ids that resolve to no definition, or to a definition with
/// negative cost or bonus, are skipped silently.
#[must_use]
pub fn compute_multipliers(
    owned_ids: &[String],
    defs: &[UpgradeDef],
    hard_caps: Option<&HardCaps>,
) -> MultipliersComputation {
    let mut raw: BTreeMap<String, f64> = BTreeMap::new();
    for id in owned_ids {
        let Some(def) = defs.iter().find(|d| &d.id == id) else {
            continue;
        };
        if def.cost < 0.0 || def.bonus_percent < 0.0 {
            continue;
        }
        *raw.entry(def.category.clone()).or_insert(0.0) += def.bonus_percent;
    }

    let multipliers = raw
        .iter()
        .map(|(category, sum)| {
            let capped = hard_caps
                .and_then(|caps| caps.get(category))
                .map_or(*sum, |cap| sum.min(*cap));
            (category.clone(), capped)
        })
        .collect();

    MultipliersComputation { raw, multipliers }
}
