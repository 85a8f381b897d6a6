//! End-of-week reporting: resource totals, advisories, upgrade ROI.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::activity::ActivityLogEntry;
use crate::constants::{ADVISORY_CONSIDER_UPGRADES, SUMMARY_MISC_CATEGORY};
use crate::numbers::round4;
use crate::obligations::PenaltyEntry;
use crate::resources::{ResourceKind, Resources};

/// An upgrade counted into the report, with an optional measured benefit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeApplied {
    pub id: String,
    pub cost: f64,
    /// Resource gain attributed to the upgrade; absent when unmeasured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefit: Option<Resources>,
}

/// Report request; borrows the week's artifacts.
#[derive(Debug, Clone)]
pub struct WeekSummaryInput<'a> {
    pub execution_log: &'a [ActivityLogEntry],
    pub penalties: &'a [PenaltyEntry],
    pub upgrades_applied: &'a [UpgradeApplied],
    /// Log lengths beyond this switch the report to category roll-ups.
    pub max_entries: Option<usize>,
}

/// Benefit-per-cost for one purchased upgrade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeRoiEntry {
    pub id: String,
    /// Benefit sum divided by cost, at four decimals.
    pub roi: f64,
}

/// Rewards summed for one activity-id prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRollup {
    pub category: String,
    #[serde(flatten)]
    pub totals: Resources,
}

/// The finished report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSummary {
    pub resource_totals: Resources,
    pub penalties_applied: Vec<PenaltyEntry>,
    pub advisory_messages: Vec<String>,
    pub upgrade_roi: Vec<UpgradeRoiEntry>,
    pub grouped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grouped_categories: Option<Vec<CategoryRollup>>,
}

/// Activity-id prefix before the first `:` or `-`.
fn category_of(id: &str) -> &str {
    let prefix = id.split([':', '-']).next().unwrap_or_default();
    if prefix.is_empty() {
        SUMMARY_MISC_CATEGORY
    } else {
        prefix
    }
}

/// Aggregate a completed week's log, penalties, and purchases.
///
/// Large logs (longer than `max_entries`) additionally collapse into
/// per-category roll-ups keyed by the activity-id prefix.
#[must_use]
pub fn build_week_summary(input: &WeekSummaryInput<'_>) -> WeekSummary {
    let mut resource_totals = Resources::default();
    for entry in input.execution_log {
        for kind in ResourceKind::ALL {
            resource_totals.add(kind, entry.rewards.get(kind));
        }
    }

    let mut advisory_messages = Vec::new();
    if resource_totals.total() < 0.0 {
        advisory_messages.push(ADVISORY_CONSIDER_UPGRADES.to_string());
    }

    let upgrade_roi = input
        .upgrades_applied
        .iter()
        .filter(|u| u.cost > 0.0)
        .filter_map(|u| {
            u.benefit.as_ref().map(|benefit| UpgradeRoiEntry {
                id: u.id.clone(),
                roi: round4(benefit.total() / u.cost),
            })
        })
        .collect();

    let grouped = input
        .max_entries
        .is_some_and(|max| input.execution_log.len() > max);
    let grouped_categories = grouped.then(|| {
        let mut agg: BTreeMap<&str, Resources> = BTreeMap::new();
        for entry in input.execution_log {
            let totals = agg.entry(category_of(&entry.id)).or_default();
            for kind in ResourceKind::ALL {
                totals.add(kind, entry.rewards.get(kind));
            }
        }
        agg.into_iter()
            .map(|(category, totals)| CategoryRollup {
                category: category.to_string(),
                totals,
            })
            .collect()
    });

    WeekSummary {
        resource_totals,
        penalties_applied: input.penalties.to_vec(),
        advisory_messages,
        upgrade_roi,
        grouped,
        grouped_categories,
    }
}
