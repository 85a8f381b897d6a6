//! Centralized tuning values and message keys for the Richweek engine.
//!
//! Keeping them together ensures the deterministic math can only be
//! adjusted via reviewed code changes, not external assets.

// Precision and tolerances ---------------------------------------------------
/// Comparison slack for time and money guards.
pub(crate) const EPSILON: f64 = 1e-9;
/// Fraction of the base budget the effective week can never drop below.
pub(crate) const EFFECTIVE_HOURS_FLOOR: f64 = 0.10;
/// Default rounding precision for travel segment times.
pub(crate) const DEFAULT_TRAVEL_PRECISION: u32 = 2;

// Session defaults -----------------------------------------------------------
/// Hours in a full calendar week; the default session budget.
pub const DEFAULT_WEEKLY_BUDGET: f64 = 168.0;
/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

// Forecast warning keys ------------------------------------------------------
pub const WARN_OVER_TIME: &str = "OVER_TIME";
pub const WARN_TRAVEL_NOT_POSSIBLE: &str = "TRAVEL_NOT_POSSIBLE";
pub const WARN_INVALID_ROUTE: &str = "INVALID_ROUTE";
pub const WARN_PENALTIES_PROJECTED: &str = "PENALTIES_PROJECTED";
pub const WARN_MISSING_TAG_PREFIX: &str = "MISSING_";

// Summary keys ---------------------------------------------------------------
pub const ADVISORY_CONSIDER_UPGRADES: &str = "Consider Upgrades";
/// Fallback grouping category for activity ids without a prefix.
pub(crate) const SUMMARY_MISC_CATEGORY: &str = "misc";

// Penalty routing ------------------------------------------------------------
/// Penalty types containing this token shorten next week's budget.
pub(crate) const PENALTY_TOKEN_TIME: &str = "TIME";
/// Penalty types containing this token debit the money bar.
pub(crate) const PENALTY_TOKEN_MONEY: &str = "MONEY";
