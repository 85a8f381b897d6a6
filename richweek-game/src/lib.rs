//! Richweek Game Engine
//!
//! Platform-agnostic core logic for the Richweek life/economy game: one
//! deterministic weekly simulation composed of pure functions over immutable
//! values. No I/O, no globals, no clocks; callers own all persistence and
//! presentation.

pub mod activity;
pub mod constants;
pub mod finance;
pub mod forecast;
pub mod numbers;
pub mod obligations;
pub mod resources;
pub mod session;
pub mod snapshot;
pub mod status;
pub mod summary;
pub mod travel;
pub mod upgrades;
pub mod victory;
pub mod week;
pub mod weekly;

// Re-export commonly used types
pub use activity::{
    ActivityDef, ActivityLogEntry, ActivityStatus, ExecuteOptions, PlanExecution, TagSet,
    execute_plan,
};
pub use constants::{DEFAULT_WEEKLY_BUDGET, SNAPSHOT_VERSION};
pub use finance::{
    EarlyRepayment, FinanceError, FinanceState, Investment, InvestmentRequest, Loan, LoanRequest,
    RepaymentConfig, RepaymentSummary, Withdrawal,
};
pub use forecast::{
    FinancePreview, ForecastInput, ForecastResult, MultiplierOverrides, ProjectedPenalties,
    TimeUsage, TravelPlan, simulate_plan,
};
pub use obligations::{
    ObligationConfig, ObligationEvaluation, ObligationReport, PenaltyEntry, evaluate_obligations,
};
pub use resources::{ResourceKind, Resources};
pub use session::{GameSession, PlanFinance, WeekOutcome, WeekPlan};
pub use snapshot::{GameSnapshot, SnapshotError, export_snapshot, import_snapshot};
pub use status::{BarUpdate, CompletionFlags, StatusError, apply_deltas};
pub use summary::{
    CategoryRollup, UpgradeApplied, UpgradeRoiEntry, WeekSummary, WeekSummaryInput,
    build_week_summary,
};
pub use travel::{
    DistanceMatrix, TravelComputation, TravelConfig, TravelConfigError, TravelError, compute_travel,
    hop_key,
};
pub use upgrades::{
    HardCaps, MultipliersComputation, UpgradeDef, UpgradeError, UpgradeState, compute_multipliers,
};
pub use victory::{VictoryResult, evaluate_victory};
pub use week::{WeekError, WeekState, allocate_activity, allocate_travel, init_week};
pub use weekly::{
    FinanceInput, PenaltyProjection, PurchaseOutcome, SimulationError, SummaryOptions,
    VictoryOptions, WeekSimulationInput, WeekSimulationResult, simulate_week,
};
