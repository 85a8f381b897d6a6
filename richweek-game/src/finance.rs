//! Loans and simple investments: flat-schedule repayment, compound growth.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::EPSILON;

/// Finance operation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FinanceError {
    #[error("amount or term out of range")]
    InvalidAmount,
    #[error("investment must be held at least one week")]
    MinHolding,
    #[error("loan not found")]
    UnknownLoan,
    #[error("investment not found")]
    UnknownInvestment,
    #[error("early repayment rejected")]
    EarlyPayInvalid,
}

impl FinanceError {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidAmount => "FIN_INVALID_AMOUNT",
            Self::MinHolding => "FIN_MIN_HOLDING",
            Self::UnknownLoan => "FIN_UNKNOWN_LOAN",
            Self::UnknownInvestment => "FIN_UNKNOWN_INVESTMENT",
            Self::EarlyPayInvalid => "FIN_EARLYPAY_INVALID",
        }
    }
}

/// An outstanding loan on a flat principal schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub principal_original: f64,
    pub principal_remaining: f64,
    /// Simple interest rate per week, on remaining principal.
    pub weekly_rate: f64,
    pub term_weeks: u32,
    pub start_week: u32,
    /// Repayment cycles successfully processed.
    pub weeks_elapsed: u32,
    pub overdue: bool,
    pub interest_accumulated: f64,
    /// Total penalty interest added by overdue cycles.
    pub penalty_applied: f64,
}

/// An open investment compounding weekly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub id: String,
    pub amount: f64,
    /// Weekly compound rate; negative input is clamped to zero.
    pub growth_rate: f64,
    pub start_week: u32,
}

impl Investment {
    /// Current value after compounding since `start_week`.
    #[must_use]
    pub fn value_at(&self, current_week: u32) -> f64 {
        let weeks_held = current_week.saturating_sub(self.start_week);
        self.amount * (1.0 + self.growth_rate).powf(f64::from(weeks_held))
    }
}

/// Terms for a new loan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub amount: f64,
    pub weekly_rate: f64,
    pub term_weeks: u32,
    pub start_week: u32,
}

/// Terms for a new investment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvestmentRequest {
    pub amount: f64,
    pub growth_rate: f64,
    pub start_week: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepaymentConfig {
    /// Flat interest added per overdue cycle; clamped non-negative.
    pub penalty_rate: f64,
}

/// Totals from one repayment cycle across all loans.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RepaymentSummary {
    /// Money actually deducted this cycle.
    pub paid_total: f64,
    pub penalties_applied: f64,
}

/// Outcome of an early principal repayment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarlyRepayment {
    pub loan_id: String,
    pub amount_applied: f64,
    pub fully_repaid: bool,
}

/// Outcome of cashing out an investment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub investment_id: String,
    pub value: f64,
}

const fn default_next_id() -> u64 {
    1
}

/// Wallet, loan book, and investment book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceState {
    pub money: f64,
    #[serde(default)]
    pub loans: Vec<Loan>,
    #[serde(default)]
    pub investments: Vec<Investment>,
    #[serde(default = "default_next_id")]
    next_id: u64,
}

impl Default for FinanceState {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl FinanceState {
    #[must_use]
    pub const fn new(money: f64) -> Self {
        Self {
            money,
            loans: Vec::new(),
            investments: Vec::new(),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}_{}", self.next_id);
        self.next_id += 1;
        id
    }

    /// Take out a loan: cash is credited immediately.
    ///
    /// # Errors
    /// Returns [`FinanceError::InvalidAmount`] if amount or term is
    /// non-positive.
    pub fn issue_loan(&mut self, request: &LoanRequest) -> Result<Loan, FinanceError> {
        if request.amount <= 0.0 || request.term_weeks == 0 {
            return Err(FinanceError::InvalidAmount);
        }
        let loan = Loan {
            id: self.allocate_id("loan"),
            principal_original: request.amount,
            principal_remaining: request.amount,
            weekly_rate: request.weekly_rate.max(0.0),
            term_weeks: request.term_weeks,
            start_week: request.start_week,
            weeks_elapsed: 0,
            overdue: false,
            interest_accumulated: 0.0,
            penalty_applied: 0.0,
        };
        self.money += request.amount;
        self.loans.push(loan.clone());
        Ok(loan)
    }

    /// Process one repayment cycle for every active loan.
    ///
    /// Due = `principal_original / term_weeks` plus interest on remaining
    /// principal. An unaffordable installment marks the loan overdue and
    /// adds the penalty rate as extra interest; nothing is deducted and the
    /// loan is retried next cycle.
    pub fn weekly_repayment(
        &mut self,
        current_week: u32,
        config: &RepaymentConfig,
    ) -> RepaymentSummary {
        let penalty_rate = config.penalty_rate.max(0.0);
        let mut money = self.money;
        let mut summary = RepaymentSummary::default();
        for loan in &mut self.loans {
            let active = loan.principal_remaining > EPSILON
                && loan.weeks_elapsed < loan.term_weeks
                && current_week >= loan.start_week;
            if !active {
                continue;
            }
            let principal_due = loan.principal_original / f64::from(loan.term_weeks);
            let interest = loan.principal_remaining * loan.weekly_rate;
            let total_due = principal_due + interest;
            if money + EPSILON >= total_due {
                money -= total_due;
                loan.principal_remaining = (loan.principal_remaining - principal_due).max(0.0);
                loan.interest_accumulated += interest;
                loan.weeks_elapsed += 1;
                summary.paid_total += total_due;
            } else {
                loan.overdue = true;
                loan.interest_accumulated += penalty_rate;
                loan.penalty_applied += penalty_rate;
                summary.penalties_applied += penalty_rate;
            }
        }
        self.money = money;
        summary
    }

    /// Repay loan principal ahead of schedule.
    ///
    /// Overpayment is capped at the remaining principal; only the applied
    /// amount leaves the wallet. Interest and the schedule are untouched.
    ///
    /// # Errors
    /// Returns [`FinanceError::EarlyPayInvalid`] for a non-positive amount,
    /// insufficient funds, or an already-settled loan, and
    /// [`FinanceError::UnknownLoan`] if the id does not match.
    pub fn early_repay_loan(
        &mut self,
        loan_id: &str,
        amount: f64,
    ) -> Result<EarlyRepayment, FinanceError> {
        if amount <= 0.0 {
            return Err(FinanceError::EarlyPayInvalid);
        }
        if self.money < amount {
            return Err(FinanceError::EarlyPayInvalid);
        }
        let loan = self
            .loans
            .iter_mut()
            .find(|l| l.id == loan_id)
            .ok_or(FinanceError::UnknownLoan)?;
        if loan.principal_remaining <= EPSILON {
            return Err(FinanceError::EarlyPayInvalid);
        }
        let applied = amount.min(loan.principal_remaining);
        loan.principal_remaining -= applied;
        let fully_repaid = loan.principal_remaining <= EPSILON;
        let receipt = EarlyRepayment {
            loan_id: loan.id.clone(),
            amount_applied: applied,
            fully_repaid,
        };
        self.money -= applied;
        Ok(receipt)
    }

    /// Open an investment, deducting its principal from the wallet.
    ///
    /// # Errors
    /// Returns [`FinanceError::InvalidAmount`] if the amount is non-positive
    /// or exceeds available money.
    pub fn open_investment(
        &mut self,
        request: &InvestmentRequest,
    ) -> Result<Investment, FinanceError> {
        if request.amount <= 0.0 || self.money < request.amount {
            return Err(FinanceError::InvalidAmount);
        }
        let investment = Investment {
            id: self.allocate_id("inv"),
            amount: request.amount,
            growth_rate: request.growth_rate.max(0.0),
            start_week: request.start_week,
        };
        self.money -= request.amount;
        self.investments.push(investment.clone());
        Ok(investment)
    }

    /// Current value of every open investment, keyed by id.
    #[must_use]
    pub fn evaluate_investments(&self, current_week: u32) -> BTreeMap<String, f64> {
        self.investments
            .iter()
            .map(|inv| (inv.id.clone(), inv.value_at(current_week)))
            .collect()
    }

    /// Cash out an investment at its compounded value.
    ///
    /// # Errors
    /// Returns [`FinanceError::UnknownInvestment`] if the id does not match
    /// and [`FinanceError::MinHolding`] if held for less than one week.
    pub fn withdraw_investment(
        &mut self,
        investment_id: &str,
        current_week: u32,
    ) -> Result<Withdrawal, FinanceError> {
        let idx = self
            .investments
            .iter()
            .position(|inv| inv.id == investment_id)
            .ok_or(FinanceError::UnknownInvestment)?;
        if current_week < self.investments[idx].start_week + 1 {
            return Err(FinanceError::MinHolding);
        }
        let investment = self.investments.remove(idx);
        let value = investment.value_at(current_week);
        self.money += value;
        Ok(Withdrawal {
            investment_id: investment.id,
            value,
        })
    }
}
