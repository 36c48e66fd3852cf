//! Fractional-reserve bank
//!
//! The bank holds cash reserves, owes every customer their deposit balance,
//! and is owed every customer's loan principal:
//!
//! ```text
//! assets      = reserves + Σ outstanding loan principal
//! liabilities = Σ deposit balances
//! ```
//!
//! Customer-facing operations (deposit, withdraw, transfer, borrow, amortize)
//! are in `operations.rs`. The end-of-period work (loan accrual, profit
//! distribution, inflation estimate and interest-rate control) is in
//! `policy.rs` and is driven by the orchestrator in phase order.
//!
//! # Critical Invariants
//!
//! 1. **Non-negative Reserves**: `reserves >= 0` after every operation
//! 2. **Liability-side Transfers**: transfers never touch reserves
//! 3. **Soft Balance**: assets ≈ liabilities, restored by profit distribution
//! 4. **Rate Bounds**: after a policy update the nominal rate lies in
//!    `[max(0.005, inflation + 0.005), 1 + inflation]`

pub mod config;
mod operations;
mod policy;

pub use config::BankConfig;
pub use policy::{bound_rate, PolicyOutcome};

use crate::models::customer::CustomerId;
use crate::models::ledger::{AccountIndex, Ledger};
use crate::models::loan::Tranche;
use thiserror::Error;

/// Borrow requests below this are ignored as floating-point noise
pub const MIN_BORROW: f64 = 0.01;

/// Repayments below this are ignored as floating-point noise
pub const MIN_AMORTIZE: f64 = 0.001;

/// Reserves left in the vault when a withdrawal would drain them
pub const RESERVE_FLOOR: f64 = 0.1;

/// Errors that can occur during bank operations
///
/// Business edge cases (overdrafts, oversized withdrawals, defaults) are
/// clamped, never reported. These only signal caller mistakes.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BankError {
    #[error("Customer has no account: {0}")]
    UnknownCustomer(CustomerId),

    #[error("Invalid {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// The single bank of a simulation run
#[derive(Debug, Clone)]
pub struct Bank {
    /// Cash assets held centrally
    reserves: f64,

    /// Per-period rate charged on new loans
    nominal_rate: f64,

    /// Reserve ratio the rate controller steers toward
    target_reserve_ratio: f64,

    /// Asset/liability gap above which profit is disbursed
    profit_tolerance: f64,

    /// Damping exponent for the reserve-momentum term
    rate_smoothness: f64,

    /// Withdrawals requested so far in the current period
    withdrawals_this_period: f64,

    /// Withdrawals requested in the last completed period
    last_withdrawal_flow: f64,

    /// Decaying average of per-period price growth
    inflation_estimate: f64,

    /// Principal written off across all defaults
    cumulative_defaults: f64,

    /// Price level at the last inflation observation
    price_level_memo: f64,

    /// Reserves at the end of the previous policy update
    last_reserves: f64,

    /// Deposit accounts and loan books
    ledger: Ledger,
}

/// Scalar state of a bank, used to restore it from a checkpoint
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BankScalars {
    pub reserves: f64,
    pub nominal_rate: f64,
    pub target_reserve_ratio: f64,
    pub profit_tolerance: f64,
    pub rate_smoothness: f64,
    pub withdrawals_this_period: f64,
    pub last_withdrawal_flow: f64,
    pub inflation_estimate: f64,
    pub cumulative_defaults: f64,
    pub price_level_memo: f64,
    pub last_reserves: f64,
}

impl Bank {
    /// Create a bank with no accounts and no reserves
    ///
    /// # Example
    /// ```
    /// use bank_ledger_core_rs::{Bank, BankConfig};
    ///
    /// let bank = Bank::new(BankConfig::default()).unwrap();
    /// assert_eq!(bank.nominal_rate(), 0.1);
    /// assert_eq!(bank.reserve_ratio(), 1.0); // no liabilities yet
    /// ```
    pub fn new(config: BankConfig) -> Result<Self, BankError> {
        config.validate()?;
        Ok(Self {
            reserves: 0.0,
            nominal_rate: config.initial_rate,
            target_reserve_ratio: config.target_reserve_ratio,
            profit_tolerance: config.profit_tolerance,
            rate_smoothness: config.rate_smoothness,
            withdrawals_this_period: 0.0,
            last_withdrawal_flow: 0.0,
            inflation_estimate: 0.0,
            cumulative_defaults: 0.0,
            price_level_memo: config.initial_price_level,
            last_reserves: 0.0,
            ledger: Ledger::new(),
        })
    }

    pub(crate) fn from_parts(scalars: BankScalars, ledger: Ledger) -> Self {
        Self {
            reserves: scalars.reserves,
            nominal_rate: scalars.nominal_rate,
            target_reserve_ratio: scalars.target_reserve_ratio,
            profit_tolerance: scalars.profit_tolerance,
            rate_smoothness: scalars.rate_smoothness,
            withdrawals_this_period: scalars.withdrawals_this_period,
            last_withdrawal_flow: scalars.last_withdrawal_flow,
            inflation_estimate: scalars.inflation_estimate,
            cumulative_defaults: scalars.cumulative_defaults,
            price_level_memo: scalars.price_level_memo,
            last_reserves: scalars.last_reserves,
            ledger,
        }
    }

    pub(crate) fn scalars(&self) -> BankScalars {
        BankScalars {
            reserves: self.reserves,
            nominal_rate: self.nominal_rate,
            target_reserve_ratio: self.target_reserve_ratio,
            profit_tolerance: self.profit_tolerance,
            rate_smoothness: self.rate_smoothness,
            withdrawals_this_period: self.withdrawals_this_period,
            last_withdrawal_flow: self.last_withdrawal_flow,
            inflation_estimate: self.inflation_estimate,
            cumulative_defaults: self.cumulative_defaults,
            price_level_memo: self.price_level_memo,
            last_reserves: self.last_reserves,
        }
    }

    fn resolve(&self, customer_id: &CustomerId) -> Result<AccountIndex, BankError> {
        self.ledger
            .index_of(customer_id)
            .ok_or_else(|| BankError::UnknownCustomer(customer_id.clone()))
    }

    // ========================================================================
    // Reporters
    // ========================================================================

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn num_accounts(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_registered(&self, customer_id: &CustomerId) -> bool {
        self.ledger.contains(customer_id)
    }

    /// Deposit balance of a customer, 0 if they have no account
    pub fn balance_of(&self, customer_id: &CustomerId) -> f64 {
        self.ledger.get(customer_id).map_or(0.0, |row| row.balance)
    }

    /// Outstanding loan principal of a customer, 0 if they have no account
    pub fn debt_of(&self, customer_id: &CustomerId) -> f64 {
        self.ledger
            .get(customer_id)
            .map_or(0.0, |row| row.loans.outstanding())
    }

    /// Loan tranches of a customer, oldest first
    pub fn tranches(&self, customer_id: &CustomerId) -> &[Tranche] {
        match self.ledger.get(customer_id) {
            Some(row) => row.loans.tranches(),
            None => &[],
        }
    }

    pub fn reserves(&self) -> f64 {
        self.reserves
    }

    /// Reserves plus all outstanding loan principal
    pub fn total_assets(&self) -> f64 {
        self.reserves + self.ledger.total_loans()
    }

    /// Sum of all deposit balances
    pub fn total_liabilities(&self) -> f64 {
        self.ledger.total_deposits()
    }

    /// Outstanding credit across all customers
    pub fn outstanding_debt(&self) -> f64 {
        self.total_assets() - self.reserves
    }

    /// Reserves over liabilities, defined as 1 when there are no liabilities
    pub fn reserve_ratio(&self) -> f64 {
        let liabilities = self.total_liabilities();
        if liabilities == 0.0 {
            1.0
        } else {
            self.reserves / liabilities
        }
    }

    pub fn target_reserve_ratio(&self) -> f64 {
        self.target_reserve_ratio
    }

    pub fn nominal_rate(&self) -> f64 {
        self.nominal_rate
    }

    /// Nominal rate net of the inflation estimate
    pub fn real_rate(&self) -> f64 {
        self.nominal_rate - self.inflation_estimate
    }

    pub fn inflation_estimate(&self) -> f64 {
        self.inflation_estimate
    }

    pub fn cumulative_defaults(&self) -> f64 {
        self.cumulative_defaults
    }

    /// Withdrawals requested during the last completed period
    pub fn last_withdrawal_flow(&self) -> f64 {
        self.last_withdrawal_flow
    }

    /// Withdrawals requested so far in the current period
    pub fn withdrawals_this_period(&self) -> f64 {
        self.withdrawals_this_period
    }

    pub fn profit_tolerance(&self) -> f64 {
        self.profit_tolerance
    }

    pub fn rate_smoothness(&self) -> f64 {
        self.rate_smoothness
    }

    // ========================================================================
    // Reparametrization
    // ========================================================================

    /// Set the nominal rate so that the real rate equals `real_rate`
    ///
    /// # Example
    /// ```
    /// use bank_ledger_core_rs::{Bank, BankConfig};
    ///
    /// let mut bank = Bank::new(BankConfig::default()).unwrap();
    /// bank.set_real_rate(0.03).unwrap();
    /// assert_eq!(bank.real_rate(), 0.03);
    /// ```
    pub fn set_real_rate(&mut self, real_rate: f64) -> Result<(), BankError> {
        config::check_finite("real_rate", real_rate)?;
        self.nominal_rate = real_rate + self.inflation_estimate;
        Ok(())
    }

    pub fn set_target_reserve_ratio(&mut self, ratio: f64) -> Result<(), BankError> {
        config::validate_target_reserve_ratio(ratio)?;
        self.target_reserve_ratio = ratio;
        Ok(())
    }

    pub fn set_profit_tolerance(&mut self, tolerance: f64) -> Result<(), BankError> {
        config::validate_profit_tolerance(tolerance)?;
        self.profit_tolerance = tolerance;
        Ok(())
    }

    pub fn set_rate_smoothness(&mut self, smoothness: f64) -> Result<(), BankError> {
        config::check_finite("rate_smoothness", smoothness)?;
        self.rate_smoothness = smoothness;
        Ok(())
    }
}
