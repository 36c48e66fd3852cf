//! Orchestrator Engine
//!
//! Explicit simulation context around the single bank of a run. Every
//! customer operation and every end-of-period step goes through it, and it
//! rejects calls made in the wrong phase:
//!
//! ```text
//! For each period t:
//! 1. Trading       deposit / withdraw / transfer / borrow / amortize
//! 2. close_trading
//! 3. Accrual       every loan book accrues and collects its minimum
//! 4. PolicyUpdate  profit distribution, inflation estimate, rate reset
//! 5. Advance to period t + 1 (Trading)
//! ```
//!
//! # Example
//!
//! ```rust
//! use bank_ledger_core_rs::{BankConfig, CashHolder, Customer, CustomerId, Orchestrator};
//!
//! let mut orchestrator = Orchestrator::new(BankConfig::default()).unwrap();
//! let mut household = CashHolder::new("HH_1", 100.0);
//! let store = CustomerId::from("STORE");
//!
//! orchestrator.open_account(household.id()).unwrap();
//! orchestrator.open_account(&store).unwrap();
//!
//! for _ in 0..3 {
//!     orchestrator.deposit(&mut household, 10.0).unwrap();
//!     orchestrator.borrow(&store, 5.0).unwrap();
//!     let result = orchestrator.step(&50.0).unwrap();
//!     println!("period {}: rate {:.4}", result.period, result.nominal_rate);
//! }
//! assert_eq!(orchestrator.current_period(), 3);
//! ```

use crate::bank::{Bank, BankConfig, BankError};
use crate::core::period::{PeriodClock, Phase};
use crate::models::customer::{Customer, CustomerId};
use crate::models::event::{Event, EventLog};
use crate::models::loan::{LoanOutcome, Tranche};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Collaborators and Results
// ============================================================================

/// Source of the economy-wide price level
pub trait PriceReference {
    fn price_level(&self) -> f64;
}

impl PriceReference for f64 {
    fn price_level(&self) -> f64 {
        *self
    }
}

/// Totals of one accrual phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AccrualSummary {
    /// Customers whose debt was written down
    pub num_defaults: usize,

    /// Principal written off this period
    pub defaulted: f64,

    /// Shortfalls the bank collected from deposit accounts
    pub forced_repayments: f64,

    /// Interest capitalized across all loan books
    pub interest_accrued: f64,
}

impl AccrualSummary {
    fn record(&mut self, outcome: &LoanOutcome) {
        if outcome.is_default() {
            self.num_defaults += 1;
        }
        self.defaulted += outcome.defaulted;
        self.forced_repayments += outcome.forced;
        self.interest_accrued += outcome.minimum_due;
    }
}

/// Result of a single period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodResult {
    /// Period that was closed
    pub period: usize,

    pub num_defaults: usize,
    pub defaulted: f64,
    pub forced_repayments: f64,
    pub interest_accrued: f64,
    pub profit_disbursed: f64,

    pub nominal_rate: f64,
    pub real_rate: f64,
    pub inflation_estimate: f64,
    pub reserves: f64,
    pub reserve_ratio: f64,
    pub outstanding_debt: f64,
    pub cumulative_defaults: f64,
    pub withdrawal_flow: f64,
}

/// Simulation error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    #[error("Operation requires {expected} phase, simulation is in {actual}")]
    WrongPhase { expected: Phase, actual: Phase },

    #[error("Invalid price level: {0}")]
    InvalidPriceLevel(f64),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Config mismatch: expected hash {expected}, got {actual}")]
    ConfigMismatch { expected: String, actual: String },

    #[error("State validation error: {0}")]
    StateValidationError(String),
}

impl From<BankError> for SimulationError {
    fn from(err: BankError) -> Self {
        match err {
            BankError::UnknownCustomer(id) => SimulationError::CustomerNotFound(id),
            other => SimulationError::InvalidConfig(other.to_string()),
        }
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Simulation context owning the bank, the period clock and the event log
pub struct Orchestrator {
    /// Configuration the bank was built from (checkpoint identity)
    config: BankConfig,

    /// The single bank of the run
    bank: Bank,

    /// Current period and phase
    clock: PeriodClock,

    /// Totals of the current period's accrual phase
    accrual: AccrualSummary,

    /// Event log (all ledger movements)
    event_log: EventLog,
}

impl Orchestrator {
    /// Create new orchestrator from configuration
    ///
    /// # Errors
    ///
    /// `SimulationError::InvalidConfig` if a bank parameter is out of range.
    pub fn new(config: BankConfig) -> Result<Self, SimulationError> {
        let bank = Bank::new(config.clone())?;
        info!(
            "bank opened: rate {}, target reserve ratio {}",
            config.initial_rate, config.target_reserve_ratio
        );

        Ok(Self {
            config,
            bank,
            clock: PeriodClock::new(),
            accrual: AccrualSummary::default(),
            event_log: EventLog::new(),
        })
    }

    pub(crate) fn from_parts(
        config: BankConfig,
        bank: Bank,
        clock: PeriodClock,
        accrual: AccrualSummary,
    ) -> Self {
        Self {
            config,
            bank,
            clock,
            accrual,
            event_log: EventLog::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &BankConfig {
        &self.config
    }

    /// Read-only view of the bank and all its reporters
    pub fn bank(&self) -> &Bank {
        &self.bank
    }

    pub fn current_period(&self) -> usize {
        self.clock.period()
    }

    pub fn phase(&self) -> Phase {
        self.clock.phase()
    }

    pub(crate) fn clock(&self) -> &PeriodClock {
        &self.clock
    }

    pub(crate) fn accrual(&self) -> &AccrualSummary {
        &self.accrual
    }

    pub fn event_count(&self) -> usize {
        self.event_log.len()
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Drop logged events, e.g. after the data layer has consumed them
    pub fn clear_events(&mut self) {
        self.event_log.clear();
    }

    pub fn balance_of(&self, customer_id: &CustomerId) -> f64 {
        self.bank.balance_of(customer_id)
    }

    pub fn debt_of(&self, customer_id: &CustomerId) -> f64 {
        self.bank.debt_of(customer_id)
    }

    pub fn tranches(&self, customer_id: &CustomerId) -> &[Tranche] {
        self.bank.tranches(customer_id)
    }

    // ========================================================================
    // Reparametrization
    // ========================================================================

    pub fn set_real_rate(&mut self, real_rate: f64) -> Result<(), SimulationError> {
        Ok(self.bank.set_real_rate(real_rate)?)
    }

    pub fn set_target_reserve_ratio(&mut self, ratio: f64) -> Result<(), SimulationError> {
        Ok(self.bank.set_target_reserve_ratio(ratio)?)
    }

    pub fn set_profit_tolerance(&mut self, tolerance: f64) -> Result<(), SimulationError> {
        Ok(self.bank.set_profit_tolerance(tolerance)?)
    }

    pub fn set_rate_smoothness(&mut self, smoothness: f64) -> Result<(), SimulationError> {
        Ok(self.bank.set_rate_smoothness(smoothness)?)
    }

    // ========================================================================
    // Trading Phase
    // ========================================================================

    fn require_phase(&self, expected: Phase) -> Result<(), SimulationError> {
        let actual = self.clock.phase();
        if actual == expected {
            Ok(())
        } else {
            Err(SimulationError::WrongPhase { expected, actual })
        }
    }

    fn log_event(&mut self, event: Event) {
        self.event_log.log(event);
    }

    /// Register a customer; returns `false` if they already have an account
    pub fn open_account(&mut self, customer_id: &CustomerId) -> Result<bool, SimulationError> {
        self.require_phase(Phase::Trading)?;
        let opened = self.bank.open_account(customer_id);
        if opened {
            self.log_event(Event::AccountOpened {
                period: self.clock.period(),
                customer_id: customer_id.clone(),
            });
        }
        Ok(opened)
    }

    pub fn deposit<C: Customer + ?Sized>(
        &mut self,
        customer: &mut C,
        amount: f64,
    ) -> Result<f64, SimulationError> {
        self.require_phase(Phase::Trading)?;
        let moved = self.bank.deposit(customer, amount)?;
        if moved != 0.0 {
            let period = self.clock.period();
            let customer_id = customer.id().clone();
            if moved > 0.0 {
                self.log_event(Event::Deposit {
                    period,
                    customer_id,
                    requested: amount,
                    amount: moved,
                });
            } else {
                self.log_event(Event::Withdrawal {
                    period,
                    customer_id,
                    requested: -amount,
                    amount: -moved,
                });
            }
        }
        Ok(moved)
    }

    pub fn withdraw<C: Customer + ?Sized>(
        &mut self,
        customer: &mut C,
        amount: f64,
    ) -> Result<f64, SimulationError> {
        self.require_phase(Phase::Trading)?;
        let paid = self.bank.withdraw(customer, amount)?;
        if paid != 0.0 {
            let period = self.clock.period();
            let customer_id = customer.id().clone();
            if paid > 0.0 {
                self.log_event(Event::Withdrawal {
                    period,
                    customer_id,
                    requested: amount,
                    amount: paid,
                });
            } else {
                self.log_event(Event::Deposit {
                    period,
                    customer_id,
                    requested: -amount,
                    amount: -paid,
                });
            }
        }
        Ok(paid)
    }

    pub fn transfer(
        &mut self,
        from: &CustomerId,
        to: &CustomerId,
        amount: f64,
    ) -> Result<f64, SimulationError> {
        self.require_phase(Phase::Trading)?;
        let moved = self.bank.transfer(from, to, amount)?;
        if moved > 0.0 {
            self.log_event(Event::Transfer {
                period: self.clock.period(),
                from: from.clone(),
                to: to.clone(),
                amount: moved,
            });
        }
        Ok(moved)
    }

    pub fn borrow(&mut self, customer_id: &CustomerId, amount: f64) -> Result<f64, SimulationError> {
        self.require_phase(Phase::Trading)?;
        let rate = self.bank.nominal_rate();
        let borrowed = self.bank.borrow(customer_id, amount)?;
        if borrowed > 0.0 {
            self.log_event(Event::Borrow {
                period: self.clock.period(),
                customer_id: customer_id.clone(),
                amount: borrowed,
                refinanced: (borrowed - amount).max(0.0),
                rate,
            });
        }
        Ok(borrowed)
    }

    pub fn amortize(&mut self, customer_id: &CustomerId, amount: f64) -> Result<f64, SimulationError> {
        self.require_phase(Phase::Trading)?;
        let applied = self.bank.amortize(customer_id, amount)?;
        if applied > 0.0 {
            self.log_event(Event::Amortize {
                period: self.clock.period(),
                customer_id: customer_id.clone(),
                amount: applied,
            });
        }
        Ok(applied)
    }

    // ========================================================================
    // End of Period
    // ========================================================================

    /// End the trading phase; no customer operations are accepted until the
    /// next period
    pub fn close_trading(&mut self) -> Result<(), SimulationError> {
        self.require_phase(Phase::Trading)?;
        self.clock.advance_phase();
        Ok(())
    }

    /// Step every loan book: accrue interest, collect minimum repayments,
    /// write down defaulted debt
    pub fn accrue(&mut self) -> Result<AccrualSummary, SimulationError> {
        self.require_phase(Phase::Accrual)?;
        let period = self.clock.period();

        let mut summary = AccrualSummary::default();
        for (customer_id, outcome) in self.bank.step_loan_books() {
            summary.record(&outcome);
            if outcome.forced > 0.0 {
                self.event_log.log(Event::ForcedRepayment {
                    period,
                    customer_id: customer_id.clone(),
                    amount: outcome.forced,
                });
            }
            if outcome.is_default() {
                self.event_log.log(Event::Default {
                    period,
                    customer_id,
                    written_off: outcome.defaulted,
                });
            }
        }

        if summary.num_defaults > 0 {
            debug!(
                "period {}: {} default(s), {:.4} written off",
                period, summary.num_defaults, summary.defaulted
            );
        }

        self.accrual = summary;
        self.clock.advance_phase();
        Ok(summary)
    }

    /// Run the bank's profit, inflation and rate update, then open the next
    /// period for trading
    ///
    /// # Errors
    ///
    /// `InvalidPriceLevel` if the reference price is not a positive number;
    /// the phase does not advance in that case.
    pub fn update_policy<P: PriceReference + ?Sized>(
        &mut self,
        prices: &P,
    ) -> Result<PeriodResult, SimulationError> {
        self.require_phase(Phase::PolicyUpdate)?;
        let price_level = prices.price_level();
        if !(price_level.is_finite() && price_level > 0.0) {
            return Err(SimulationError::InvalidPriceLevel(price_level));
        }

        let period = self.clock.period();
        let outcome = self.bank.step_policy(period, price_level);

        if outcome.profit_disbursed > 0.0 {
            self.log_event(Event::ProfitDisbursed {
                period,
                amount: outcome.profit_disbursed,
            });
        }
        self.log_event(Event::RateUpdate {
            period,
            previous_rate: outcome.previous_rate,
            new_rate: outcome.new_rate,
            inflation_estimate: self.bank.inflation_estimate(),
            reserve_ratio: self.bank.reserve_ratio(),
        });

        let accrual = std::mem::take(&mut self.accrual);
        let result = PeriodResult {
            period,
            num_defaults: accrual.num_defaults,
            defaulted: accrual.defaulted,
            forced_repayments: accrual.forced_repayments,
            interest_accrued: accrual.interest_accrued,
            profit_disbursed: outcome.profit_disbursed,
            nominal_rate: self.bank.nominal_rate(),
            real_rate: self.bank.real_rate(),
            inflation_estimate: self.bank.inflation_estimate(),
            reserves: self.bank.reserves(),
            reserve_ratio: self.bank.reserve_ratio(),
            outstanding_debt: self.bank.outstanding_debt(),
            cumulative_defaults: self.bank.cumulative_defaults(),
            withdrawal_flow: self.bank.last_withdrawal_flow(),
        };

        self.clock.advance_phase();
        Ok(result)
    }

    /// Close trading, accrue loan books and update policy in one call
    pub fn step<P: PriceReference + ?Sized>(
        &mut self,
        prices: &P,
    ) -> Result<PeriodResult, SimulationError> {
        let price_level = prices.price_level();
        if !(price_level.is_finite() && price_level > 0.0) {
            return Err(SimulationError::InvalidPriceLevel(price_level));
        }
        self.close_trading()?;
        self.accrue()?;
        self.update_policy(&price_level)
    }

    // ========================================================================
    // Checkpointing
    // ========================================================================

    /// Serialize the complete engine state to JSON
    ///
    /// The event log is not part of the checkpoint.
    pub fn save_state(&self) -> Result<String, SimulationError> {
        use crate::orchestrator::checkpoint::{compute_config_hash, validate_snapshot, StateSnapshot};

        let snapshot = StateSnapshot {
            period: self.clock().period(),
            phase: self.clock().phase(),
            bank: self.bank.snapshot(),
            accrual: *self.accrual(),
            config_hash: compute_config_hash(&self.config)?,
        };
        validate_snapshot(&snapshot)?;

        serde_json::to_string(&snapshot).map_err(|e| {
            SimulationError::SerializationError(format!("Failed to serialize state: {}", e))
        })
    }

    /// Restore an orchestrator from a `save_state` checkpoint
    ///
    /// # Errors
    ///
    /// - `DeserializationError` if the JSON does not parse
    /// - `ConfigMismatch` if `config` differs from the one the state was saved with
    /// - `StateValidationError` if the snapshot breaks a ledger invariant
    pub fn load_state(config: BankConfig, state_json: &str) -> Result<Self, SimulationError> {
        use crate::orchestrator::checkpoint::{compute_config_hash, validate_snapshot, StateSnapshot};

        let snapshot: StateSnapshot = serde_json::from_str(state_json).map_err(|e| {
            SimulationError::DeserializationError(format!("Failed to parse state JSON: {}", e))
        })?;

        let config_hash = compute_config_hash(&config)?;
        if snapshot.config_hash != config_hash {
            return Err(SimulationError::ConfigMismatch {
                expected: snapshot.config_hash,
                actual: config_hash,
            });
        }

        validate_snapshot(&snapshot)?;

        let bank = Bank::from_snapshot(snapshot.bank)
            .map_err(SimulationError::StateValidationError)?;
        let clock = PeriodClock::from_state(snapshot.period, snapshot.phase);

        Ok(Self::from_parts(config, bank, clock, snapshot.accrual))
    }
}
