//! Period clock for the simulation
//!
//! The economy advances in discrete periods. Each period passes through three
//! phases in a fixed order:
//!
//! ```text
//! Trading ──close──▶ Accrual ──loan books──▶ PolicyUpdate ──bank──▶ Trading (period + 1)
//! ```
//!
//! Customer operations belong to `Trading`, loan-book accrual to `Accrual`,
//! and the bank's rate/inflation/profit update to `PolicyUpdate`. The clock
//! only moves forward along that cycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of initial periods during which the inflation estimate and the
/// reserve-momentum term are not updated.
pub const WARMUP_PERIODS: usize = 2;

/// Phase of a simulation period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Customers deposit, withdraw, transfer, borrow and amortize
    Trading,
    /// Loan books accrue interest and collect minimum repayments
    Accrual,
    /// The bank distributes profit and resets its interest rate
    PolicyUpdate,
}

impl Phase {
    /// The phase that follows this one
    pub fn next(self) -> Phase {
        match self {
            Phase::Trading => Phase::Accrual,
            Phase::Accrual => Phase::PolicyUpdate,
            Phase::PolicyUpdate => Phase::Trading,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Trading => "Trading",
            Phase::Accrual => "Accrual",
            Phase::PolicyUpdate => "PolicyUpdate",
        };
        f.write_str(name)
    }
}

/// Tracks the current period and its phase
///
/// # Example
/// ```
/// use bank_ledger_core_rs::{PeriodClock, Phase};
///
/// let mut clock = PeriodClock::new();
/// assert_eq!(clock.period(), 0);
/// assert_eq!(clock.phase(), Phase::Trading);
///
/// clock.advance_phase();
/// clock.advance_phase();
/// clock.advance_phase();
/// assert_eq!(clock.period(), 1);
/// assert_eq!(clock.phase(), Phase::Trading);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodClock {
    /// Periods completed since simulation start
    period: usize,
    /// Phase within the current period
    phase: Phase,
}

impl Default for PeriodClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PeriodClock {
    /// Create a clock at period 0, trading phase
    pub fn new() -> Self {
        Self {
            period: 0,
            phase: Phase::Trading,
        }
    }

    /// Restore a clock from a checkpoint
    pub fn from_state(period: usize, phase: Phase) -> Self {
        Self { period, phase }
    }

    /// Move to the next phase, starting a new period after `PolicyUpdate`
    ///
    /// Returns the phase entered.
    pub fn advance_phase(&mut self) -> Phase {
        if self.phase == Phase::PolicyUpdate {
            self.period += 1;
        }
        self.phase = self.phase.next();
        self.phase
    }

    /// Current period (0-indexed)
    pub fn period(&self) -> usize {
        self.period
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the current period is one of the warm-up periods
    ///
    /// # Example
    /// ```
    /// use bank_ledger_core_rs::PeriodClock;
    ///
    /// let clock = PeriodClock::from_state(1, bank_ledger_core_rs::Phase::Trading);
    /// assert!(clock.is_warmup());
    /// ```
    pub fn is_warmup(&self) -> bool {
        is_warmup_period(self.period)
    }
}

/// Whether `period` falls inside the warm-up window
pub fn is_warmup_period(period: usize) -> bool {
    period < WARMUP_PERIODS
}
