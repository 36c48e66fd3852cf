//! End-of-period bank policy
//!
//! Two steps run after trading closes, in this order:
//!
//! 1. **Loan books** (`Accrual` phase): every tranche capitalizes one period
//!    of interest at its own rate. Customers who repaid less than that
//!    interest have the shortfall collected from their deposit account; if
//!    the account cannot cover it, the account is drained and every tranche
//!    is halved (default).
//! 2. **Policy update** (`PolicyUpdate` phase): profit above tolerance is
//!    paid to depositors pro rata, the inflation estimate decays toward the
//!    latest price change, and the nominal rate moves toward the rate that
//!    would restore the target reserve ratio.
//!
//! ```text
//! target = rate × target_ratio / reserve_ratio
//!        × (1 + Δreserves_real / 20^smoothness)      (after warm-up)
//! rate   = (24 × rate + target) / 25
//! rate   ∈ [max(0.005, π + 0.005), 1 + π]
//! ```

use crate::bank::operations::amortize_row;
use crate::bank::Bank;
use crate::core::period::is_warmup_period;
use crate::models::customer::CustomerId;
use crate::models::loan::LoanOutcome;
use log::debug;
use serde::{Deserialize, Serialize};

/// Weight of history in the inflation estimate (20-period decay)
const INFLATION_DECAY: f64 = 20.0;

/// Weight of the old rate against one part of the target rate
const RATE_STICKINESS: f64 = 24.0;

/// Base of the reserve-momentum damping term
const MOMENTUM_BASE: f64 = 20.0;

/// Real-rate ceiling (100% per period)
const REAL_RATE_CEILING: f64 = 1.0;

/// Lowest real rate allowed
const REAL_RATE_FLOOR: f64 = 0.005;

/// Lowest nominal rate allowed
const NOMINAL_RATE_FLOOR: f64 = 0.005;

/// Summary of one policy update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyOutcome {
    /// Profit paid out to depositors (0 if within tolerance)
    pub profit_disbursed: f64,
    /// Observed price growth, `None` during warm-up
    pub raw_inflation: Option<f64>,
    /// Rate the controller steered toward before stickiness and bounds
    pub target_rate: f64,
    pub previous_rate: f64,
    pub new_rate: f64,
}

/// Apply the rate ceiling and floors, in that order
pub fn bound_rate(rate: f64, inflation: f64) -> f64 {
    let mut rate = rate;
    if rate > REAL_RATE_CEILING + inflation {
        rate = REAL_RATE_CEILING + inflation;
    }
    if rate < inflation + REAL_RATE_FLOOR {
        rate = inflation + REAL_RATE_FLOOR;
    }
    if rate < NOMINAL_RATE_FLOOR {
        rate = NOMINAL_RATE_FLOOR;
    }
    rate
}

impl Bank {
    /// Accrue interest and enforce minimum repayment on every loan book
    ///
    /// Returns the outcome for every customer that carried debt into the
    /// period, in registration order.
    pub(crate) fn step_loan_books(&mut self) -> Vec<(CustomerId, LoanOutcome)> {
        let mut outcomes = Vec::new();
        let mut written_off = 0.0;

        for row in self.ledger.rows_mut() {
            if row.loans.is_empty() {
                row.loans.reset_period();
                continue;
            }

            let voluntary = row.loans.repaid_this_period();
            let minimum_due = row.loans.accrue();
            let shortfall = row.loans.shortfall(minimum_due);

            let mut forced = 0.0;
            let mut defaulted = 0.0;
            if shortfall > 0.0 {
                let available = row.balance.max(0.0);
                let insolvent = shortfall > available;
                let charge = if insolvent { available } else { shortfall };
                forced = amortize_row(row, charge);

                if insolvent {
                    defaulted = row.loans.write_down();
                    written_off += defaulted;
                    debug!(
                        "{} defaulted: shortfall {:.4}, balance {:.4}, wrote off {:.4}",
                        row.customer_id, shortfall, available, defaulted
                    );
                }
            }

            row.loans.reset_period();
            outcomes.push((
                row.customer_id.clone(),
                LoanOutcome {
                    minimum_due,
                    voluntary,
                    forced,
                    defaulted,
                },
            ));
        }

        self.cumulative_defaults += written_off;
        outcomes
    }

    /// Distribute profit, update the inflation estimate and reset the rate
    ///
    /// `period` is the index of the period being closed; the inflation and
    /// reserve-momentum terms are skipped during warm-up.
    pub(crate) fn step_policy(&mut self, period: usize, price_level: f64) -> PolicyOutcome {
        self.last_withdrawal_flow = self.withdrawals_this_period;
        self.withdrawals_this_period = 0.0;

        let profit_disbursed = self.distribute_profit();
        let warmup = is_warmup_period(period);

        let raw_inflation = if warmup {
            None
        } else {
            let raw = price_level / self.price_level_memo - 1.0;
            self.price_level_memo = price_level;
            self.inflation_estimate =
                ((INFLATION_DECAY - 1.0) * self.inflation_estimate + raw) / INFLATION_DECAY;
            Some(raw)
        };

        let previous_rate = self.nominal_rate;
        let reserve_ratio = self.reserve_ratio();
        let mut target_rate = if reserve_ratio > 0.0 {
            previous_rate * self.target_reserve_ratio / reserve_ratio
        } else {
            REAL_RATE_CEILING + self.inflation_estimate
        };

        if !warmup {
            let delta_reserves = (self.last_reserves - self.reserves) / price_level;
            target_rate *= 1.0 + delta_reserves / MOMENTUM_BASE.powf(self.rate_smoothness);
        }

        let sticky = (previous_rate * RATE_STICKINESS + target_rate) / (RATE_STICKINESS + 1.0);
        self.last_reserves = self.reserves;
        self.nominal_rate = bound_rate(sticky, self.inflation_estimate);

        debug!(
            "period {}: rate {:.5} -> {:.5} (target {:.5}, reserve ratio {:.4}, inflation {:.5})",
            period, previous_rate, self.nominal_rate, target_rate, reserve_ratio, self.inflation_estimate
        );

        PolicyOutcome {
            profit_disbursed,
            raw_inflation,
            target_rate,
            previous_rate,
            new_rate: self.nominal_rate,
        }
    }

    /// Pay the asset/liability gap to depositors in proportion to balances
    ///
    /// Returns the amount paid, 0 if the gap is within tolerance or there are
    /// no liabilities to share it over.
    fn distribute_profit(&mut self) -> f64 {
        let liabilities = self.total_liabilities();
        let profit = self.total_assets() - liabilities;
        if profit <= self.profit_tolerance || liabilities <= 0.0 {
            return 0.0;
        }

        debug!("disbursing profit of {:.4} over liabilities of {:.4}", profit, liabilities);
        let share = profit / liabilities;
        for row in self.ledger.rows_mut() {
            row.balance += share * row.balance;
        }
        profit
    }
}
