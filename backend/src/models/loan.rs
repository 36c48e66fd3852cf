//! Loan book model
//!
//! Each customer has one loan book: an ordered list of tranches, oldest first.
//! A tranche is one borrowing event with the rate fixed at issue. Interest
//! capitalizes into each tranche at its own rate, and repayments retire the
//! oldest tranches first.
//!
//! # Critical Invariants
//!
//! 1. Tranches stay in origination order; new credit is appended at the back
//! 2. A repayment never applies more than the total outstanding principal
//! 3. A default write-down halves every tranche and reports exactly the
//!    principal removed

use serde::{Deserialize, Serialize};

/// One borrowing event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tranche {
    /// Outstanding principal, including capitalized interest
    pub principal: f64,
    /// Per-period rate fixed when the tranche was issued
    pub rate: f64,
}

impl Tranche {
    pub fn new(principal: f64, rate: f64) -> Self {
        Self { principal, rate }
    }

    /// Interest owed on this tranche for one period
    pub fn interest_due(&self) -> f64 {
        self.principal * self.rate
    }
}

/// Result of one period's accrual and minimum-repayment check
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanOutcome {
    /// Interest accrued this period, i.e. the minimum repayment
    pub minimum_due: f64,
    /// Repayments the customer made on their own this period
    pub voluntary: f64,
    /// Amount the bank collected from the account to cover the shortfall
    pub forced: f64,
    /// Principal written off because the account could not cover the shortfall
    pub defaulted: f64,
}

impl LoanOutcome {
    pub fn is_default(&self) -> bool {
        self.defaulted > 0.0
    }
}

/// A customer's ordered collection of loan tranches
///
/// # Example
/// ```
/// use bank_ledger_core_rs::LoanBook;
///
/// let mut book = LoanBook::new();
/// book.issue(100.0, 0.1);
/// book.issue(50.0, 0.05);
///
/// let applied = book.apply_repayment(120.0);
/// assert_eq!(applied, 120.0);
/// assert_eq!(book.tranches().len(), 1);
/// assert_eq!(book.tranches()[0].principal, 30.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanBook {
    /// Outstanding tranches, oldest first
    tranches: Vec<Tranche>,

    /// Repayments counted toward this period's minimum
    repaid_this_period: f64,
}

impl LoanBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a loan book from a checkpoint
    pub fn from_parts(tranches: Vec<Tranche>, repaid_this_period: f64) -> Self {
        Self {
            tranches,
            repaid_this_period,
        }
    }

    pub fn tranches(&self) -> &[Tranche] {
        &self.tranches
    }

    pub fn repaid_this_period(&self) -> f64 {
        self.repaid_this_period
    }

    pub fn is_empty(&self) -> bool {
        self.tranches.is_empty()
    }

    /// Total outstanding principal across all tranches
    pub fn outstanding(&self) -> f64 {
        self.tranches.iter().map(|t| t.principal).sum()
    }

    /// Remove every tranche whose rate is at or above `rate`
    ///
    /// Returns the principal removed, which the caller folds into new credit.
    pub fn refinance_at_or_above(&mut self, rate: f64) -> f64 {
        let mut rolled = 0.0;
        self.tranches.retain(|t| {
            if t.rate >= rate {
                rolled += t.principal;
                false
            } else {
                true
            }
        });
        rolled
    }

    /// Append a new tranche at the back of the book
    pub fn issue(&mut self, principal: f64, rate: f64) {
        self.tranches.push(Tranche::new(principal, rate));
    }

    /// Count a repayment toward this period's minimum
    pub fn record_repayment(&mut self, amount: f64) {
        self.repaid_this_period += amount;
    }

    /// Apply a payment oldest-first
    ///
    /// Fully retires every tranche the payment covers, then reduces the first
    /// one it cannot. Returns the amount actually applied, which is less than
    /// `amount` only when the book runs out of tranches.
    pub fn apply_repayment(&mut self, amount: f64) -> f64 {
        let mut leftover = amount;
        let mut retired = 0;

        for tranche in self.tranches.iter_mut() {
            if leftover <= 0.0 {
                break;
            }
            if leftover >= tranche.principal {
                leftover -= tranche.principal;
                retired += 1;
            } else {
                tranche.principal -= leftover;
                leftover = 0.0;
            }
        }

        self.tranches.drain(..retired);
        amount - leftover
    }

    /// Capitalize one period of interest into every tranche
    ///
    /// Returns the total interest, which is the minimum repayment due.
    pub fn accrue(&mut self) -> f64 {
        let mut minimum_due = 0.0;
        for tranche in self.tranches.iter_mut() {
            let interest = tranche.interest_due();
            minimum_due += interest;
            tranche.principal += interest;
        }
        minimum_due
    }

    /// Minimum repayment still owed this period
    pub fn shortfall(&self, minimum_due: f64) -> f64 {
        minimum_due - self.repaid_this_period
    }

    /// Halve every remaining tranche
    ///
    /// Returns the principal written off.
    pub fn write_down(&mut self) -> f64 {
        let mut defaulted = 0.0;
        for tranche in self.tranches.iter_mut() {
            let half = tranche.principal / 2.0;
            tranche.principal -= half;
            defaulted += half;
        }
        defaulted
    }

    /// Clear the repayment accumulator for the next period
    pub fn reset_period(&mut self) {
        self.repaid_this_period = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outstanding_sums_tranches() {
        let book = LoanBook::from_parts(vec![Tranche::new(100.0, 0.1), Tranche::new(25.0, 0.2)], 0.0);
        assert_eq!(book.outstanding(), 125.0);
    }

    #[test]
    fn test_repayment_larger_than_book_applies_only_outstanding() {
        let mut book = LoanBook::new();
        book.issue(40.0, 0.1);
        assert_eq!(book.apply_repayment(100.0), 40.0);
        assert!(book.is_empty());
    }

    #[test]
    fn test_repayment_exactly_retires_first_tranche() {
        let mut book = LoanBook::new();
        book.issue(100.0, 0.1);
        book.issue(50.0, 0.2);
        assert_eq!(book.apply_repayment(100.0), 100.0);
        assert_eq!(book.tranches(), &[Tranche::new(50.0, 0.2)]);
    }

    #[test]
    fn test_refinance_keeps_cheaper_tranches_in_order() {
        let mut book = LoanBook::new();
        book.issue(10.0, 0.02);
        book.issue(200.0, 0.10);
        book.issue(30.0, 0.03);
        book.issue(5.0, 0.08);

        let rolled = book.refinance_at_or_above(0.08);
        assert_eq!(rolled, 205.0);
        assert_eq!(
            book.tranches(),
            &[Tranche::new(10.0, 0.02), Tranche::new(30.0, 0.03)]
        );
    }

    #[test]
    fn test_accrue_uses_each_tranche_rate() {
        let mut book = LoanBook::new();
        book.issue(100.0, 0.1);
        book.issue(200.0, 0.05);

        let due = book.accrue();
        assert!((due - 20.0).abs() < 1e-12);
        assert!((book.tranches()[0].principal - 110.0).abs() < 1e-12);
        assert!((book.tranches()[1].principal - 210.0).abs() < 1e-12);
    }

    #[test]
    fn test_write_down_halves_and_reports_removed_principal() {
        let mut book = LoanBook::new();
        book.issue(80.0, 0.1);
        book.issue(20.0, 1.5);

        let defaulted = book.write_down();
        assert_eq!(defaulted, 50.0);
        assert_eq!(book.tranches()[0].principal, 40.0);
        assert_eq!(book.tranches()[1].principal, 10.0);
        assert_eq!(book.tranches().len(), 2);
    }

    #[test]
    fn test_shortfall_and_reset() {
        let mut book = LoanBook::new();
        book.record_repayment(3.0);
        assert_eq!(book.shortfall(5.0), 2.0);
        book.reset_period();
        assert_eq!(book.repaid_this_period(), 0.0);
    }
}
