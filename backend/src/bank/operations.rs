//! Balance-sheet operations
//!
//! Every operation returns the amount actually moved. Requests the books
//! cannot honour are clamped to the largest feasible amount instead of
//! failing; the only error is calling with a customer that has no account.

use crate::bank::{Bank, BankError, MIN_AMORTIZE, MIN_BORROW, RESERVE_FLOOR};
use crate::models::customer::{Customer, CustomerId};
use crate::models::ledger::LedgerRow;
use log::trace;

impl Bank {
    /// Register a customer with a zero balance and an empty loan book
    ///
    /// Returns `false` if the customer already has an account, in which case
    /// nothing changes.
    pub fn open_account(&mut self, customer_id: &CustomerId) -> bool {
        self.ledger.open(customer_id).is_some()
    }

    /// Move cash from the customer into their deposit account
    ///
    /// A negative `amount` is a withdrawal through the same path. The amount
    /// is clamped so that reserves stay above zero and so that the customer
    /// never deposits more cash than they hold.
    ///
    /// # Example
    /// ```
    /// use bank_ledger_core_rs::{Bank, BankConfig, CashHolder, Customer};
    ///
    /// let mut bank = Bank::new(BankConfig::default()).unwrap();
    /// let mut holder = CashHolder::new("HH_1", 30.0);
    /// bank.open_account(holder.id());
    ///
    /// let moved = bank.deposit(&mut holder, 50.0).unwrap();
    /// assert_eq!(moved, 30.0); // clamped to cash on hand
    /// assert_eq!(bank.reserves(), 30.0);
    /// assert_eq!(bank.balance_of(holder.id()), 30.0);
    /// assert_eq!(holder.cash(), 0.0);
    /// ```
    pub fn deposit<C: Customer + ?Sized>(
        &mut self,
        customer: &mut C,
        amount: f64,
    ) -> Result<f64, BankError> {
        let idx = self.resolve(customer.id())?;
        if amount == 0.0 || amount.is_nan() {
            return Ok(0.0);
        }

        let mut amount = amount;
        if self.reserves + amount <= 0.0 {
            let clamped = (RESERVE_FLOOR - self.reserves).min(0.0);
            trace!(
                "withdrawal of {} by {} clamped to {} to keep reserves positive",
                -amount,
                customer.id(),
                -clamped
            );
            amount = clamped;
        }

        let cash = customer.cash().max(0.0);
        if amount > cash {
            trace!("deposit of {} by {} clamped to cash on hand {}", amount, customer.id(), cash);
            amount = cash;
        }

        if amount == 0.0 {
            return Ok(0.0);
        }

        customer.debit_cash(amount);
        self.reserves += amount;
        self.ledger.row_mut(idx).balance += amount;
        Ok(amount)
    }

    /// Move cash from the deposit account to the customer
    ///
    /// Equivalent to a negative deposit. The requested amount counts toward
    /// the period's withdrawal flow unless it is not finite. Returns the
    /// amount actually paid out.
    pub fn withdraw<C: Customer + ?Sized>(
        &mut self,
        customer: &mut C,
        amount: f64,
    ) -> Result<f64, BankError> {
        let moved = self.deposit(customer, -amount)?;
        if amount.is_finite() {
            self.withdrawals_this_period += amount;
        }
        Ok(if moved == 0.0 { 0.0 } else { -moved })
    }

    /// Move deposit balance between two accounts
    ///
    /// The amount is clamped to the payer's balance; reserves are not touched.
    /// Both accounts are resolved before either is changed.
    pub fn transfer(
        &mut self,
        from: &CustomerId,
        to: &CustomerId,
        amount: f64,
    ) -> Result<f64, BankError> {
        let from_idx = self.resolve(from)?;
        let to_idx = self.resolve(to)?;
        if !(amount > 0.0) {
            return Ok(0.0);
        }

        let available = self.ledger.row(from_idx).balance;
        let amount = amount.min(available).max(0.0);
        if amount == 0.0 {
            return Ok(0.0);
        }

        self.ledger.row_mut(from_idx).balance -= amount;
        self.ledger.row_mut(to_idx).balance += amount;
        Ok(amount)
    }

    /// Extend credit at the current rate
    ///
    /// Every existing tranche priced at or above the current rate is folded
    /// into the new tranche, so customers always refinance down. The deposit
    /// account is credited with the new tranche's principal. Returns that
    /// principal, or 0 for requests below [`MIN_BORROW`].
    ///
    /// # Example
    /// ```
    /// use bank_ledger_core_rs::{Bank, BankConfig};
    ///
    /// let mut bank = Bank::new(BankConfig::default()).unwrap();
    /// let store = "STORE".into();
    /// bank.open_account(&store);
    ///
    /// assert_eq!(bank.borrow(&store, 100.0).unwrap(), 100.0);
    /// assert_eq!(bank.balance_of(&store), 100.0);
    /// assert_eq!(bank.debt_of(&store), 100.0);
    /// ```
    pub fn borrow(&mut self, customer_id: &CustomerId, amount: f64) -> Result<f64, BankError> {
        let idx = self.resolve(customer_id)?;
        if !(amount >= MIN_BORROW) {
            return Ok(0.0);
        }

        let rate = self.nominal_rate;
        let row = self.ledger.row_mut(idx);
        let principal = amount + row.loans.refinance_at_or_above(rate);
        row.loans.issue(principal, rate);
        row.balance += principal;
        Ok(principal)
    }

    /// Repay loan principal from the deposit account, oldest tranche first
    ///
    /// The requested amount counts toward this period's minimum repayment.
    /// Returns the amount actually applied, which never exceeds the
    /// outstanding principal, or 0 for requests below [`MIN_AMORTIZE`].
    pub fn amortize(&mut self, customer_id: &CustomerId, amount: f64) -> Result<f64, BankError> {
        let idx = self.resolve(customer_id)?;
        Ok(amortize_row(self.ledger.row_mut(idx), amount))
    }
}

/// Apply a repayment to one ledger row
pub(crate) fn amortize_row(row: &mut LedgerRow, amount: f64) -> f64 {
    if !(amount >= MIN_AMORTIZE) {
        return 0.0;
    }
    row.loans.record_repayment(amount);
    let applied = row.loans.apply_repayment(amount);
    row.balance -= applied;
    applied
}
