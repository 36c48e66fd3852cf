//! Customer capability
//!
//! The bank never owns its customers. It only needs two things from them:
//! a stable identifier to find their ledger row, and access to the cash they
//! hold outside the bank (the money that moves on deposit and withdrawal).
//!
//! Whatever agent type the behavior layer uses implements [`Customer`];
//! [`CashHolder`] is the plain implementation used by the demo driver, the
//! FFI layer and tests.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable external identifier of a bank customer (e.g., "HH_007")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CustomerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CustomerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// What the bank can see and touch of a customer
pub trait Customer {
    /// Identifier used as the ledger lookup key
    fn id(&self) -> &CustomerId;

    /// Cash on hand, held outside the bank
    fn cash(&self) -> f64;

    /// Remove `amount` of cash from the customer
    ///
    /// A negative amount hands cash to the customer (a withdrawal).
    fn debit_cash(&mut self, amount: f64);
}

/// A customer that is nothing but an id and a cash balance
///
/// # Example
/// ```
/// use bank_ledger_core_rs::{CashHolder, Customer};
///
/// let mut holder = CashHolder::new("HH_001", 100.0);
/// holder.debit_cash(40.0);
/// assert_eq!(holder.cash(), 60.0);
///
/// holder.debit_cash(-15.0); // withdrawal
/// assert_eq!(holder.cash(), 75.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashHolder {
    id: CustomerId,
    cash: f64,
}

impl CashHolder {
    pub fn new(id: impl Into<CustomerId>, cash: f64) -> Self {
        Self {
            id: id.into(),
            cash,
        }
    }

    /// Hand cash to the holder from outside the banking system (wages, transfers)
    pub fn receive_cash(&mut self, amount: f64) {
        self.cash += amount;
    }
}

impl Customer for CashHolder {
    fn id(&self) -> &CustomerId {
        &self.id
    }

    fn cash(&self) -> f64 {
        self.cash
    }

    fn debit_cash(&mut self, amount: f64) {
        self.cash -= amount;
    }
}
