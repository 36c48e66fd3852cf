//! Ledger arena
//!
//! All customer accounts live in one dense vector of ledger rows. A row is
//! created at registration and never removed, so its [`AccountIndex`] stays
//! valid for the whole run. Customer ids are resolved to an index once per
//! call; the per-period loops walk the vector directly.
//!
//! # Critical Invariants
//!
//! 1. **One Row Per Customer**: each `CustomerId` maps to exactly one row
//! 2. **Atomic Registration**: the deposit account and the loan book of a
//!    customer are created together, in the same row
//! 3. **Stable Order**: rows iterate in registration order

use crate::models::customer::CustomerId;
use crate::models::loan::LoanBook;
use std::collections::HashMap;

/// Dense index of a ledger row, assigned at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountIndex(usize);

impl AccountIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

/// A customer's deposit account (bank liability) and loan book (bank asset)
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub customer_id: CustomerId,
    /// Deposit balance owed to the customer
    pub balance: f64,
    /// Credit extended to the customer
    pub loans: LoanBook,
}

impl LedgerRow {
    fn open(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            balance: 0.0,
            loans: LoanBook::new(),
        }
    }
}

/// Arena of ledger rows keyed by customer id
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    rows: Vec<LedgerRow>,
    index: HashMap<CustomerId, AccountIndex>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from rows in registration order
    ///
    /// # Errors
    ///
    /// Returns a message naming the first duplicated customer id.
    pub fn from_rows(rows: Vec<LedgerRow>) -> Result<Self, String> {
        let mut index = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if index.insert(row.customer_id.clone(), AccountIndex(i)).is_some() {
                return Err(format!("Duplicate customer id: {}", row.customer_id));
            }
        }
        Ok(Self { rows, index })
    }

    /// Register a customer with a zero balance and an empty loan book
    ///
    /// Returns `None` if the customer already has a row; the existing row is
    /// left untouched.
    pub fn open(&mut self, customer_id: &CustomerId) -> Option<AccountIndex> {
        if self.index.contains_key(customer_id) {
            return None;
        }
        let idx = AccountIndex(self.rows.len());
        self.rows.push(LedgerRow::open(customer_id.clone()));
        self.index.insert(customer_id.clone(), idx);
        Some(idx)
    }

    pub fn index_of(&self, customer_id: &CustomerId) -> Option<AccountIndex> {
        self.index.get(customer_id).copied()
    }

    pub fn contains(&self, customer_id: &CustomerId) -> bool {
        self.index.contains_key(customer_id)
    }

    pub fn row(&self, idx: AccountIndex) -> &LedgerRow {
        &self.rows[idx.0]
    }

    pub fn row_mut(&mut self, idx: AccountIndex) -> &mut LedgerRow {
        &mut self.rows[idx.0]
    }

    pub fn get(&self, customer_id: &CustomerId) -> Option<&LedgerRow> {
        self.index_of(customer_id).map(|idx| self.row(idx))
    }

    pub fn rows(&self) -> &[LedgerRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [LedgerRow] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of all deposit balances
    pub fn total_deposits(&self) -> f64 {
        self.rows.iter().map(|r| r.balance).sum()
    }

    /// Sum of all outstanding loan principal
    pub fn total_loans(&self) -> f64 {
        self.rows.iter().map(|r| r.loans.outstanding()).sum()
    }
}
