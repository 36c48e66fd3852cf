//! Domain models for the bank ledger

pub mod customer;
pub mod event;
pub mod ledger;
pub mod loan;

// Re-exports
pub use customer::{CashHolder, Customer, CustomerId};
pub use event::{Event, EventLog};
pub use ledger::{AccountIndex, Ledger, LedgerRow};
pub use loan::{LoanBook, LoanOutcome, Tranche};
