//! Bank Ledger Core - Rust Engine
//!
//! Fractional-reserve bank and credit ledger for agent-based macro models.
//! One bank per run holds cash reserves, customer deposits and loan
//! tranches, and resets its interest rate every period.
//!
//! # Architecture
//!
//! - **core**: Period clock and phases
//! - **models**: Domain types (CustomerId, LoanBook, Ledger, Event)
//! - **bank**: Balance-sheet operations and the rate policy
//! - **orchestrator**: Phase-ordered period loop and checkpoints
//! - **rng**: Deterministic random numbers for drivers
//!
//! # Critical Invariants
//!
//! 1. Reserves never go negative
//! 2. Transfers move liabilities only
//! 3. Every period loop visits accounts in registration order
//! 4. FFI boundary is minimal and safe

pub mod bank;
pub mod core;
pub mod models;
pub mod orchestrator;
pub mod rng;

pub use bank::{Bank, BankConfig, BankError, PolicyOutcome};
pub use core::period::{PeriodClock, Phase};
pub use models::{
    customer::{CashHolder, Customer, CustomerId},
    event::{Event, EventLog},
    ledger::{AccountIndex, Ledger, LedgerRow},
    loan::{LoanBook, LoanOutcome, Tranche},
};
pub use orchestrator::{
    AccrualSummary, Orchestrator, PeriodResult, PriceReference, SimulationError, StateSnapshot,
};
pub use rng::RngManager;

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn bank_ledger_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::bank::PyBank>()?;
    Ok(())
}
