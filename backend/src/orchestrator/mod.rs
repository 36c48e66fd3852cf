//! Orchestrator - period loop around the bank
//!
//! Owns the bank, the period clock and the event log. See `engine.rs` for
//! phase handling and `checkpoint.rs` for save/load.

pub mod checkpoint;
pub mod engine;

pub use engine::{AccrualSummary, Orchestrator, PeriodResult, PriceReference, SimulationError};

pub use checkpoint::{AccountSnapshot, BankSnapshot, StateSnapshot};
