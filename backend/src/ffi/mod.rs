//! Python bindings (enabled with the `pyo3` feature)
//!
//! The ABM side of a model drives the bank through `PyBank`. Customer cash
//! stays on the Python side: deposit and withdraw take the customer's cash
//! and hand back the updated figure.

pub mod bank;
pub mod types;
