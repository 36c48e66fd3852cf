//! PyO3 wrapper for the orchestrator
//!
//! # Example (from Python)
//!
//! ```python
//! from bank_ledger_core_rs import Bank
//!
//! bank = Bank('{"target_reserve_ratio": 0.2}')
//! bank.open_account("HH_1")
//! bank.open_account("STORE")
//!
//! moved, cash = bank.deposit("HH_1", 80.0, 100.0)
//! bank.transfer("HH_1", "STORE", 30.0)
//! bank.borrow("STORE", 50.0)
//!
//! result = bank.step(price_level=50.0)
//! print(result["nominal_rate"], result["reserve_ratio"])
//! ```

use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::types::{period_result_to_py, to_py_err};
use crate::bank::BankConfig;
use crate::models::customer::{CashHolder, Customer, CustomerId};
use crate::orchestrator::{Orchestrator, SimulationError};

fn parse_config(config_json: Option<&str>) -> PyResult<BankConfig> {
    match config_json {
        Some(json) => serde_json::from_str(json).map_err(|e| {
            to_py_err(SimulationError::InvalidConfig(format!(
                "Failed to parse bank config: {}",
                e
            )))
        }),
        None => Ok(BankConfig::default()),
    }
}

/// Python handle to the single bank of a run
#[pyclass(name = "Bank")]
pub struct PyBank {
    inner: Orchestrator,
}

#[pymethods]
impl PyBank {
    /// Create a bank from an optional JSON config string
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = parse_config(config_json)?;
        let inner = Orchestrator::new(config).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    fn open_account(&mut self, customer_id: &str) -> PyResult<bool> {
        self.inner
            .open_account(&CustomerId::from(customer_id))
            .map_err(to_py_err)
    }

    fn is_registered(&self, customer_id: &str) -> bool {
        self.inner.bank().is_registered(&CustomerId::from(customer_id))
    }

    fn balance_of(&self, customer_id: &str) -> f64 {
        self.inner.balance_of(&CustomerId::from(customer_id))
    }

    fn debt_of(&self, customer_id: &str) -> f64 {
        self.inner.debt_of(&CustomerId::from(customer_id))
    }

    /// Deposit from the customer's cash; returns `(moved, cash_after)`
    fn deposit(&mut self, customer_id: &str, amount: f64, cash: f64) -> PyResult<(f64, f64)> {
        let mut holder = CashHolder::new(customer_id, cash);
        let moved = self.inner.deposit(&mut holder, amount).map_err(to_py_err)?;
        Ok((moved, holder.cash()))
    }

    /// Withdraw to the customer's cash; returns `(paid, cash_after)`
    fn withdraw(&mut self, customer_id: &str, amount: f64, cash: f64) -> PyResult<(f64, f64)> {
        let mut holder = CashHolder::new(customer_id, cash);
        let paid = self.inner.withdraw(&mut holder, amount).map_err(to_py_err)?;
        Ok((paid, holder.cash()))
    }

    fn transfer(&mut self, from_id: &str, to_id: &str, amount: f64) -> PyResult<f64> {
        self.inner
            .transfer(&CustomerId::from(from_id), &CustomerId::from(to_id), amount)
            .map_err(to_py_err)
    }

    fn borrow(&mut self, customer_id: &str, amount: f64) -> PyResult<f64> {
        self.inner
            .borrow(&CustomerId::from(customer_id), amount)
            .map_err(to_py_err)
    }

    fn amortize(&mut self, customer_id: &str, amount: f64) -> PyResult<f64> {
        self.inner
            .amortize(&CustomerId::from(customer_id), amount)
            .map_err(to_py_err)
    }

    /// Close the period against the given price level
    fn step(&mut self, py: Python<'_>, price_level: f64) -> PyResult<Py<PyDict>> {
        let result = self.inner.step(&price_level).map_err(to_py_err)?;
        period_result_to_py(py, &result)
    }

    // ========================================================================
    // Reporters
    // ========================================================================

    fn current_period(&self) -> usize {
        self.inner.current_period()
    }

    fn reserves(&self) -> f64 {
        self.inner.bank().reserves()
    }

    fn total_assets(&self) -> f64 {
        self.inner.bank().total_assets()
    }

    fn total_liabilities(&self) -> f64 {
        self.inner.bank().total_liabilities()
    }

    fn outstanding_debt(&self) -> f64 {
        self.inner.bank().outstanding_debt()
    }

    fn reserve_ratio(&self) -> f64 {
        self.inner.bank().reserve_ratio()
    }

    fn nominal_rate(&self) -> f64 {
        self.inner.bank().nominal_rate()
    }

    fn real_rate(&self) -> f64 {
        self.inner.bank().real_rate()
    }

    fn inflation_estimate(&self) -> f64 {
        self.inner.bank().inflation_estimate()
    }

    fn cumulative_defaults(&self) -> f64 {
        self.inner.bank().cumulative_defaults()
    }

    fn last_withdrawal_flow(&self) -> f64 {
        self.inner.bank().last_withdrawal_flow()
    }

    fn set_real_rate(&mut self, real_rate: f64) -> PyResult<()> {
        self.inner.set_real_rate(real_rate).map_err(to_py_err)
    }

    fn set_target_reserve_ratio(&mut self, ratio: f64) -> PyResult<()> {
        self.inner.set_target_reserve_ratio(ratio).map_err(to_py_err)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    fn save_state(&self) -> PyResult<String> {
        self.inner.save_state().map_err(to_py_err)
    }

    /// Restore a bank saved with `save_state` under the same config
    #[staticmethod]
    #[pyo3(signature = (state_json, config_json=None))]
    fn load_state(state_json: &str, config_json: Option<&str>) -> PyResult<Self> {
        let config = parse_config(config_json)?;
        let inner = Orchestrator::load_state(config, state_json).map_err(to_py_err)?;
        Ok(Self { inner })
    }
}
