//! Conversions between engine results and Python objects

use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::orchestrator::{PeriodResult, SimulationError};

/// Map engine errors onto the closest Python exception
pub fn to_py_err(err: SimulationError) -> PyErr {
    match err {
        SimulationError::CustomerNotFound(_) => PyKeyError::new_err(err.to_string()),
        SimulationError::InvalidConfig(_)
        | SimulationError::InvalidPriceLevel(_)
        | SimulationError::DeserializationError(_)
        | SimulationError::ConfigMismatch { .. }
        | SimulationError::StateValidationError(_) => PyValueError::new_err(err.to_string()),
        SimulationError::WrongPhase { .. } | SimulationError::SerializationError(_) => {
            PyRuntimeError::new_err(err.to_string())
        }
    }
}

pub fn period_result_to_py(py: Python<'_>, result: &PeriodResult) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("period", result.period)?;
    dict.set_item("num_defaults", result.num_defaults)?;
    dict.set_item("defaulted", result.defaulted)?;
    dict.set_item("forced_repayments", result.forced_repayments)?;
    dict.set_item("interest_accrued", result.interest_accrued)?;
    dict.set_item("profit_disbursed", result.profit_disbursed)?;
    dict.set_item("nominal_rate", result.nominal_rate)?;
    dict.set_item("real_rate", result.real_rate)?;
    dict.set_item("inflation_estimate", result.inflation_estimate)?;
    dict.set_item("reserves", result.reserves)?;
    dict.set_item("reserve_ratio", result.reserve_ratio)?;
    dict.set_item("outstanding_debt", result.outstanding_debt)?;
    dict.set_item("cumulative_defaults", result.cumulative_defaults)?;
    dict.set_item("withdrawal_flow", result.withdrawal_flow)?;
    Ok(dict.unbind())
}
