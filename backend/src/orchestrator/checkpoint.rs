//! Checkpoint - Save/Load Bank State
//!
//! Serializes the complete bank (every account, every tranche, every policy
//! scalar) plus the period clock so a run can be paused and resumed.
//!
//! # Critical Invariants
//!
//! - **Exact Resume**: a restored run produces the same periods as an
//!   uninterrupted one
//! - **Unique Accounts**: no customer id appears twice
//! - **Non-negative Reserves**: rejected on load otherwise
//! - **Config Matching**: state can only be loaded with the config it was saved with

use crate::bank::config::{validate_profit_tolerance, validate_target_reserve_ratio, BankConfig};
use crate::bank::{Bank, BankScalars};
use crate::core::period::Phase;
use crate::models::customer::CustomerId;
use crate::models::ledger::{Ledger, LedgerRow};
use crate::models::loan::{LoanBook, Tranche};
use crate::orchestrator::engine::AccrualSummary;
use crate::orchestrator::SimulationError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Complete orchestrator state snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Current period
    pub period: usize,

    /// Phase within the current period
    pub phase: Phase,

    pub bank: BankSnapshot,

    /// Accrual totals not yet reported (non-zero only in `PolicyUpdate`)
    pub accrual: AccrualSummary,

    /// SHA256 hash of the config the run was started with
    pub config_hash: String,
}

/// Bank state snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankSnapshot {
    pub reserves: f64,
    pub nominal_rate: f64,
    pub target_reserve_ratio: f64,
    pub profit_tolerance: f64,
    pub rate_smoothness: f64,
    pub withdrawals_this_period: f64,
    pub last_withdrawal_flow: f64,
    pub inflation_estimate: f64,
    pub cumulative_defaults: f64,
    pub price_level_memo: f64,
    pub last_reserves: f64,

    /// Accounts in opening order
    pub accounts: Vec<AccountSnapshot>,
}

/// Single account snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub customer_id: CustomerId,
    pub balance: f64,
    pub tranches: Vec<Tranche>,
    pub repaid_this_period: f64,
}

impl From<&LedgerRow> for AccountSnapshot {
    fn from(row: &LedgerRow) -> Self {
        AccountSnapshot {
            customer_id: row.customer_id.clone(),
            balance: row.balance,
            tranches: row.loans.tranches().to_vec(),
            repaid_this_period: row.loans.repaid_this_period(),
        }
    }
}

impl From<AccountSnapshot> for LedgerRow {
    fn from(snapshot: AccountSnapshot) -> Self {
        LedgerRow {
            customer_id: snapshot.customer_id,
            balance: snapshot.balance,
            loans: LoanBook::from_parts(snapshot.tranches, snapshot.repaid_this_period),
        }
    }
}

impl Bank {
    pub(crate) fn snapshot(&self) -> BankSnapshot {
        let s = self.scalars();
        BankSnapshot {
            reserves: s.reserves,
            nominal_rate: s.nominal_rate,
            target_reserve_ratio: s.target_reserve_ratio,
            profit_tolerance: s.profit_tolerance,
            rate_smoothness: s.rate_smoothness,
            withdrawals_this_period: s.withdrawals_this_period,
            last_withdrawal_flow: s.last_withdrawal_flow,
            inflation_estimate: s.inflation_estimate,
            cumulative_defaults: s.cumulative_defaults,
            price_level_memo: s.price_level_memo,
            last_reserves: s.last_reserves,
            accounts: self.ledger().rows().iter().map(AccountSnapshot::from).collect(),
        }
    }

    pub(crate) fn from_snapshot(snapshot: BankSnapshot) -> Result<Self, String> {
        let scalars = BankScalars {
            reserves: snapshot.reserves,
            nominal_rate: snapshot.nominal_rate,
            target_reserve_ratio: snapshot.target_reserve_ratio,
            profit_tolerance: snapshot.profit_tolerance,
            rate_smoothness: snapshot.rate_smoothness,
            withdrawals_this_period: snapshot.withdrawals_this_period,
            last_withdrawal_flow: snapshot.last_withdrawal_flow,
            inflation_estimate: snapshot.inflation_estimate,
            cumulative_defaults: snapshot.cumulative_defaults,
            price_level_memo: snapshot.price_level_memo,
            last_reserves: snapshot.last_reserves,
        };
        let rows = snapshot.accounts.into_iter().map(LedgerRow::from).collect();
        let ledger = Ledger::from_rows(rows)?;
        Ok(Bank::from_parts(scalars, ledger))
    }
}

// ============================================================================
// Config Hashing
// ============================================================================

/// Compute deterministic SHA256 hash of config
///
/// Uses canonical JSON serialization with sorted keys so the hash does not
/// depend on field order.
pub fn compute_config_hash(config: &BankConfig) -> Result<String, SimulationError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// Validation Functions
// ============================================================================

fn invalid(message: String) -> SimulationError {
    SimulationError::StateValidationError(message)
}

fn require_finite(name: &str, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{} is not finite: {}", name, value)))
    }
}

/// Validate state snapshot integrity
///
/// Checks:
/// - every amount is finite
/// - reserves and cumulative defaults are non-negative
/// - the target reserve ratio is in (0, 1] and the profit tolerance is
///   non-negative
/// - tranche principals are non-negative
/// - no customer id appears twice
pub fn validate_snapshot(snapshot: &StateSnapshot) -> Result<(), SimulationError> {
    let bank = &snapshot.bank;

    for (name, value) in [
        ("reserves", bank.reserves),
        ("nominal_rate", bank.nominal_rate),
        ("target_reserve_ratio", bank.target_reserve_ratio),
        ("profit_tolerance", bank.profit_tolerance),
        ("rate_smoothness", bank.rate_smoothness),
        ("withdrawals_this_period", bank.withdrawals_this_period),
        ("last_withdrawal_flow", bank.last_withdrawal_flow),
        ("inflation_estimate", bank.inflation_estimate),
        ("cumulative_defaults", bank.cumulative_defaults),
        ("price_level_memo", bank.price_level_memo),
        ("last_reserves", bank.last_reserves),
    ] {
        require_finite(name, value)?;
    }

    validate_target_reserve_ratio(bank.target_reserve_ratio)
        .and_then(|()| validate_profit_tolerance(bank.profit_tolerance))
        .map_err(|err| invalid(err.to_string()))?;

    if bank.reserves < 0.0 {
        return Err(invalid(format!("Negative reserves: {}", bank.reserves)));
    }
    if bank.cumulative_defaults < 0.0 {
        return Err(invalid(format!(
            "Negative cumulative defaults: {}",
            bank.cumulative_defaults
        )));
    }
    if bank.price_level_memo <= 0.0 {
        return Err(invalid(format!(
            "Non-positive price level memo: {}",
            bank.price_level_memo
        )));
    }

    let mut seen = HashSet::new();
    for account in &bank.accounts {
        if !seen.insert(&account.customer_id) {
            return Err(invalid(format!(
                "Duplicate account for customer {}",
                account.customer_id
            )));
        }

        require_finite("balance", account.balance)?;
        require_finite("repaid_this_period", account.repaid_this_period)?;
        for tranche in &account.tranches {
            require_finite("tranche principal", tranche.principal)?;
            require_finite("tranche rate", tranche.rate)?;
            if tranche.principal < 0.0 {
                return Err(invalid(format!(
                    "Negative tranche principal for customer {}: {}",
                    account.customer_id, tranche.principal
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> StateSnapshot {
        StateSnapshot {
            period: 4,
            phase: Phase::Trading,
            bank: BankSnapshot {
                reserves: 30.0,
                nominal_rate: 0.08,
                target_reserve_ratio: 0.25,
                profit_tolerance: 0.01,
                rate_smoothness: 1.5,
                withdrawals_this_period: 0.0,
                last_withdrawal_flow: 12.0,
                inflation_estimate: 0.01,
                cumulative_defaults: 5.0,
                price_level_memo: 52.0,
                last_reserves: 28.0,
                accounts: vec![
                    AccountSnapshot {
                        customer_id: "HH_1".into(),
                        balance: 30.0,
                        tranches: vec![],
                        repaid_this_period: 0.0,
                    },
                    AccountSnapshot {
                        customer_id: "STORE".into(),
                        balance: 100.0,
                        tranches: vec![Tranche::new(100.0, 0.08)],
                        repaid_this_period: 0.0,
                    },
                ],
            },
            accrual: AccrualSummary::default(),
            config_hash: compute_config_hash(&BankConfig::default()).unwrap(),
        }
    }

    #[test]
    fn test_compute_config_hash_deterministic() {
        let hash1 = compute_config_hash(&BankConfig::default()).unwrap();
        let hash2 = compute_config_hash(&BankConfig::default()).unwrap();

        assert_eq!(hash1, hash2, "Same config should produce same hash");
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_compute_config_hash_different_for_different_configs() {
        let config = BankConfig {
            target_reserve_ratio: 0.1,
            ..Default::default()
        };

        assert_ne!(
            compute_config_hash(&config).unwrap(),
            compute_config_hash(&BankConfig::default()).unwrap(),
            "Different configs should produce different hashes"
        );
    }

    #[test]
    fn test_valid_snapshot_passes() {
        assert!(validate_snapshot(&snapshot()).is_ok());
    }

    #[test]
    fn test_duplicate_account_rejected() {
        let mut snap = snapshot();
        let duplicate = snap.bank.accounts[0].clone();
        snap.bank.accounts.push(duplicate);

        let err = validate_snapshot(&snap).unwrap_err();
        assert!(matches!(err, SimulationError::StateValidationError(_)));
        assert!(err.to_string().contains("HH_1"));
    }

    #[test]
    fn test_negative_reserves_rejected() {
        let mut snap = snapshot();
        snap.bank.reserves = -1.0;
        assert!(validate_snapshot(&snap).is_err());
    }

    #[test]
    fn test_non_finite_balance_rejected() {
        let mut snap = snapshot();
        snap.bank.accounts[1].balance = f64::NAN;
        assert!(validate_snapshot(&snap).is_err());
    }

    #[test]
    fn test_bank_snapshot_restores_ledger() {
        let snap = snapshot();
        let bank = Bank::from_snapshot(snap.bank.clone()).unwrap();

        assert_eq!(bank.num_accounts(), 2);
        assert_eq!(bank.debt_of(&"STORE".into()), 100.0);
        assert_eq!(bank.reserves(), 30.0);
        assert_eq!(bank.snapshot(), snap.bank);
    }
}
