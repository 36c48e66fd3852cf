//! Bank Ledger CLI - demo economy driver
//!
//! Usage:
//! ```bash
//! bank-ledger-cli --periods 50 --households 20 --seed 7 --inflation 0.01
//! bank-ledger-cli --config bank.json --checkpoint state.json
//! RUST_LOG=debug bank-ledger-cli --periods 5
//! ```
//!
//! One store and `--households` households bank with the single bank. Each
//! period the store pays noisy wages, households keep a liquidity buffer in
//! cash and deposit the rest, then spend part of their deposits at the store
//! by transfer. From period 1 on the store pays down debt and borrows against
//! nominal demand. Every period prints one JSON line of bank reporters.

use anyhow::{Context, Result};
use bank_ledger_core_rs::{
    BankConfig, CashHolder, Customer, CustomerId, Orchestrator, RngManager,
};
use clap::Parser;
use log::info;
use std::fs;
use std::path::PathBuf;

/// Drive a toy economy through the bank ledger engine
#[derive(Parser, Debug)]
#[command(name = "bank-ledger-cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of periods to simulate
    #[arg(long, default_value_t = 50)]
    periods: usize,

    /// Number of household customers
    #[arg(long, default_value_t = 10)]
    households: usize,

    /// RNG seed for wage noise
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Per-period growth of the central price level
    #[arg(long, default_value_t = 0.0)]
    inflation: f64,

    /// Mean real wage per household per period
    #[arg(long, default_value_t = 10.0)]
    wage: f64,

    /// Share of cash households keep out of the bank
    #[arg(long, default_value_t = 0.2)]
    liquidity_preference: f64,

    /// Share of deposits households spend each period
    #[arg(long, default_value_t = 0.5)]
    propensity: f64,

    /// Bank parameters as JSON (missing fields take defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the final engine state to this file
    #[arg(long)]
    checkpoint: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> Result<BankConfig> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading bank config {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing bank config {}", path.display()))
        }
        None => Ok(BankConfig::default()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let mut price_level = config.initial_price_level;

    let mut bank = Orchestrator::new(config)?;
    let mut rng = RngManager::new(cli.seed);

    let mut store = CashHolder::new("STORE", 0.0);
    let store_id: CustomerId = store.id().clone();
    bank.open_account(&store_id)?;

    let mut households: Vec<CashHolder> = (0..cli.households)
        .map(|i| CashHolder::new(format!("HH_{}", i + 1), cli.wage * price_level))
        .collect();
    for household in &households {
        bank.open_account(household.id())?;
    }
    info!(
        "demo economy: {} households, {} periods, seed {}",
        cli.households, cli.periods, cli.seed
    );

    for _ in 0..cli.periods {
        // Wages: the store draws the bill from its account and pays in cash
        let wages: Vec<f64> = households
            .iter()
            .map(|_| rng.normal(cli.wage, cli.wage * 0.1).max(0.0) * price_level)
            .collect();
        let bill: f64 = wages.iter().sum();
        let paid = bank.withdraw(&mut store, bill)?;
        let paid_share = if bill > 0.0 { paid / bill } else { 0.0 };
        for (household, wage) in households.iter_mut().zip(&wages) {
            household.receive_cash(wage * paid_share);
        }
        store.debit_cash(paid);

        // Households bank what they do not hold as cash, then spend
        let mut ngdp = 0.0;
        for household in households.iter_mut() {
            let keep = household.cash() * cli.liquidity_preference;
            let surplus = household.cash() - keep;
            bank.deposit(household, surplus)?;
            let spend = bank.balance_of(household.id()).max(0.0) * cli.propensity;
            ngdp += bank.transfer(household.id(), &store_id, spend)?;
        }

        if bank.current_period() > 0 {
            let repayment = bank.debt_of(&store_id) / 1.5;
            bank.amortize(&store_id, repayment)?;
            let rate = bank.bank().nominal_rate();
            bank.borrow(&store_id, ngdp * (1.0 - rate))?;
        }

        let result = bank.step(&price_level)?;
        println!("{}", serde_json::to_string(&result)?);
        price_level *= 1.0 + cli.inflation;
    }

    if let Some(path) = cli.checkpoint.as_ref() {
        let state = bank.save_state()?;
        fs::write(path, state)
            .with_context(|| format!("writing checkpoint {}", path.display()))?;
        info!("checkpoint written to {}", path.display());
    }

    Ok(())
}
