//! Loan book tests: FIFO repayment, refinancing, accrual and default

use approx::assert_abs_diff_eq;
use bank_ledger_core_rs::{
    Bank, BankConfig, CashHolder, Customer, CustomerId, Event, LoanBook, Orchestrator, Tranche,
};

// ============================================================================
// LoanBook
// ============================================================================

#[test]
fn test_fifo_repayment_order() {
    let mut book = LoanBook::from_parts(
        vec![Tranche::new(100.0, 0.10), Tranche::new(50.0, 0.05)],
        0.0,
    );

    let applied = book.apply_repayment(120.0);

    assert_eq!(applied, 120.0);
    assert_eq!(book.tranches(), &[Tranche::new(30.0, 0.05)]);
}

#[test]
fn test_repayment_beyond_outstanding_is_capped() {
    let mut book = LoanBook::from_parts(vec![Tranche::new(40.0, 0.1)], 0.0);
    assert_eq!(book.apply_repayment(100.0), 40.0);
    assert!(book.is_empty());
}

#[test]
fn test_accrual_capitalizes_at_tranche_rate() {
    let mut book = LoanBook::from_parts(
        vec![Tranche::new(100.0, 0.10), Tranche::new(200.0, 0.05)],
        0.0,
    );

    let minimum = book.accrue();

    assert_abs_diff_eq!(minimum, 20.0, epsilon = 1e-9);
    assert_abs_diff_eq!(book.tranches()[0].principal, 110.0, epsilon = 1e-9);
    assert_abs_diff_eq!(book.tranches()[1].principal, 210.0, epsilon = 1e-9);
    assert_eq!(book.tranches()[1].rate, 0.05);
}

#[test]
fn test_write_down_halves_every_tranche() {
    let mut book = LoanBook::from_parts(
        vec![Tranche::new(80.0, 0.10), Tranche::new(20.0, 0.05)],
        0.0,
    );

    assert_eq!(book.write_down(), 50.0);
    assert_eq!(book.outstanding(), 50.0);
    assert_eq!(book.tranches()[0].principal, 40.0);
}

// ============================================================================
// Borrow and Amortize through the Bank
// ============================================================================

#[test]
fn test_refinance_folds_higher_rate_tranche() {
    let mut bank = Bank::new(BankConfig::default()).unwrap();
    let id: CustomerId = "STORE".into();
    bank.open_account(&id);

    bank.borrow(&id, 200.0).unwrap(); // at 0.10
    bank.set_real_rate(0.08).unwrap();

    let borrowed = bank.borrow(&id, 50.0).unwrap();

    assert_eq!(borrowed, 250.0);
    assert_eq!(bank.tranches(&id), &[Tranche::new(250.0, 0.08)]);
}

#[test]
fn test_cheaper_tranche_survives_refinancing() {
    let mut bank = Bank::new(BankConfig {
        initial_rate: 0.05,
        ..Default::default()
    })
    .unwrap();
    let id: CustomerId = "STORE".into();
    bank.open_account(&id);

    bank.borrow(&id, 100.0).unwrap(); // at 0.05
    bank.set_real_rate(0.08).unwrap();
    assert_eq!(bank.borrow(&id, 10.0).unwrap(), 10.0);

    assert_eq!(
        bank.tranches(&id),
        &[Tranche::new(100.0, 0.05), Tranche::new(10.0, 0.08)]
    );
}

#[test]
fn test_tiny_requests_are_ignored() {
    let mut bank = Bank::new(BankConfig::default()).unwrap();
    let id: CustomerId = "STORE".into();
    bank.open_account(&id);

    assert_eq!(bank.borrow(&id, 0.001).unwrap(), 0.0);
    bank.borrow(&id, 10.0).unwrap();
    assert_eq!(bank.amortize(&id, 0.0001).unwrap(), 0.0);
    assert_eq!(bank.debt_of(&id), 10.0);
}

// ============================================================================
// Accrual phase
// ============================================================================

#[test]
fn test_voluntary_repayment_avoids_forced_collection() {
    let mut orchestrator = Orchestrator::new(BankConfig::default()).unwrap();
    let id: CustomerId = "STORE".into();
    orchestrator.open_account(&id).unwrap();
    orchestrator.borrow(&id, 100.0).unwrap();
    orchestrator.amortize(&id, 20.0).unwrap();

    let result = orchestrator.step(&50.0).unwrap();

    // 80 outstanding accrues 8; 20 already repaid this period covers it
    assert_eq!(result.forced_repayments, 0.0);
    assert_eq!(result.num_defaults, 0);
    assert_abs_diff_eq!(orchestrator.debt_of(&id), 88.0, epsilon = 1e-9);
}

#[test]
fn test_shortfall_collected_from_account() {
    let mut orchestrator = Orchestrator::new(BankConfig::default()).unwrap();
    let id: CustomerId = "STORE".into();
    orchestrator.open_account(&id).unwrap();
    orchestrator.borrow(&id, 100.0).unwrap();

    let result = orchestrator.step(&50.0).unwrap();

    assert_abs_diff_eq!(result.forced_repayments, 10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(result.interest_accrued, 10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(orchestrator.debt_of(&id), 100.0, epsilon = 1e-9);
    let forced = orchestrator.event_log().events_of_type("ForcedRepayment");
    assert_eq!(forced.len(), 1);
}

#[test]
fn test_insolvent_customer_defaults() {
    let mut orchestrator = Orchestrator::new(BankConfig::default()).unwrap();
    let debtor: CustomerId = "DEBTOR".into();
    let mut payee = CashHolder::new("PAYEE", 0.0);
    orchestrator.open_account(&debtor).unwrap();
    orchestrator.open_account(payee.id()).unwrap();

    orchestrator.borrow(&debtor, 100.0).unwrap();
    orchestrator.transfer(&debtor, payee.id(), 96.0).unwrap();
    assert_eq!(orchestrator.deposit(&mut payee, 1.0).unwrap(), 0.0);

    let result = orchestrator.step(&50.0).unwrap();

    // Debt 110 after accrual, 4 collected, remaining 106 halved
    assert_eq!(result.num_defaults, 1);
    assert_abs_diff_eq!(result.forced_repayments, 4.0, epsilon = 1e-9);
    assert_abs_diff_eq!(result.defaulted, 53.0, epsilon = 1e-9);
    assert_abs_diff_eq!(orchestrator.debt_of(&debtor), 53.0, epsilon = 1e-9);
    assert_abs_diff_eq!(orchestrator.bank().cumulative_defaults(), 53.0, epsilon = 1e-9);

    let defaults = orchestrator.event_log().events_of_type("Default");
    assert_eq!(defaults.len(), 1);
    match defaults[0] {
        Event::Default {
            customer_id,
            written_off,
            period,
        } => {
            assert_eq!(customer_id, &debtor);
            assert_eq!(*period, 0);
            assert_abs_diff_eq!(*written_off, 53.0, epsilon = 1e-9);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn test_cumulative_defaults_never_decrease() {
    let mut orchestrator = Orchestrator::new(BankConfig::default()).unwrap();
    let debtor: CustomerId = "DEBTOR".into();
    let sink: CustomerId = "SINK".into();
    orchestrator.open_account(&debtor).unwrap();
    orchestrator.open_account(&sink).unwrap();
    orchestrator.borrow(&debtor, 100.0).unwrap();
    orchestrator.transfer(&debtor, &sink, 100.0).unwrap();

    let mut last = 0.0;
    for _ in 0..10 {
        let result = orchestrator.step(&50.0).unwrap();
        assert!(result.cumulative_defaults >= last);
        last = result.cumulative_defaults;
    }
    assert!(last > 0.0);
}
