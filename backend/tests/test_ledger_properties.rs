//! Property tests for the ledger invariants
//!
//! Random operation sequences against a small economy; every invariant is
//! checked after every call.

use bank_ledger_core_rs::{
    BankConfig, CashHolder, Customer, CustomerId, LoanBook, Orchestrator, Tranche,
};
use proptest::prelude::*;

const CUSTOMERS: usize = 4;
const EPS: f64 = 1e-9;

#[derive(Debug, Clone)]
enum Op {
    Deposit(usize, f64),
    Withdraw(usize, f64),
    Transfer(usize, usize, f64),
    Borrow(usize, f64),
    Amortize(usize, f64),
    Step(f64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..CUSTOMERS, -50.0..300.0f64).prop_map(|(c, a)| Op::Deposit(c, a)),
        (0..CUSTOMERS, 0.0..300.0f64).prop_map(|(c, a)| Op::Withdraw(c, a)),
        (0..CUSTOMERS, 0..CUSTOMERS, -20.0..300.0f64).prop_map(|(a, b, x)| Op::Transfer(a, b, x)),
        (0..CUSTOMERS, 0.0..300.0f64).prop_map(|(c, a)| Op::Borrow(c, a)),
        (0..CUSTOMERS, 0.0..300.0f64).prop_map(|(c, a)| Op::Amortize(c, a)),
        (0.9..1.2f64).prop_map(Op::Step),
    ]
}

fn economy() -> (Orchestrator, Vec<CashHolder>) {
    let mut orchestrator = Orchestrator::new(BankConfig::default()).unwrap();
    let customers: Vec<CashHolder> = (0..CUSTOMERS)
        .map(|i| CashHolder::new(format!("C{}", i), 500.0))
        .collect();
    for customer in &customers {
        orchestrator.open_account(customer.id()).unwrap();
    }
    (orchestrator, customers)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPS * (1.0 + a.abs().max(b.abs()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_ledger_invariants_hold_for_any_sequence(ops in prop::collection::vec(op(), 1..80)) {
        let (mut orchestrator, mut customers) = economy();
        let mut price = 50.0;

        for op in ops {
            match op {
                Op::Deposit(c, amount) => {
                    orchestrator.deposit(&mut customers[c], amount).unwrap();
                }
                Op::Withdraw(c, amount) => {
                    let paid = orchestrator.withdraw(&mut customers[c], amount).unwrap();
                    prop_assert!(paid <= amount + EPS);
                }
                Op::Transfer(a, b, amount) => {
                    let (ida, idb) = (customers[a].id().clone(), customers[b].id().clone());
                    let before = orchestrator.balance_of(&ida) + orchestrator.balance_of(&idb);
                    let reserves = orchestrator.bank().reserves();
                    orchestrator.transfer(&ida, &idb, amount).unwrap();
                    let after = orchestrator.balance_of(&ida) + orchestrator.balance_of(&idb);
                    prop_assert!(close(before, after), "transfer changed {} -> {}", before, after);
                    prop_assert_eq!(orchestrator.bank().reserves(), reserves);
                }
                Op::Borrow(c, amount) => {
                    let id = customers[c].id().clone();
                    let balance = orchestrator.balance_of(&id);
                    let debt = orchestrator.debt_of(&id);
                    let borrowed = orchestrator.borrow(&id, amount).unwrap();
                    prop_assert!(close(orchestrator.balance_of(&id) - balance, borrowed));
                    let new_credit = if borrowed > 0.0 { amount } else { 0.0 };
                    prop_assert!(close(orchestrator.debt_of(&id) - debt, new_credit));
                }
                Op::Amortize(c, amount) => {
                    let id = customers[c].id().clone();
                    let outstanding = orchestrator.debt_of(&id);
                    let applied = orchestrator.amortize(&id, amount).unwrap();
                    prop_assert!(applied <= amount.min(outstanding) + EPS);
                    prop_assert!(applied >= 0.0);
                }
                Op::Step(growth) => {
                    price *= growth;
                    let result = orchestrator.step(&price).unwrap();
                    let inflation = result.inflation_estimate;
                    prop_assert!(result.nominal_rate <= 1.0 + inflation + EPS);
                    prop_assert!(result.nominal_rate >= (inflation + 0.005).max(0.005) - EPS);
                }
            }
            prop_assert!(orchestrator.bank().reserves() >= 0.0);
        }
    }

    #[test]
    fn prop_default_halves_every_tranche(
        loans in prop::collection::vec((1.0..200.0f64, 0.001..0.05f64), 1..5),
        coverage in 0.0..0.99f64,
    ) {
        let mut orchestrator = Orchestrator::new(BankConfig::default()).unwrap();
        let debtor: CustomerId = "DEBTOR".into();
        let sink: CustomerId = "SINK".into();
        orchestrator.open_account(&debtor).unwrap();
        orchestrator.open_account(&sink).unwrap();

        // Rising rates keep every tranche separate
        let mut rate = 0.01;
        for (principal, step) in &loans {
            rate += step;
            orchestrator.set_real_rate(rate).unwrap();
            orchestrator.borrow(&debtor, *principal).unwrap();
        }
        prop_assert_eq!(orchestrator.tranches(&debtor).len(), loans.len());

        let mut expected = LoanBook::from_parts(orchestrator.tranches(&debtor).to_vec(), 0.0);
        let minimum_due = expected.accrue();
        let keep = minimum_due * coverage;
        let balance = orchestrator.balance_of(&debtor);
        orchestrator.transfer(&debtor, &sink, balance - keep).unwrap();
        let left = orchestrator.balance_of(&debtor);
        prop_assume!(left < minimum_due);

        if left >= 0.001 {
            expected.apply_repayment(left);
        }
        let halves: Vec<Tranche> = expected
            .tranches()
            .iter()
            .map(|t| Tranche::new(t.principal / 2.0, t.rate))
            .collect();
        let written_off: f64 = halves.iter().map(|t| t.principal).sum();

        let before = orchestrator.bank().cumulative_defaults();
        let result = orchestrator.step(&50.0).unwrap();

        prop_assert_eq!(result.num_defaults, 1);
        let actual = orchestrator.tranches(&debtor);
        prop_assert_eq!(actual.len(), halves.len());
        for (got, want) in actual.iter().zip(&halves) {
            prop_assert!(close(got.principal, want.principal));
            prop_assert_eq!(got.rate, want.rate);
        }
        prop_assert!(close(orchestrator.bank().cumulative_defaults() - before, written_off));
    }

    #[test]
    fn prop_open_account_is_idempotent(deposit in 0.0..100.0f64, loan in 0.0..100.0f64) {
        let mut orchestrator = Orchestrator::new(BankConfig::default()).unwrap();
        let mut holder = CashHolder::new("HH", 100.0);
        prop_assert!(orchestrator.open_account(holder.id()).unwrap());
        orchestrator.deposit(&mut holder, deposit).unwrap();
        orchestrator.borrow(holder.id(), loan).unwrap();

        let balance = orchestrator.balance_of(holder.id());
        let tranches = orchestrator.tranches(holder.id()).to_vec();

        prop_assert!(!orchestrator.open_account(holder.id()).unwrap());
        prop_assert_eq!(orchestrator.bank().num_accounts(), 1);
        prop_assert_eq!(orchestrator.balance_of(holder.id()), balance);
        prop_assert_eq!(orchestrator.tranches(holder.id()), tranches.as_slice());
    }
}
