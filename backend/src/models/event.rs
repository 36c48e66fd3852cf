//! Event logging for simulation replay and auditing.
//!
//! This module defines the Event enum which captures every ledger movement
//! the engine performs. Events enable:
//! - Debugging (understand what happened and when)
//! - Auditing (reconcile deposits, credit and defaults)
//! - Analysis (extract rate and default histories)
//!
//! # Event Types
//!
//! Events are categorized by simulation phase:
//! - **Trading**: AccountOpened, Deposit, Withdrawal, Transfer, Borrow, Amortize
//! - **Accrual**: ForcedRepayment, Default
//! - **PolicyUpdate**: ProfitDisbursed, RateUpdate
//!
//! Operations clamped to nothing are not logged.
//!
//! # Example
//!
//! ```rust
//! use bank_ledger_core_rs::models::Event;
//!
//! let event = Event::Borrow {
//!     period: 3,
//!     customer_id: "STORE".into(),
//!     amount: 250.0,
//!     refinanced: 200.0,
//!     rate: 0.08,
//! };
//!
//! assert_eq!(event.period(), 3);
//! assert_eq!(event.event_type(), "Borrow");
//! ```

use crate::models::customer::CustomerId;
use serde::Serialize;

/// Simulation event capturing a ledger movement.
///
/// All events include a period number for temporal ordering.
/// Events are logged in the order they occur within a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Customer registered with the bank
    AccountOpened {
        period: usize,
        customer_id: CustomerId,
    },

    /// Cash moved from the customer into their deposit account
    Deposit {
        period: usize,
        customer_id: CustomerId,
        requested: f64,
        amount: f64,
    },

    /// Cash moved from the deposit account to the customer
    Withdrawal {
        period: usize,
        customer_id: CustomerId,
        requested: f64,
        amount: f64,
    },

    /// Deposit balance moved between two accounts
    Transfer {
        period: usize,
        from: CustomerId,
        to: CustomerId,
        amount: f64,
    },

    /// New tranche issued; `refinanced` is the older principal folded into it
    Borrow {
        period: usize,
        customer_id: CustomerId,
        amount: f64,
        refinanced: f64,
        rate: f64,
    },

    /// Voluntary repayment applied to the loan book
    Amortize {
        period: usize,
        customer_id: CustomerId,
        amount: f64,
    },

    /// Bank collected an unpaid minimum repayment from the account
    ForcedRepayment {
        period: usize,
        customer_id: CustomerId,
        amount: f64,
    },

    /// Customer could not cover the minimum; their debt was halved
    Default {
        period: usize,
        customer_id: CustomerId,
        written_off: f64,
    },

    /// Gap between assets and liabilities paid out to depositors
    ProfitDisbursed { period: usize, amount: f64 },

    /// End-of-period interest rate reset
    RateUpdate {
        period: usize,
        previous_rate: f64,
        new_rate: f64,
        inflation_estimate: f64,
        reserve_ratio: f64,
    },
}

impl Event {
    /// Get the period number when this event occurred
    pub fn period(&self) -> usize {
        match self {
            Event::AccountOpened { period, .. } => *period,
            Event::Deposit { period, .. } => *period,
            Event::Withdrawal { period, .. } => *period,
            Event::Transfer { period, .. } => *period,
            Event::Borrow { period, .. } => *period,
            Event::Amortize { period, .. } => *period,
            Event::ForcedRepayment { period, .. } => *period,
            Event::Default { period, .. } => *period,
            Event::ProfitDisbursed { period, .. } => *period,
            Event::RateUpdate { period, .. } => *period,
        }
    }

    /// Get a short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::AccountOpened { .. } => "AccountOpened",
            Event::Deposit { .. } => "Deposit",
            Event::Withdrawal { .. } => "Withdrawal",
            Event::Transfer { .. } => "Transfer",
            Event::Borrow { .. } => "Borrow",
            Event::Amortize { .. } => "Amortize",
            Event::ForcedRepayment { .. } => "ForcedRepayment",
            Event::Default { .. } => "Default",
            Event::ProfitDisbursed { .. } => "ProfitDisbursed",
            Event::RateUpdate { .. } => "RateUpdate",
        }
    }

    /// Get the customer if the event relates to a specific account
    ///
    /// For transfers this is the paying side.
    pub fn customer_id(&self) -> Option<&CustomerId> {
        match self {
            Event::AccountOpened { customer_id, .. } => Some(customer_id),
            Event::Deposit { customer_id, .. } => Some(customer_id),
            Event::Withdrawal { customer_id, .. } => Some(customer_id),
            Event::Transfer { from, .. } => Some(from),
            Event::Borrow { customer_id, .. } => Some(customer_id),
            Event::Amortize { customer_id, .. } => Some(customer_id),
            Event::ForcedRepayment { customer_id, .. } => Some(customer_id),
            Event::Default { customer_id, .. } => Some(customer_id),
            Event::ProfitDisbursed { .. } | Event::RateUpdate { .. } => None,
        }
    }

    /// Whether the event touches the given customer's account
    pub fn involves(&self, customer_id: &CustomerId) -> bool {
        match self {
            Event::Transfer { from, to, .. } => from == customer_id || to == customer_id,
            other => other.customer_id() == Some(customer_id),
        }
    }
}

/// Event log for storing and querying simulation events.
///
/// This is a simple wrapper around Vec<Event> with convenience methods.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Get the number of events logged
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get all events
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events for a specific period
    pub fn events_at_period(&self, period: usize) -> Vec<&Event> {
        self.events.iter().filter(|e| e.period() == period).collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events touching a specific customer's account
    pub fn events_for_customer(&self, customer_id: &CustomerId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.involves(customer_id))
            .collect()
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
