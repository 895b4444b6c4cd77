//! Persistence services for the LoanLedger backend
//!
//! Services own all SQL. Domain validation stays in the ledger module; the
//! services fetch the entities and aggregates it needs, call into it, and
//! persist only when validation succeeds.

mod account;
mod loan;
mod payment;

pub use account::AccountService;
pub use loan::LoanService;
pub use payment::PaymentService;
