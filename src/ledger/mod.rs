//! Ledger core for the LoanLedger backend
//!
//! Pure domain logic over loans and payments:
//! - interest accrual (simple and compound, prorated by elapsed whole months)
//! - derived financial figures (full debt, total paid, outstanding balance)
//! - write-time validation of loan and payment invariants
//!
//! Nothing here touches the database; callers supply the entities and the
//! current payment aggregate, and persist only after validation succeeds.

mod interest;
mod rules;

pub use interest::{
    full_debt, interest_value, loan_view, months_elapsed, outstanding_balance, round_money,
    total_paid,
};
pub use rules::{validate_loan_write, validate_payment, RuleError};
