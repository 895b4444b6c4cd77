//! Route definitions for the LoanLedger API

mod account;
mod auth;
mod loan;
mod payment;

pub use account::account_routes;
pub use auth::auth_routes;
pub use loan::loan_routes;
pub use payment::payment_routes;
