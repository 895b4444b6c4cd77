//! API handlers for the LoanLedger backend

pub mod account;
pub mod auth;
pub mod loan;
pub mod payment;

pub use account::*;
pub use auth::*;
pub use loan::*;
pub use payment::*;

// Re-export extractors from middleware for handler use
pub use crate::middleware::auth::{AdminAccount, AuthenticatedAccount};
