//! Data models for the LoanLedger backend

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;
use validator::Validate;

pub mod auth;
pub use auth::*;

/// Account model
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: AccountRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account roles
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "account_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    User,
    Admin,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            name: account.name,
            role: account.role,
            created_at: account.created_at,
        }
    }
}

/// Interest accrual modes for a loan
#[derive(Debug, Serialize, Deserialize, sqlx::Type, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "interest_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InterestType {
    Simple,
    Compound,
}

/// Loan model
///
/// Interest, full debt and balances are never stored; they are recomputed
/// from these fields and the loan's payments by the ledger module.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Loan {
    pub id: Uuid,
    pub account_id: Uuid,
    pub nominal_value: Decimal,
    pub interest_rate: Decimal, // percentage, 5.50 means 5.5%
    pub interest_type: InterestType,
    pub request_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub ip_address: Option<String>,
    pub bank: String,
    pub client: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payment model
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Payment {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub date: NaiveDate,
    pub value: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create or update a loan
#[derive(Debug, Deserialize, Validate)]
pub struct LoanWriteRequest {
    pub nominal_value: Decimal,
    pub interest_rate: Decimal,
    pub interest_type: InterestType,
    pub end_date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 100))]
    pub bank: String,
    #[validate(length(min = 1, max = 100))]
    pub client: String,
}

/// Request to create or update a payment
#[derive(Debug, Deserialize, Validate)]
pub struct PaymentWriteRequest {
    pub loan_id: Uuid,
    pub date: NaiveDate,
    pub value: Decimal,
}

/// Read model for a loan: stored fields plus the derived financial figures
#[derive(Debug, Serialize)]
pub struct LoanView {
    pub id: Uuid,
    pub account_id: Uuid,
    pub nominal_value: Decimal,
    pub interest_rate: Decimal,
    pub interest_type: InterestType,
    pub request_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub ip_address: Option<String>,
    pub bank: String,
    pub client: String,
    pub interest_value: Decimal,
    pub full_debt: Decimal,
    pub total_paid: Decimal,
    pub outstanding_balance: Decimal,
}

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Pagination parameters
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub page: Option<i32>,
    pub limit: Option<i32>,
}

impl PaginationParams {
    /// Resolve to a concrete (page, limit) pair with defaults and caps
    pub fn resolve(&self) -> (i32, i32) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(50).clamp(1, 200);
        (page, limit)
    }
}

/// Paginated response
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i32,
    pub limit: i32,
}
