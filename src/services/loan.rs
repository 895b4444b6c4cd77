//! Loan service layer
//!
//! Persistence for loans plus assembly of the derived read model. All
//! financial figures are recomputed from current payment data on every read.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::ledger;
use crate::models::{Loan, LoanView, LoanWriteRequest, PaginatedResponse, Payment};

#[derive(Clone)]
pub struct LoanService {
    db_pool: PgPool,
}

impl LoanService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Create a loan owned by `account_id`
    ///
    /// The request date is stamped here and never changes afterwards; the
    /// originating IP is stored for informational purposes only.
    pub async fn create_loan(
        &self,
        account_id: Uuid,
        ip_address: Option<String>,
        request: LoanWriteRequest,
    ) -> Result<LoanView, ApiError> {
        let request_date = Utc::now().date_naive();
        ledger::validate_loan_write(&request, request_date, None)?;

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (
                id, account_id, nominal_value, interest_rate, interest_type,
                request_date, end_date, ip_address, bank, client
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(request.nominal_value)
        .bind(request.interest_rate)
        .bind(request.interest_type)
        .bind(request_date)
        .bind(request.end_date)
        .bind(&ip_address)
        .bind(&request.bank)
        .bind(&request.client)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        tracing::info!(loan_id = %loan.id, account_id = %account_id, "Loan created");

        // A fresh loan has no payments yet
        Ok(ledger::loan_view(&loan, &[]))
    }

    pub async fn get_loan(&self, id: Uuid) -> Result<Loan, ApiError> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?
            .ok_or(ApiError::NotFound("Loan not found".to_string()))
    }

    /// Assemble the read model for a stored loan
    pub async fn view(&self, loan: &Loan) -> Result<LoanView, ApiError> {
        let payments = self.payments_for(loan.id).await?;
        Ok(ledger::loan_view(loan, &payments))
    }

    /// List loans: every loan for admins, otherwise the account's own
    pub async fn list_loans(
        &self,
        account_id: Uuid,
        include_all: bool,
        page: i32,
        limit: i32,
    ) -> Result<PaginatedResponse<LoanView>, ApiError> {
        let (total, loans): (i64, Vec<Loan>) = if include_all {
            let total = sqlx::query_scalar("SELECT COUNT(*) FROM loans")
                .fetch_one(&self.db_pool)
                .await
                .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
            let loans = sqlx::query_as::<_, Loan>(
                "SELECT * FROM loans ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            )
            .bind(limit as i64)
            .bind(((page - 1) * limit) as i64)
            .fetch_all(&self.db_pool)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
            (total, loans)
        } else {
            let total =
                sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE account_id = $1")
                    .bind(account_id)
                    .fetch_one(&self.db_pool)
                    .await
                    .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
            let loans = sqlx::query_as::<_, Loan>(
                r#"
                SELECT * FROM loans
                WHERE account_id = $1
                ORDER BY created_at DESC
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind(account_id)
            .bind(limit as i64)
            .bind(((page - 1) * limit) as i64)
            .fetch_all(&self.db_pool)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
            (total, loans)
        };

        let mut views = Vec::with_capacity(loans.len());
        for loan in &loans {
            views.push(self.view(loan).await?);
        }

        Ok(PaginatedResponse {
            data: views,
            total,
            page,
            limit,
        })
    }

    /// Update a loan's mutable fields
    ///
    /// The owner and request date are immutable; the ledger rules reject a
    /// nominal value below what has already been repaid.
    pub async fn update_loan(
        &self,
        loan: &Loan,
        request: LoanWriteRequest,
    ) -> Result<LoanView, ApiError> {
        let total_paid = self.total_paid(loan.id).await?;
        ledger::validate_loan_write(&request, loan.request_date, Some(total_paid))?;

        let updated = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans
            SET nominal_value = $1, interest_rate = $2, interest_type = $3,
                end_date = $4, bank = $5, client = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(request.nominal_value)
        .bind(request.interest_rate)
        .bind(request.interest_type)
        .bind(request.end_date)
        .bind(&request.bank)
        .bind(&request.client)
        .bind(loan.id)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        self.view(&updated).await
    }

    /// Delete a loan; its payments cascade with it
    pub async fn delete_loan(&self, id: Uuid) -> Result<(), ApiError> {
        let rows_affected = sqlx::query("DELETE FROM loans WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?
            .rows_affected();

        if rows_affected == 0 {
            return Err(ApiError::NotFound("Loan not found".to_string()));
        }

        tracing::info!(loan_id = %id, "Loan deleted");

        Ok(())
    }

    /// Current paid aggregate for a loan
    pub async fn total_paid(&self, loan_id: Uuid) -> Result<Decimal, ApiError> {
        let total: Decimal =
            sqlx::query_scalar("SELECT COALESCE(SUM(value), 0) FROM payments WHERE loan_id = $1")
                .bind(loan_id)
                .fetch_one(&self.db_pool)
                .await
                .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        Ok(total)
    }

    /// All payments recorded against a loan
    pub async fn payments_for(&self, loan_id: Uuid) -> Result<Vec<Payment>, ApiError> {
        sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE loan_id = $1 ORDER BY date, created_at",
        )
        .bind(loan_id)
        .fetch_all(&self.db_pool)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }
}
