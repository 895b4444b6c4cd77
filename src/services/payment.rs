//! Payment service layer
//!
//! Payment writes run inside a transaction that locks the target loan row
//! before the debt-ceiling check, so concurrent payments against the same
//! loan are validated serially.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::ApiError;
use crate::ledger::{self, RuleError};
use crate::models::{Loan, PaginatedResponse, Payment, PaymentWriteRequest};

#[derive(Clone)]
pub struct PaymentService {
    db_pool: PgPool,
}

impl PaymentService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Record a payment against a loan
    pub async fn create_payment(
        &self,
        actor: Uuid,
        request: PaymentWriteRequest,
    ) -> Result<Payment, ApiError> {
        let mut tx = self
            .db_pool
            .begin()
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        let loan = lock_loan(&mut tx, request.loan_id).await?;
        let total_paid = total_paid_locked(&mut tx, loan.id).await?;

        ledger::validate_payment(&loan, request.date, request.value, actor, None, total_paid)?;

        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (id, loan_id, date, value)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(loan.id)
        .bind(request.date)
        .bind(request.value)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        tracing::info!(payment_id = %payment.id, loan_id = %loan.id, "Payment recorded");

        Ok(payment)
    }

    /// Update a payment, possibly moving it to another loan of the same owner
    pub async fn update_payment(
        &self,
        actor: Uuid,
        payment_id: Uuid,
        request: PaymentWriteRequest,
    ) -> Result<Payment, ApiError> {
        let mut tx = self
            .db_pool
            .begin()
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        let existing = fetch_payment(&mut tx, payment_id).await?;

        // The actor must own the loan the payment currently belongs to
        let current_loan = lock_loan(&mut tx, existing.loan_id).await?;
        if current_loan.account_id != actor {
            return Err(RuleError::Forbidden.into());
        }

        // Validate against the target loan (which may be a different one)
        let target = if request.loan_id == existing.loan_id {
            current_loan
        } else {
            lock_loan(&mut tx, request.loan_id).await?
        };
        let total_paid = total_paid_locked(&mut tx, target.id).await?;

        ledger::validate_payment(
            &target,
            request.date,
            request.value,
            actor,
            Some(&existing),
            total_paid,
        )?;

        let payment = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET loan_id = $1, date = $2, value = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(target.id)
        .bind(request.date)
        .bind(request.value)
        .bind(payment_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        Ok(payment)
    }

    pub async fn get_payment(&self, id: Uuid) -> Result<Payment, ApiError> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?
            .ok_or(ApiError::NotFound("Payment not found".to_string()))
    }

    /// Delete a payment; only the owner of its loan may do so
    pub async fn delete_payment(&self, actor: Uuid, id: Uuid) -> Result<(), ApiError> {
        let payment = self.get_payment(id).await?;

        let owner: Option<Uuid> =
            sqlx::query_scalar("SELECT account_id FROM loans WHERE id = $1")
                .bind(payment.loan_id)
                .fetch_optional(&self.db_pool)
                .await
                .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        if owner != Some(actor) {
            return Err(RuleError::Forbidden.into());
        }

        sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        tracing::info!(payment_id = %id, "Payment deleted");

        Ok(())
    }

    /// List payments: every payment for admins, otherwise those against the
    /// account's own loans
    pub async fn list_payments(
        &self,
        account_id: Uuid,
        include_all: bool,
        page: i32,
        limit: i32,
    ) -> Result<PaginatedResponse<Payment>, ApiError> {
        let (total, payments): (i64, Vec<Payment>) = if include_all {
            let total = sqlx::query_scalar("SELECT COUNT(*) FROM payments")
                .fetch_one(&self.db_pool)
                .await
                .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
            let payments = sqlx::query_as::<_, Payment>(
                "SELECT * FROM payments ORDER BY date DESC, created_at DESC LIMIT $1 OFFSET $2",
            )
            .bind(limit as i64)
            .bind(((page - 1) * limit) as i64)
            .fetch_all(&self.db_pool)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
            (total, payments)
        } else {
            let total = sqlx::query_scalar(
                r#"
                SELECT COUNT(*)
                FROM payments p
                JOIN loans l ON l.id = p.loan_id
                WHERE l.account_id = $1
                "#,
            )
            .bind(account_id)
            .fetch_one(&self.db_pool)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
            let payments = sqlx::query_as::<_, Payment>(
                r#"
                SELECT p.*
                FROM payments p
                JOIN loans l ON l.id = p.loan_id
                WHERE l.account_id = $1
                ORDER BY p.date DESC, p.created_at DESC
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind(account_id)
            .bind(limit as i64)
            .bind(((page - 1) * limit) as i64)
            .fetch_all(&self.db_pool)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
            (total, payments)
        };

        Ok(PaginatedResponse {
            data: payments,
            total,
            page,
            limit,
        })
    }
}

/// Fetch a loan row with a per-loan write lock
async fn lock_loan(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Loan, ApiError> {
    sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or(ApiError::NotFound("Loan not found".to_string()))
}

async fn fetch_payment(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Payment, ApiError> {
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or(ApiError::NotFound("Payment not found".to_string()))
}

async fn total_paid_locked(
    tx: &mut Transaction<'_, Postgres>,
    loan_id: Uuid,
) -> Result<Decimal, ApiError> {
    sqlx::query_scalar("SELECT COALESCE(SUM(value), 0) FROM payments WHERE loan_id = $1")
        .bind(loan_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))
}
