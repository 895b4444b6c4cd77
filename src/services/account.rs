//! Account management service

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Account, AccountResponse, AccountRole, CreateAccountRequest, PaginatedResponse};

#[derive(Clone)]
pub struct AccountService {
    db_pool: PgPool,
}

impl AccountService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Create an account with a bcrypt-hashed password
    pub async fn create_account(
        &self,
        request: CreateAccountRequest,
    ) -> Result<AccountResponse, ApiError> {
        let password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)
            .map_err(|e| ApiError::InternalError(format!("Password hashing failed: {}", e)))?;

        let role = request.role.unwrap_or(AccountRole::User);

        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, email, name, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.email)
        .bind(&request.name)
        .bind(&password_hash)
        .bind(role)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::Conflict("An account with this email already exists".to_string())
            }
            _ => ApiError::DatabaseError(e.to_string()),
        })?;

        Ok(account.into())
    }

    pub async fn get_account(&self, id: Uuid) -> Result<Account, ApiError> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?
            .ok_or(ApiError::NotFound("Account not found".to_string()))
    }

    pub async fn list_accounts(
        &self,
        page: i32,
        limit: i32,
    ) -> Result<PaginatedResponse<AccountResponse>, ApiError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.db_pool)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT * FROM accounts
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit as i64)
        .bind(((page - 1) * limit) as i64)
        .fetch_all(&self.db_pool)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        Ok(PaginatedResponse {
            data: accounts.into_iter().map(AccountResponse::from).collect(),
            total,
            page,
            limit,
        })
    }

    /// Delete an account; its loans and their payments cascade
    pub async fn delete_account(&self, id: Uuid) -> Result<(), ApiError> {
        let rows_affected = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?
            .rows_affected();

        if rows_affected == 0 {
            return Err(ApiError::NotFound("Account not found".to_string()));
        }

        Ok(())
    }
}
