//! Authentication service
//!
//! Core business logic for email/password authentication.

use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Account, AuthSession, AuthTokensResponse};

use super::jwt::{
    generate_access_token, generate_refresh_token, get_account_id_from_claims, verify_token,
    JwtError,
};

/// Auth service errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Session not found or revoked")]
    SessionNotFound,

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Invalid refresh token")]
    InvalidRefreshToken,
}

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        AuthError::DatabaseError(e.to_string())
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        AuthError::TokenError(e.to_string())
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db_pool: PgPool,
    jwt_secret: String,
    access_token_ttl_seconds: i64,
    refresh_token_ttl_days: i64,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(
        db_pool: PgPool,
        jwt_secret: String,
        access_token_ttl_seconds: i64,
        refresh_token_ttl_days: i64,
    ) -> Self {
        Self {
            db_pool,
            jwt_secret,
            access_token_ttl_seconds,
            refresh_token_ttl_days,
        }
    }

    /// Verify email/password credentials and issue a token pair
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthTokensResponse, AuthError> {
        let account: Account = sqlx::query_as(
            r#"
            SELECT id, email, name, password_hash, role, created_at, updated_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

        let matches = bcrypt::verify(password, &account.password_hash)
            .map_err(|_| AuthError::InvalidCredentials)?;
        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_tokens(account).await
    }

    /// Exchange a refresh token for a fresh token pair (rotating the session)
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<AuthTokensResponse, AuthError> {
        // Verify signature and expiry before touching the database
        let claims = verify_token(refresh_token, &self.jwt_secret)
            .map_err(|_| AuthError::InvalidRefreshToken)?;
        if claims.token_type != "refresh" {
            return Err(AuthError::InvalidRefreshToken);
        }

        let refresh_token_hash = hash_token(refresh_token);

        // Find the session and verify it's not revoked
        let session: AuthSession = sqlx::query_as(
            r#"
            SELECT id, account_id, jti, refresh_token_hash, expires_at, revoked, revoked_at, created_at
            FROM auth_sessions
            WHERE refresh_token_hash = $1 AND revoked = FALSE AND expires_at > NOW()
            "#,
        )
        .bind(&refresh_token_hash)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(AuthError::SessionNotFound)?;

        let account_id = get_account_id_from_claims(&claims)?;
        if account_id != session.account_id {
            return Err(AuthError::InvalidRefreshToken);
        }

        // Rotate: revoke the old session and issue a new pair
        sqlx::query(
            r#"
            UPDATE auth_sessions
            SET revoked = TRUE, revoked_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(session.id)
        .execute(&self.db_pool)
        .await?;

        let account = self.get_account_by_id(session.account_id).await?;
        self.issue_tokens(account).await
    }

    /// Revoke a session (logout)
    pub async fn revoke_session(&self, jti: &str) -> Result<(), AuthError> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE auth_sessions
            SET revoked = TRUE, revoked_at = NOW()
            WHERE jti = $1 AND revoked = FALSE
            "#,
        )
        .bind(jti)
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AuthError::SessionNotFound);
        }

        Ok(())
    }

    /// Verify a session is valid (not revoked)
    pub async fn verify_session(&self, jti: &str) -> Result<AuthSession, AuthError> {
        sqlx::query_as(
            r#"
            SELECT id, account_id, jti, refresh_token_hash, expires_at, revoked, revoked_at, created_at
            FROM auth_sessions
            WHERE jti = $1 AND revoked = FALSE AND expires_at > NOW()
            "#,
        )
        .bind(jti)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(AuthError::SessionNotFound)
    }

    /// Get an account by ID
    pub async fn get_account_by_id(&self, account_id: Uuid) -> Result<Account, AuthError> {
        sqlx::query_as(
            r#"
            SELECT id, email, name, password_hash, role, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(AuthError::SessionNotFound)
    }

    /// Get JWT secret (for middleware access)
    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    /// Issue an access/refresh pair and record the session
    async fn issue_tokens(&self, account: Account) -> Result<AuthTokensResponse, AuthError> {
        let jti = Uuid::new_v4().to_string();
        let access_token = generate_access_token(
            &account,
            &jti,
            &self.jwt_secret,
            self.access_token_ttl_seconds,
        )?;

        let refresh_jti = Uuid::new_v4().to_string();
        let refresh_token = generate_refresh_token(
            &account,
            &refresh_jti,
            &self.jwt_secret,
            self.refresh_token_ttl_days,
        )?;

        let refresh_token_hash = hash_token(&refresh_token);
        let session_expires_at = Utc::now() + Duration::days(self.refresh_token_ttl_days);

        sqlx::query(
            r#"
            INSERT INTO auth_sessions (id, account_id, jti, refresh_token_hash, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account.id)
        .bind(&jti)
        .bind(&refresh_token_hash)
        .bind(session_expires_at)
        .execute(&self.db_pool)
        .await?;

        Ok(AuthTokensResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_ttl_seconds,
            account: account.into(),
        })
    }
}

/// Hash a token for storage
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex_encode(hasher.finalize())
}

fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    bytes
        .as_ref()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_stable_hex() {
        let a = hash_token("some-refresh-token");
        let b = hash_token("some-refresh-token");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_token_differs_per_input() {
        assert_ne!(hash_token("token-a"), hash_token("token-b"));
    }
}
