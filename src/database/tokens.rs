// ABOUTME: Token store database operations
// ABOUTME: Append-only persistence of issued tokens with flag-mutate invalidation

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{IssuedToken, TokenKind, TokenState};
use anyhow::Result;
use chrono::Utc;
use sqlx::{Row, Sqlite, Transaction};
use uuid::Uuid;

impl Database {
    /// Create the tokens table
    ///
    /// No delete path exists for this table; rows outlive the credentials
    /// they record.
    pub(super) async fn migrate_tokens(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS tokens (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id),
                token TEXT UNIQUE NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN ('access', 'refresh')),
                state TEXT NOT NULL DEFAULT 'active' CHECK (state IN ('active', 'revoked', 'expired')),
                issued_at DATETIME NOT NULL,
                expires_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_tokens_user_state ON tokens(user_id, state)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Find all currently valid tokens for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn find_valid_tokens(&self, user_id: Uuid) -> AppResult<Vec<IssuedToken>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, token, kind, state, issued_at, expires_at
            FROM tokens WHERE user_id = $1 AND state = 'active'
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to query tokens: {e}")))?;

        let now = Utc::now();
        let tokens = rows
            .iter()
            .map(Self::row_to_token)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(tokens.into_iter().filter(|t| t.is_valid(now)).collect())
    }

    /// Find a token record by its opaque string
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<IssuedToken>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, token, kind, state, issued_at, expires_at
            FROM tokens WHERE token = $1
            ",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to query token: {e}")))?;

        row.as_ref().map(Self::row_to_token).transpose()
    }

    /// Persist a single token record
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn save_token(&self, token: &IssuedToken) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to open transaction: {e}")))?;
        Self::insert_token(&mut tx, token).await?;
        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit token insert: {e}")))?;
        Ok(())
    }

    /// Persist several token records in one transaction
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails; nothing is persisted in that
    /// case
    pub async fn save_all_tokens(&self, tokens: &[IssuedToken]) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to open transaction: {e}")))?;
        for token in tokens {
            Self::insert_token(&mut tx, token).await?;
        }
        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit token inserts: {e}")))?;
        Ok(())
    }

    /// Move an active token into a terminal state
    ///
    /// The single flag-flip path; a token already in a terminal state is
    /// left untouched, which makes repeated logout calls no-ops.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails
    pub async fn invalidate_token(&self, token: &str, state: TokenState) -> AppResult<()> {
        sqlx::query("UPDATE tokens SET state = $2 WHERE token = $1 AND state = 'active'")
            .bind(token)
            .bind(state.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to invalidate token: {e}")))?;

        Ok(())
    }

    /// Revoke every active token for a user and persist replacements, as
    /// one transaction
    ///
    /// Once this returns, no token issued before the call can validate; a
    /// concurrent refresh either sees the old tokens still active or the
    /// whole replacement, never a half-applied state.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails; the transaction rolls back
    pub async fn revoke_all_valid_and_save(
        &self,
        user_id: Uuid,
        new_tokens: &[IssuedToken],
    ) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to open transaction: {e}")))?;

        sqlx::query("UPDATE tokens SET state = 'revoked' WHERE user_id = $1 AND state = 'active'")
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to revoke tokens: {e}")))?;

        for token in new_tokens {
            Self::insert_token(&mut tx, token).await?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit revoke-and-issue: {e}")))?;

        Ok(())
    }

    /// Insert one token row inside an open transaction
    async fn insert_token(
        tx: &mut Transaction<'_, Sqlite>,
        token: &IssuedToken,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO tokens (id, user_id, token, kind, state, issued_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(token.id.to_string())
        .bind(token.user_id.to_string())
        .bind(&token.token)
        .bind(token.kind.as_str())
        .bind(token.state.as_str())
        .bind(token.issued_at)
        .bind(token.expires_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert token: {e}")))?;

        Ok(())
    }

    /// Convert a database row to an `IssuedToken`
    fn row_to_token(row: &sqlx::sqlite::SqliteRow) -> AppResult<IssuedToken> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let kind: String = row.get("kind");
        let state: String = row.get("state");

        Ok(IssuedToken {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::database(format!("Invalid token id in store: {e}")))?,
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| AppError::database(format!("Invalid user id in store: {e}")))?,
            token: row.get("token"),
            kind: kind.parse::<TokenKind>()?,
            state: state.parse::<TokenState>()?,
            issued_at: row.get("issued_at"),
            expires_at: row.get("expires_at"),
        })
    }
}
