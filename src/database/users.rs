// ABOUTME: User management database operations
// ABOUTME: Handles user rows, username prefix scans, and activation/password updates

use super::Database;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{User, UserRole};
use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create the users table
    pub(super) async fn migrate_users(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'trainee' CHECK (role IN ('trainee', 'trainer', 'admin', 'guest')),
                is_active BOOLEAN NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                last_active DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_username ON users(username)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a new user row
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` when the username collides with an
    /// existing row (the signup retry loop keys on this), or a database
    /// error for any other failure
    pub async fn create_user(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO users (
                id, username, first_name, last_name, password_hash, role,
                is_active, created_at, last_active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.last_active)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|db_err| db_err.is_unique_violation())
            {
                AppError::new(
                    ErrorCode::ResourceAlreadyExists,
                    format!("Username already taken: {}", user.username),
                )
            } else {
                AppError::database(format!("Failed to insert user: {e}"))
            }
        })?;

        Ok(())
    }

    /// Get a user by username
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, username, first_name, last_name, password_hash, role,
                   is_active, created_at, last_active
            FROM users WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to query user: {e}")))?;

        row.map(|row| Self::row_to_user(&row)).transpose()
    }

    /// List all usernames starting with the given prefix
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_usernames_with_prefix(&self, prefix: &str) -> AppResult<Vec<String>> {
        let rows = sqlx::query("SELECT username FROM users WHERE username LIKE $1")
            .bind(format!("{prefix}%"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list usernames: {e}")))?;

        Ok(rows.iter().map(|row| row.get("username")).collect())
    }

    /// Set the active flag on a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails
    pub async fn set_user_active(&self, user_id: Uuid, active: bool) -> AppResult<()> {
        sqlx::query("UPDATE users SET is_active = $2 WHERE id = $1")
            .bind(user_id.to_string())
            .bind(active)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update active flag: {e}")))?;

        Ok(())
    }

    /// Replace a user's password hash
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails
    pub async fn update_password_hash(&self, user_id: Uuid, password_hash: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(user_id.to_string())
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update password hash: {e}")))?;

        Ok(())
    }

    /// Update the last active timestamp for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails
    pub async fn update_last_active(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_active = CURRENT_TIMESTAMP WHERE id = $1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update last active: {e}")))?;

        Ok(())
    }

    /// Convert a database row to a User struct
    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> AppResult<User> {
        let id: String = row.get("id");
        let role: String = row.get("role");

        Ok(User {
            id: Uuid::parse_str(&id)
                .map_err(|e| AppError::database(format!("Invalid user id in store: {e}")))?,
            username: row.get("username"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            password_hash: row.get("password_hash"),
            role: role.parse::<UserRole>()?,
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
            last_active: row.get("last_active"),
        })
    }
}
