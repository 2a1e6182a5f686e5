// ABOUTME: Database management for user identities and issued tokens
// ABOUTME: Wraps a SQLite pool and runs schema migrations on startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atlas Gym Platform

//! # Database Management
//!
//! Storage for the Atlas Gym Server: user identity rows and the
//! append-only token history. Token rows are never deleted; invalidation
//! flips their state column, keeping a full audit trail.

mod tokens;
mod users;

use anyhow::Result;
use sqlx::{Pool, Sqlite, SqlitePool};

/// Database manager for user and token storage
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema
    /// migration fails
    pub async fn new(database_url: &str) -> Result<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options =
            if database_url.starts_with("sqlite:") && !database_url.contains(":memory:") {
                format!("{database_url}?mode=rwc")
            } else {
                database_url.to_owned()
            };

        let pool = SqlitePool::connect(&connection_options).await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_users().await?;
        self.migrate_tokens().await?;
        Ok(())
    }
}
