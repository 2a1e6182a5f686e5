// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses ports, database URL, token TTLs, and the JWT secret from the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atlas Gym Platform

//! Environment-based configuration management

use crate::auth::generate_jwt_secret;
use crate::constants::{limits, ports};
use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine};
use std::env;
use tracing::warn;

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP port to bind
    pub http_port: u16,
    /// Database connection URL (sqlite file or `sqlite::memory:`)
    pub database_url: String,
    /// Authentication settings
    pub auth: AuthConfig,
}

/// Token issuance settings
#[derive(Clone)]
pub struct AuthConfig {
    /// JWT signing secret
    pub jwt_secret: Vec<u8>,
    /// Access token lifetime in hours
    pub access_token_expiry_hours: i64,
    /// Refresh token lifetime in hours
    pub refresh_token_expiry_hours: i64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[redacted]")
            .field("access_token_expiry_hours", &self.access_token_expiry_hours)
            .field(
                "refresh_token_expiry_hours",
                &self.refresh_token_expiry_hours,
            )
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but unparseable, or if
    /// secret generation fails
    pub fn from_env() -> Result<Self> {
        let http_port = env_var_or("HTTP_PORT", &ports::DEFAULT_HTTP_PORT.to_string())
            .parse::<u16>()
            .context("Invalid HTTP_PORT")?;

        let database_url = env_var_or("DATABASE_URL", "sqlite:atlas_gym.db");

        let access_token_expiry_hours = env_var_or(
            "ACCESS_TOKEN_EXPIRY_HOURS",
            &limits::ACCESS_TOKEN_EXPIRY_HOURS.to_string(),
        )
        .parse::<i64>()
        .context("Invalid ACCESS_TOKEN_EXPIRY_HOURS")?;

        let refresh_token_expiry_hours = env_var_or(
            "REFRESH_TOKEN_EXPIRY_HOURS",
            &limits::REFRESH_TOKEN_EXPIRY_HOURS.to_string(),
        )
        .parse::<i64>()
        .context("Invalid REFRESH_TOKEN_EXPIRY_HOURS")?;

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(encoded) => general_purpose::STANDARD
                .decode(encoded)
                .context("JWT_SECRET must be base64")?,
            Err(_) => {
                warn!("JWT_SECRET not set; generating an ephemeral secret (tokens will not survive restarts)");
                generate_jwt_secret()?.to_vec()
            }
        };

        Ok(Self {
            http_port,
            database_url,
            auth: AuthConfig {
                jwt_secret,
                access_token_expiry_hours,
                refresh_token_expiry_hours,
            },
        })
    }

    /// One-line summary for startup logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "http_port={} database_url={} access_ttl={}h refresh_ttl={}h",
            self.http_port,
            self.database_url,
            self.auth.access_token_expiry_hours,
            self.auth.refresh_token_expiry_hours
        )
    }
}

/// Read an environment variable with a default fallback
fn env_var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_owned())
}
