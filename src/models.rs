// ABOUTME: Core data models for users and issued bearer tokens
// ABOUTME: Defines User, UserRole, IssuedToken, TokenKind, and the terminal TokenState enum
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atlas Gym Platform

//! # Data Models
//!
//! Core data structures shared across the Atlas Gym Server.
//!
//! Token invalidation is modeled as a terminal-state enum rather than a pair
//! of mutable booleans, so impossible flag combinations cannot be
//! represented; every transition out of [`TokenState::Active`] goes through
//! the token store's single invalidate operation.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Capability set assigned to a user account
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Gym member receiving training
    Trainee,
    /// Staff member delivering training sessions
    Trainer,
    /// Administrative account
    Admin,
    /// Unauthenticated or provisional account
    Guest,
}

impl UserRole {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trainee => "trainee",
            Self::Trainer => "trainer",
            Self::Admin => "admin",
            Self::Guest => "guest",
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trainee" => Ok(Self::Trainee),
            "trainer" => Ok(Self::Trainer),
            "admin" => Ok(Self::Admin),
            "guest" => Ok(Self::Guest),
            _ => Err(AppError::invalid_input(format!("Invalid user role: {s}"))),
        }
    }
}

/// Identity record for a registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// Unique username (`first.last.N`)
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Hashed password for authentication
    pub password_hash: String,
    /// Capability set for this account
    pub role: UserRole,
    /// Whether the account is active
    pub is_active: bool,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    /// Last time the user accessed the system
    pub last_active: DateTime<Utc>,
}

impl User {
    /// Create a new user with the given identity and password hash
    #[must_use]
    pub fn new(
        username: String,
        first_name: String,
        last_name: String,
        password_hash: String,
        role: UserRole,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            first_name,
            last_name,
            password_hash,
            role,
            is_active: false,
            created_at: now,
            last_active: now,
        }
    }
}

/// TTL class of an issued token
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived credential authorizing API calls
    Access,
    /// Longer-lived credential used only to obtain new access tokens
    Refresh,
}

impl TokenKind {
    /// Convert to string for database storage and the token `use` claim
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl FromStr for TokenKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(Self::Access),
            "refresh" => Ok(Self::Refresh),
            _ => Err(AppError::invalid_input(format!("Invalid token kind: {s}"))),
        }
    }
}

/// Lifecycle state of an issued token
///
/// `Revoked` and `Expired` are terminal; a token never returns to `Active`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenState {
    /// Issued and not yet invalidated
    Active,
    /// Explicitly invalidated before natural expiry
    Revoked,
    /// Invalidated because its TTL elapsed
    Expired,
}

impl TokenState {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Revoked => "revoked",
            Self::Expired => "expired",
        }
    }
}

impl FromStr for TokenState {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "revoked" => Ok(Self::Revoked),
            "expired" => Ok(Self::Expired),
            _ => Err(AppError::invalid_input(format!("Invalid token state: {s}"))),
        }
    }
}

/// Issued-credential record kept for the lifetime of the system
///
/// Rows are never deleted; invalidation flips `state` to a terminal value,
/// preserving an audit trail of every credential ever issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    /// Unique identifier for this token record
    pub id: Uuid,
    /// User who owns this token
    pub user_id: Uuid,
    /// The opaque signed token string
    pub token: String,
    /// TTL class
    pub kind: TokenKind,
    /// Lifecycle state
    pub state: TokenState,
    /// When the token was issued
    pub issued_at: DateTime<Utc>,
    /// When the token expires
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Create a new active token record
    #[must_use]
    pub fn new(user_id: Uuid, token: String, kind: TokenKind, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token,
            kind,
            state: TokenState::Active,
            issued_at: Utc::now(),
            expires_at,
        }
    }

    /// Whether this token should be accepted at `now`
    #[must_use]
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.state == TokenState::Active && now < self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_role_round_trip() {
        for role in [
            UserRole::Trainee,
            UserRole::Trainer,
            UserRole::Admin,
            UserRole::Guest,
        ] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert!("coach".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_token_validity() {
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let mut token = IssuedToken::new(
            user_id,
            "opaque".into(),
            TokenKind::Access,
            now + Duration::hours(1),
        );

        assert!(token.is_valid(now));
        assert!(!token.is_valid(now + Duration::hours(2)));

        token.state = TokenState::Revoked;
        assert!(!token.is_valid(now));
    }

    #[test]
    fn test_new_user_starts_inactive() {
        let user = User::new(
            "Harry.Potter.1".into(),
            "Harry".into(),
            "Potter".into(),
            "hash".into(),
            UserRole::Trainee,
        );
        assert!(!user.is_active);
        assert_eq!(user.role, UserRole::Trainee);
    }
}
