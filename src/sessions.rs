// ABOUTME: Session lifecycle manager orchestrating signup, login, authenticate, refresh, logout
// ABOUTME: Owns every token-state transition and the single-active-session invariant
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atlas Gym Platform

//! # Session Lifecycle Management
//!
//! The root orchestrator of the credential subsystem. Every token-state
//! transition in the system goes through this module; no other component
//! mutates token state.
//!
//! Per token the state machine is `Active -> {Revoked, Expired}`, both
//! terminal. Per user the invariant is at most one current token pair,
//! enforced by revoking all still-valid tokens inside the same transaction
//! that persists the replacement pair.
//!
//! Expected, user-facing conditions are typed values ([`SessionError`]
//! variants or in-band outcomes); only unexpected storage and codec
//! failures propagate as internal errors. The authenticated identity is
//! always passed explicitly; there is no ambient security context.

use crate::auth::TokenCodec;
use crate::constants::limits::MAX_USERNAME_ALLOCATION_RETRIES;
use crate::credentials;
use crate::database::Database;
use crate::errors::{AppError, ErrorCode};
use crate::lockout::LoginGuard;
use crate::models::{IssuedToken, TokenKind, TokenState, User, UserRole};
use crate::usernames::UsernameAllocator;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Typed failure surfaced by lifecycle operations
///
/// The HTTP boundary owns the mapping of these variants to status codes;
/// nothing here knows about HTTP.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No user exists with the given username
    #[error("User not found: {0}")]
    UserNotFound(String),
    /// Credential check failed
    #[error("Bad credentials")]
    BadCredentials,
    /// Authorization header missing or without the bearer prefix
    #[error("Authorization header missing or not a bearer token")]
    InvalidAuthHeader,
    /// The presented token yields no usable subject
    #[error("Token subject could not be determined")]
    UnknownSubject,
    /// The presented token is invalid, expired, or no longer active
    #[error("Token is invalid or no longer active")]
    InvalidToken,
    /// Username allocation kept colliding after retries
    #[error("Username allocation failed after repeated collisions")]
    DuplicateUser,
    /// Unexpected storage or codec failure
    #[error(transparent)]
    Internal(#[from] AppError),
}

/// Access/refresh pair returned by session-establishing operations
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Short-TTL credential authorizing API calls
    pub access_token: String,
    /// Longer-TTL credential for obtaining new access tokens
    pub refresh_token: String,
    /// When the access token expires
    pub expires_at: DateTime<Utc>,
}

/// Result of a successful signup
#[derive(Debug, Clone)]
pub struct SignupResult {
    /// The allocated username
    pub username: String,
    /// The initial token pair
    pub tokens: TokenPair,
}

/// In-band outcome of a login attempt
///
/// A wrong password is an expected condition, not an error.
#[derive(Debug)]
pub enum LoginOutcome {
    /// Credentials accepted; a fresh token pair was issued
    LoggedIn(TokenPair),
    /// Password did not match
    InvalidCredentials,
}

/// In-band outcome of a refresh attempt
#[derive(Debug)]
pub enum RefreshOutcome {
    /// A new access token was issued
    Refreshed(RefreshedTokens),
    /// The presented token failed validation; the client should
    /// re-authenticate
    InvalidToken,
}

/// Payload of a successful refresh
#[derive(Debug, Clone)]
pub struct RefreshedTokens {
    /// Owner of the session
    pub username: String,
    /// The newly issued access token
    pub access_token: String,
    /// The refresh token, echoed back unchanged
    pub refresh_token: String,
    /// When the new access token expires
    pub expires_at: DateTime<Utc>,
}

/// Orchestrates the credential components against the store
#[derive(Clone)]
pub struct SessionManager {
    database: Database,
    codec: Arc<TokenCodec>,
    allocator: UsernameAllocator,
    guard: Arc<dyn LoginGuard>,
}

impl SessionManager {
    /// Create a new session manager
    #[must_use]
    pub fn new(database: Database, codec: TokenCodec, guard: Arc<dyn LoginGuard>) -> Self {
        let allocator = UsernameAllocator::new(database.clone());
        Self {
            database,
            codec: Arc::new(codec),
            allocator,
            guard,
        }
    }

    /// Register a new user and establish their first session
    ///
    /// Username allocation and the user insert are not atomic, so two
    /// concurrent signups for the same name can both observe the same max
    /// suffix. The uniqueness constraint catches the loser, which
    /// re-allocates; only repeated exhaustion surfaces as a failure.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::DuplicateUser`] when allocation keeps
    /// colliding, or an internal error on storage/codec failure
    pub async fn signup(
        &self,
        first_name: &str,
        last_name: &str,
        raw_password: &str,
        role: UserRole,
    ) -> Result<SignupResult, SessionError> {
        let password_hash = credentials::hash_password(raw_password)?;

        for attempt in 0..MAX_USERNAME_ALLOCATION_RETRIES {
            let username = self.allocator.allocate(first_name, last_name).await?;
            let user = User::new(
                username.clone(),
                first_name.trim().to_owned(),
                last_name.trim().to_owned(),
                password_hash.clone(),
                role,
            );

            match self.database.create_user(&user).await {
                Ok(()) => {
                    let tokens = self.issue_pair(&user).await?;
                    info!("User registered: {username} (role: {role})", role = user.role);
                    return Ok(SignupResult { username, tokens });
                }
                Err(e) if e.code == ErrorCode::ResourceAlreadyExists => {
                    warn!(
                        "Username collision on {username}, re-allocating (attempt {})",
                        attempt + 1
                    );
                }
                Err(e) => return Err(SessionError::Internal(e)),
            }
        }

        Err(SessionError::DuplicateUser)
    }

    /// Verify credentials and issue a fresh token pair
    ///
    /// This lightweight variant does not revoke prior tokens; it marks the
    /// user active and adds a pair alongside any existing sessions.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UserNotFound`] for an unknown username, or
    /// an internal error on storage/codec failure
    pub async fn login(
        &self,
        username: &str,
        raw_password: &str,
    ) -> Result<LoginOutcome, SessionError> {
        let user = self
            .database
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| SessionError::UserNotFound(username.to_owned()))?;

        if !credentials::verify_password(raw_password, &user.password_hash)? {
            info!("Login rejected for user: {username}");
            return Ok(LoginOutcome::InvalidCredentials);
        }

        self.database.set_user_active(user.id, true).await?;
        self.database.update_last_active(user.id).await?;

        let tokens = self.issue_pair(&user).await?;
        info!("User logged in: {username}");
        Ok(LoginOutcome::LoggedIn(tokens))
    }

    /// Establish the primary session, revoking every prior token
    ///
    /// The strict variant: the brute-force guard is consulted around the
    /// credential check, a failed check is an error rather than an in-band
    /// outcome, and success invalidates all previously issued, still-valid
    /// tokens before the new pair becomes visible. Revocation and issuance
    /// share one transaction, so no token issued before this call can
    /// validate once it returns.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::BadCredentials`] for an unknown username or
    /// wrong password, or an internal error on storage/codec failure
    pub async fn authenticate(
        &self,
        username: &str,
        raw_password: &str,
    ) -> Result<TokenPair, SessionError> {
        self.guard.before_attempt(username)?;

        let Some(user) = self.database.get_user_by_username(username).await? else {
            self.guard.record_outcome(username, false);
            return Err(SessionError::BadCredentials);
        };

        if !credentials::verify_password(raw_password, &user.password_hash)? {
            self.guard.record_outcome(username, false);
            return Err(SessionError::BadCredentials);
        }
        self.guard.record_outcome(username, true);

        let (access_token, access_expiry) = self.codec.issue_access(&user.username)?;
        let (refresh_token, refresh_expiry) = self.codec.issue_refresh(&user.username)?;

        let records = [
            IssuedToken::new(
                user.id,
                access_token.clone(),
                TokenKind::Access,
                access_expiry,
            ),
            IssuedToken::new(
                user.id,
                refresh_token.clone(),
                TokenKind::Refresh,
                refresh_expiry,
            ),
        ];
        self.database
            .revoke_all_valid_and_save(user.id, &records)
            .await?;
        self.database.update_last_active(user.id).await?;

        info!("User authenticated, prior sessions revoked: {username}");
        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_at: access_expiry,
        })
    }

    /// Exchange a refresh token for a new access token
    ///
    /// The refresh token itself is not rotated; only access tokens are.
    /// A failed validation is an in-band outcome so clients can fall back
    /// to a full re-authentication.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidAuthHeader`] when the header lacks
    /// the bearer prefix, [`SessionError::UnknownSubject`] when no subject
    /// can be extracted, [`SessionError::UserNotFound`] for an unknown
    /// subject, or an internal error on storage/codec failure
    pub async fn refresh(
        &self,
        authorization_header: Option<&str>,
    ) -> Result<RefreshOutcome, SessionError> {
        let presented = bearer_token(authorization_header)?;

        let subject = self
            .codec
            .extract_subject(presented)
            .map_err(|_| SessionError::UnknownSubject)?;

        let user = self
            .database
            .get_user_by_username(&subject)
            .await?
            .ok_or_else(|| SessionError::UserNotFound(subject.clone()))?;

        if !self.validate_against_store(presented, &user, TokenKind::Refresh).await? {
            info!("Refresh rejected for user: {subject}");
            return Ok(RefreshOutcome::InvalidToken);
        }

        let (access_token, expires_at) = self.codec.issue_access(&user.username)?;
        self.database
            .save_token(&IssuedToken::new(
                user.id,
                access_token.clone(),
                TokenKind::Access,
                expires_at,
            ))
            .await?;
        self.database.update_last_active(user.id).await?;

        info!("Access token refreshed for user: {subject}");
        Ok(RefreshOutcome::Refreshed(RefreshedTokens {
            username: user.username,
            access_token,
            refresh_token: presented.to_owned(),
            expires_at,
        }))
    }

    /// Invalidate the presented token
    ///
    /// Idempotent: a token that is unknown or already in a terminal state
    /// still yields success, so logging out twice is not an error and the
    /// response does not reveal whether the token was live.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidAuthHeader`] when the header lacks
    /// the bearer prefix, or an internal error on storage failure
    pub async fn logout(&self, authorization_header: Option<&str>) -> Result<(), SessionError> {
        let presented = bearer_token(authorization_header)?;

        if let Some(record) = self.database.find_by_token(presented).await? {
            if record.state == TokenState::Active {
                self.database
                    .invalidate_token(&record.token, TokenState::Revoked)
                    .await?;
                info!("Token revoked on logout for user id: {}", record.user_id);
            }
        }

        Ok(())
    }

    /// Resolve the user behind a bearer access token
    ///
    /// Used by protected routes; the returned identity is passed onward
    /// explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidAuthHeader`] when the header lacks
    /// the bearer prefix, [`SessionError::InvalidToken`] when the token
    /// fails codec or store validation, or an internal error on storage
    /// failure
    pub async fn authorize(
        &self,
        authorization_header: Option<&str>,
    ) -> Result<User, SessionError> {
        let presented = bearer_token(authorization_header)?;

        let subject = self
            .codec
            .extract_subject(presented)
            .map_err(|_| SessionError::InvalidToken)?;

        let user = self
            .database
            .get_user_by_username(&subject)
            .await?
            .ok_or(SessionError::InvalidToken)?;

        if !self.validate_against_store(presented, &user, TokenKind::Access).await? {
            return Err(SessionError::InvalidToken);
        }

        self.database.update_last_active(user.id).await?;
        Ok(user)
    }

    /// Change a user's password after re-verifying the current one
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::BadCredentials`] when the current password
    /// does not match, or an internal error on storage failure
    pub async fn change_password(
        &self,
        user: &User,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), SessionError> {
        if !credentials::verify_password(current_password, &user.password_hash)? {
            return Err(SessionError::BadCredentials);
        }

        let password_hash = credentials::hash_password(new_password)?;
        self.database
            .update_password_hash(user.id, &password_hash)
            .await?;
        info!("Password changed for user: {}", user.username);
        Ok(())
    }

    /// Activate or deactivate a user account
    ///
    /// # Errors
    ///
    /// Returns an internal error on storage failure
    pub async fn set_activation(&self, user: &User, active: bool) -> Result<(), SessionError> {
        self.database.set_user_active(user.id, active).await?;
        info!(
            "User {} {}",
            user.username,
            if active { "activated" } else { "deactivated" }
        );
        Ok(())
    }

    /// Full validation of a presented token: codec check plus store state
    ///
    /// A time-expired row still marked active is flipped to `Expired`
    /// through the store's single invalidate path before being rejected.
    async fn validate_against_store(
        &self,
        presented: &str,
        user: &User,
        expected_kind: TokenKind,
    ) -> Result<bool, SessionError> {
        let Some(record) = self.database.find_by_token(presented).await? else {
            return Ok(false);
        };

        if record.user_id != user.id || record.kind != expected_kind {
            return Ok(false);
        }

        let now = Utc::now();
        if record.state == TokenState::Active && now >= record.expires_at {
            self.database
                .invalidate_token(&record.token, TokenState::Expired)
                .await?;
            return Ok(false);
        }
        if !record.is_valid(now) {
            return Ok(false);
        }

        Ok(self.codec.validate(presented, &user.username))
    }

    /// Issue and persist a fresh access/refresh pair for a user
    async fn issue_pair(&self, user: &User) -> Result<TokenPair, SessionError> {
        let (access_token, access_expiry) = self.codec.issue_access(&user.username)?;
        let (refresh_token, refresh_expiry) = self.codec.issue_refresh(&user.username)?;

        self.database
            .save_all_tokens(&[
                IssuedToken::new(
                    user.id,
                    access_token.clone(),
                    TokenKind::Access,
                    access_expiry,
                ),
                IssuedToken::new(
                    user.id,
                    refresh_token.clone(),
                    TokenKind::Refresh,
                    refresh_expiry,
                ),
            ])
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_at: access_expiry,
        })
    }
}

/// Strip the bearer prefix from an authorization header
fn bearer_token(authorization_header: Option<&str>) -> Result<&str, SessionError> {
    authorization_header
        .and_then(|header| header.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or(SessionError::InvalidAuthHeader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def")).unwrap(), "abc.def");
        assert!(bearer_token(Some("token-without-bearer-prefix")).is_err());
        assert!(bearer_token(Some("Bearer ")).is_err());
        assert!(bearer_token(None).is_err());
    }
}
