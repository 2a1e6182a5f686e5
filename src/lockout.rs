// ABOUTME: Brute-force protection interface consulted around authentication attempts
// ABOUTME: Defines the LoginGuard trait and a permissive default implementation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atlas Gym Platform

//! # Brute-Force Guard
//!
//! The session lifecycle manager notifies an external protection service
//! before and after every `authenticate` attempt. Lockout policy lives in
//! that service; this module only defines the call points.

use crate::errors::AppResult;

/// Hook consulted around each credential-based authentication attempt
pub trait LoginGuard: Send + Sync {
    /// Called before the credential check; an error refuses the attempt
    ///
    /// # Errors
    ///
    /// Returns an error when the guard refuses the attempt (e.g. the
    /// username is currently locked out)
    fn before_attempt(&self, username: &str) -> AppResult<()>;

    /// Called after the credential check with the attempt's outcome
    fn record_outcome(&self, username: &str, success: bool);
}

/// Guard that permits every attempt and only logs outcomes
pub struct AllowAllGuard;

impl LoginGuard for AllowAllGuard {
    fn before_attempt(&self, _username: &str) -> AppResult<()> {
        Ok(())
    }

    fn record_outcome(&self, username: &str, success: bool) {
        if !success {
            tracing::warn!("Failed authentication attempt for user: {username}");
        }
    }
}
