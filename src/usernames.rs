// ABOUTME: Collision-free username allocation with numeric suffix disambiguation
// ABOUTME: Scans existing usernames for a first.last base and returns base.(max+1)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atlas Gym Platform

//! # Username Allocator
//!
//! Usernames have the shape `first.last.N`. Allocation is a pure read: the
//! caller writes the row, and the read-then-insert pair is not atomic. The
//! session lifecycle manager closes that race by retrying allocation when
//! the insert hits the store's uniqueness constraint.

use crate::database::Database;
use crate::errors::AppResult;

/// Allocates collision-free usernames against the user store
#[derive(Clone)]
pub struct UsernameAllocator {
    database: Database,
}

impl UsernameAllocator {
    /// Create an allocator backed by the given store
    #[must_use]
    pub const fn new(database: Database) -> Self {
        Self { database }
    }

    /// Allocate the next free username for a first/last name pair
    ///
    /// # Errors
    ///
    /// Returns an error if listing existing usernames fails; allocation has
    /// no fallback and the failure is fatal to the registration attempt
    pub async fn allocate(&self, first_name: &str, last_name: &str) -> AppResult<String> {
        let base = format!("{}.{}", first_name.trim(), last_name.trim());
        let existing = self
            .database
            .list_usernames_with_prefix(&format!("{base}."))
            .await?;
        Ok(next_in_sequence(&base, &existing))
    }
}

/// Compute `base.(max+1)` from the set of existing usernames
///
/// Only purely-numeric remainders after `base.` count as collisions;
/// anything else (other name parts, stray suffixes) is ignored.
fn next_in_sequence(base: &str, existing: &[String]) -> String {
    let prefix = format!("{base}.");
    let max_suffix = existing
        .iter()
        .filter_map(|username| username.strip_prefix(&prefix))
        .filter_map(|remainder| remainder.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("{prefix}{}", max_suffix + 1)
}
