// ABOUTME: Password hashing, verification, and initial-password generation
// ABOUTME: Wraps bcrypt and the system CSPRNG behind a small credential API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atlas Gym Platform

//! Credential verification
//!
//! Passwords are stored as bcrypt hashes. Generated initial passwords are
//! drawn from the system CSPRNG; a newly self-registered member has no other
//! credential, so a predictable generator here would undermine every account
//! it seeded.

use crate::constants::limits::GENERATED_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};
use ring::rand::{SecureRandom, SystemRandom};

const PASSWORD_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

// Largest multiple of the alphabet size below 256; bytes at or above this
// are rejected so the modulo below stays uniform.
const REJECTION_BOUND: u8 = (u8::MAX / 62) * 62;

/// Hash a raw password for storage
///
/// # Errors
///
/// Returns an error if bcrypt hashing fails
pub fn hash_password(raw_password: &str) -> AppResult<String> {
    bcrypt::hash(raw_password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
}

/// Verify a raw password against a stored hash
///
/// # Errors
///
/// Returns an error if the stored hash is not a valid bcrypt string
pub fn verify_password(raw_password: &str, stored_hash: &str) -> AppResult<bool> {
    bcrypt::verify(raw_password, stored_hash)
        .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))
}

/// Generate a fixed-length alphanumeric initial password
///
/// # Errors
///
/// Returns an error if the system RNG fails - registration cannot proceed
/// securely without working randomness
pub fn generate_random_password() -> AppResult<String> {
    let rng = SystemRandom::new();
    let mut password = String::with_capacity(GENERATED_PASSWORD_LENGTH);

    while password.len() < GENERATED_PASSWORD_LENGTH {
        let mut byte = [0u8; 1];
        rng.fill(&mut byte).map_err(|_| {
            tracing::error!("CRITICAL: system RNG failure while generating initial password");
            AppError::internal("System RNG failure - cannot generate initial password")
        })?;

        if byte[0] < REJECTION_BOUND {
            let index = usize::from(byte[0]) % PASSWORD_ALPHABET.len();
            password.push(char::from(PASSWORD_ALPHABET[index]));
        }
    }

    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("gryffindor").unwrap();
        assert!(verify_password("gryffindor", &hash).unwrap());
        assert!(!verify_password("slytherin", &hash).unwrap());
    }

    #[test]
    fn test_generated_password_shape() {
        let password = generate_random_password().unwrap();
        assert_eq!(password.len(), GENERATED_PASSWORD_LENGTH);
        assert!(password.bytes().all(|b| PASSWORD_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_generated_passwords_differ() {
        let first = generate_random_password().unwrap();
        let second = generate_random_password().unwrap();
        assert_ne!(first, second);
    }
}
