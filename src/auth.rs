// ABOUTME: JWT token codec for signed, time-bounded bearer tokens
// ABOUTME: Handles token issuance, validation, and subject extraction independent of storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atlas Gym Platform

//! # Token Codec
//!
//! Generates and validates the signed token strings used for both access
//! and refresh credentials. Access and refresh tokens share one signing
//! algorithm (HS256) and differ only in TTL class, carried in the `use`
//! claim. The codec knows nothing about the token store; revocation state
//! is checked by the session lifecycle manager.

use crate::constants::limits::JWT_SECRET_LENGTH;
use crate::constants::service_names::TOKEN_AUDIENCE;
use crate::errors::{AppError, AppResult};
use crate::models::TokenKind;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Claims carried by every issued token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the owning username
    pub sub: String,
    /// Issued-at timestamp (milliseconds, made unique per issue)
    pub iat: i64,
    /// Expiration timestamp (seconds)
    pub exp: i64,
    /// Audience (who the token is intended for)
    pub aud: String,
    /// TTL class: `access` or `refresh`
    #[serde(rename = "use")]
    pub token_use: String,
}

/// Codec for issuing and validating signed bearer tokens
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_expiry_hours: i64,
    refresh_expiry_hours: i64,
    /// Monotonic counter to ensure unique issued-at times, so two tokens
    /// issued within the same second still differ as strings
    token_counter: AtomicU64,
}

impl TokenCodec {
    /// Create a new codec from a signing secret and TTL configuration
    #[must_use]
    pub fn new(secret: &[u8], access_expiry_hours: i64, refresh_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_expiry_hours,
            refresh_expiry_hours,
            token_counter: AtomicU64::new(0),
        }
    }

    /// Issue a signed token of the given TTL class for a subject
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn issue(&self, subject: &str, kind: TokenKind) -> AppResult<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let expiry_hours = match kind {
            TokenKind::Access => self.access_expiry_hours,
            TokenKind::Refresh => self.refresh_expiry_hours,
        };
        let expiry = now + Duration::hours(expiry_hours);

        // Atomic counter keeps issued-at unique across concurrent issues
        let counter = self.token_counter.fetch_add(1, Ordering::Relaxed);
        let unique_iat =
            now.timestamp() * 1000 + i64::from(u32::try_from(counter % 1000).unwrap_or(0));

        let claims = Claims {
            sub: subject.to_owned(),
            iat: unique_iat,
            exp: expiry.timestamp(),
            aud: TOKEN_AUDIENCE.to_owned(),
            token_use: kind.as_str().to_owned(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Token encoding failed: {e}")))?;

        Ok((token, expiry))
    }

    /// Issue an access token for a subject
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn issue_access(&self, subject: &str) -> AppResult<(String, DateTime<Utc>)> {
        self.issue(subject, TokenKind::Access)
    }

    /// Issue a refresh token for a subject
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn issue_refresh(&self, subject: &str) -> AppResult<(String, DateTime<Utc>)> {
        self.issue(subject, TokenKind::Refresh)
    }

    /// Validate a token against an expected subject
    ///
    /// Returns `false` for expired, garbled, wrong-signature, or
    /// wrong-subject tokens so callers can degrade gracefully.
    #[must_use]
    pub fn validate(&self, token: &str, expected_subject: &str) -> bool {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_audience(&[TOKEN_AUDIENCE]);

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(token_data) => token_data.claims.sub == expected_subject,
            Err(e) => {
                tracing::debug!("Token validation failed: {e}");
                false
            }
        }
    }

    /// Extract the subject from a token without checking expiry
    ///
    /// The signature is still verified; callers need the subject to look up
    /// the owning user and cannot reasonably continue without it.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is malformed or its signature does not
    /// verify
    pub fn extract_subject(&self, token: &str) -> AppResult<String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::auth_malformed(format!("Token is malformed: {e}")))?;

        Ok(token_data.claims.sub)
    }

    /// Read the TTL class claim from a token without checking expiry
    ///
    /// # Errors
    ///
    /// Returns an error if the token is malformed or carries an unknown
    /// `use` claim
    pub fn extract_kind(&self, token: &str) -> AppResult<TokenKind> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::auth_malformed(format!("Token is malformed: {e}")))?;

        token_data.claims.token_use.parse()
    }
}

/// Generate a random JWT signing secret
///
/// # Errors
///
/// Returns an error if the system RNG fails - this is a critical security
/// failure and the server cannot operate securely without working RNG
pub fn generate_jwt_secret() -> AppResult<[u8; JWT_SECRET_LENGTH]> {
    use ring::rand::{SecureRandom, SystemRandom};

    let rng = SystemRandom::new();
    let mut secret = [0u8; JWT_SECRET_LENGTH];

    rng.fill(&mut secret).map_err(|_| {
        tracing::error!("CRITICAL: failed to generate cryptographically secure JWT secret");
        AppError::internal("System RNG failure - cannot generate secure JWT secret")
    })?;

    Ok(secret)
}
