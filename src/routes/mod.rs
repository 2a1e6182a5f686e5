// ABOUTME: HTTP boundary layer mapping typed core outcomes to status codes and bodies
// ABOUTME: Owns shared router state and the SessionError-to-HTTP translation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atlas Gym Platform

//! HTTP routes for the Atlas Gym Server
//!
//! Handlers translate between wire DTOs and the session lifecycle manager.
//! Every status code and human-readable message is selected here; the core
//! returns typed outcomes and never sees an HTTP concept.

/// Authentication and session endpoints
pub mod auth;

/// Health check endpoints
pub mod health;

/// Trainee/trainer registration and profile endpoints
pub mod members;

use crate::errors::AppError;
use crate::sessions::{SessionError, SessionManager};
use axum::http::HeaderMap;

/// Shared state for all route handlers
pub struct AppState {
    /// The session lifecycle manager
    pub sessions: SessionManager,
}

/// Map a typed lifecycle failure to the boundary error that carries its
/// status code
pub(crate) fn map_session_error(err: SessionError) -> AppError {
    match err {
        SessionError::UserNotFound(username) => AppError::not_found(format!("User {username}")),
        SessionError::BadCredentials => AppError::auth_invalid("Invalid username or password"),
        SessionError::InvalidAuthHeader => {
            AppError::auth_malformed("Authorization header must be 'Bearer <token>'")
        }
        SessionError::UnknownSubject => {
            AppError::auth_malformed("Token subject could not be determined")
        }
        SessionError::InvalidToken => AppError::auth_invalid("Token is invalid or expired"),
        SessionError::DuplicateUser => AppError::new(
            crate::errors::ErrorCode::ResourceAlreadyExists,
            "Could not allocate a unique username",
        ),
        SessionError::Internal(app_error) => app_error,
    }
}

/// Pull the authorization header out of a request, if present
pub(crate) fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}
