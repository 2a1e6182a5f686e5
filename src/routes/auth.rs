// ABOUTME: Authentication route handlers for signup, login, authenticate, refresh, logout
// ABOUTME: Maps session lifecycle outcomes to HTTP status codes and JSON bodies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atlas Gym Platform

//! Authentication and session endpoints

use super::{authorization_header, map_session_error, AppState};
use crate::errors::AppError;
use crate::models::UserRole;
use crate::sessions::{LoginOutcome, RefreshOutcome, TokenPair};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request body for user signup
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Chosen password
    pub password: String,
}

/// Response after successful signup
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    /// The allocated username
    pub username: String,
    /// Access token for immediate use
    pub access_token: String,
    /// Refresh token
    pub refresh_token: String,
    /// Access token expiry (RFC 3339)
    pub expires_at: String,
}

/// Request body for login and authenticate
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username (`first.last.N`)
    pub username: String,
    /// Password
    pub password: String,
}

/// Token pair returned by login and authenticate
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Access token
    pub access_token: String,
    /// Refresh token
    pub refresh_token: String,
    /// Access token expiry (RFC 3339)
    pub expires_at: String,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_at: pair.expires_at.to_rfc3339(),
        }
    }
}

/// Response after a successful refresh
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// Owner of the session
    pub username: String,
    /// Newly issued access token
    pub access_token: String,
    /// The refresh token, unchanged
    pub refresh_token: String,
    /// New access token expiry (RFC 3339)
    pub expires_at: String,
}

/// Authentication routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/auth/signup", post(Self::handle_signup))
            .route("/auth/login", post(Self::handle_login))
            .route("/auth/authenticate", post(Self::handle_authenticate))
            .route("/auth/refresh", post(Self::handle_refresh))
            .route("/auth/logout", post(Self::handle_logout))
            .with_state(state)
    }

    /// Handle user signup
    async fn handle_signup(
        State(state): State<Arc<AppState>>,
        Json(request): Json<SignupRequest>,
    ) -> Result<Response, AppError> {
        let result = state
            .sessions
            .signup(
                &request.first_name,
                &request.last_name,
                &request.password,
                UserRole::Trainee,
            )
            .await
            .map_err(map_session_error)?;

        Ok((
            StatusCode::CREATED,
            Json(SignupResponse {
                username: result.username,
                access_token: result.tokens.access_token,
                refresh_token: result.tokens.refresh_token,
                expires_at: result.tokens.expires_at.to_rfc3339(),
            }),
        )
            .into_response())
    }

    /// Handle lightweight login (prior sessions stay valid)
    async fn handle_login(
        State(state): State<Arc<AppState>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        match state
            .sessions
            .login(&request.username, &request.password)
            .await
            .map_err(map_session_error)?
        {
            LoginOutcome::LoggedIn(pair) => {
                Ok((StatusCode::OK, Json(TokenResponse::from(pair))).into_response())
            }
            LoginOutcome::InvalidCredentials => {
                Ok(AppError::auth_invalid("Invalid username or password").into_response())
            }
        }
    }

    /// Handle session-establishing authentication (revokes prior sessions)
    async fn handle_authenticate(
        State(state): State<Arc<AppState>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let pair = state
            .sessions
            .authenticate(&request.username, &request.password)
            .await
            .map_err(map_session_error)?;

        Ok((StatusCode::OK, Json(TokenResponse::from(pair))).into_response())
    }

    /// Handle access token refresh
    async fn handle_refresh(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        match state
            .sessions
            .refresh(authorization_header(&headers))
            .await
            .map_err(map_session_error)?
        {
            RefreshOutcome::Refreshed(tokens) => Ok((
                StatusCode::OK,
                Json(RefreshResponse {
                    username: tokens.username,
                    access_token: tokens.access_token,
                    refresh_token: tokens.refresh_token,
                    expires_at: tokens.expires_at.to_rfc3339(),
                }),
            )
                .into_response()),
            RefreshOutcome::InvalidToken => {
                Ok(AppError::auth_invalid("Token is invalid or expired").into_response())
            }
        }
    }

    /// Handle logout
    ///
    /// Always answers 200 with a plain-text confirmation, whether or not a
    /// matching token record existed.
    async fn handle_logout(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        state
            .sessions
            .logout(authorization_header(&headers))
            .await
            .map_err(map_session_error)?;

        Ok((StatusCode::OK, "Logout successful").into_response())
    }
}
