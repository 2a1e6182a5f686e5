// ABOUTME: Trainee and trainer registration plus profile management endpoints
// ABOUTME: Registration generates an initial password and funnels through signup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atlas Gym Platform

//! Member management routes
//!
//! Trainee and trainer registration both funnel through the session
//! lifecycle manager's signup, so they share the username allocator and its
//! collision handling. Registration generates the member's initial password;
//! the response body is the only place it ever appears in plain text.

use super::{authorization_header, map_session_error, AppState};
use crate::credentials;
use crate::errors::AppError;
use crate::models::UserRole;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request body for trainee/trainer registration
#[derive(Debug, Deserialize)]
pub struct RegisterMemberRequest {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
}

/// Response after successful registration
#[derive(Debug, Serialize)]
pub struct RegisterMemberResponse {
    /// The allocated username
    pub username: String,
    /// Generated initial password
    pub password: String,
    /// Access token for immediate use
    pub access_token: String,
    /// Refresh token
    pub refresh_token: String,
    /// Access token expiry (RFC 3339)
    pub expires_at: String,
}

/// Profile payload for the authenticated user
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// Username
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Account role
    pub role: String,
    /// Whether the account is active
    pub is_active: bool,
}

/// Request body for password changes
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    /// The password being replaced
    pub current_password: String,
    /// The new password
    pub new_password: String,
}

/// Request body for activation toggling
#[derive(Debug, Deserialize)]
pub struct ActivationRequest {
    /// Desired active state
    pub active: bool,
}

/// Member management routes
pub struct MemberRoutes;

impl MemberRoutes {
    /// Create all member management routes
    pub fn routes(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/trainees", post(Self::handle_register_trainee))
            .route("/trainers", post(Self::handle_register_trainer))
            .route("/profile", get(Self::handle_get_profile))
            .route("/profile/password", put(Self::handle_change_password))
            .route("/profile/activation", patch(Self::handle_set_activation))
            .with_state(state)
    }

    /// Register a new trainee
    async fn handle_register_trainee(
        State(state): State<Arc<AppState>>,
        Json(request): Json<RegisterMemberRequest>,
    ) -> Result<Response, AppError> {
        Self::register(&state, request, UserRole::Trainee).await
    }

    /// Register a new trainer
    async fn handle_register_trainer(
        State(state): State<Arc<AppState>>,
        Json(request): Json<RegisterMemberRequest>,
    ) -> Result<Response, AppError> {
        Self::register(&state, request, UserRole::Trainer).await
    }

    /// Shared registration path for both member kinds
    async fn register(
        state: &Arc<AppState>,
        request: RegisterMemberRequest,
        role: UserRole,
    ) -> Result<Response, AppError> {
        if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
            return Err(AppError::invalid_input("First and last name are required"));
        }

        let password = credentials::generate_random_password()?;
        let result = state
            .sessions
            .signup(&request.first_name, &request.last_name, &password, role)
            .await
            .map_err(map_session_error)?;

        Ok((
            StatusCode::CREATED,
            Json(RegisterMemberResponse {
                username: result.username,
                password,
                access_token: result.tokens.access_token,
                refresh_token: result.tokens.refresh_token,
                expires_at: result.tokens.expires_at.to_rfc3339(),
            }),
        )
            .into_response())
    }

    /// Fetch the authenticated user's profile
    async fn handle_get_profile(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = state
            .sessions
            .authorize(authorization_header(&headers))
            .await
            .map_err(map_session_error)?;

        Ok((
            StatusCode::OK,
            Json(ProfileResponse {
                username: user.username,
                first_name: user.first_name,
                last_name: user.last_name,
                role: user.role.to_string(),
                is_active: user.is_active,
            }),
        )
            .into_response())
    }

    /// Change the authenticated user's password
    async fn handle_change_password(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
        Json(request): Json<ChangePasswordRequest>,
    ) -> Result<Response, AppError> {
        let user = state
            .sessions
            .authorize(authorization_header(&headers))
            .await
            .map_err(map_session_error)?;

        state
            .sessions
            .change_password(&user, &request.current_password, &request.new_password)
            .await
            .map_err(map_session_error)?;

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Activate or deactivate the authenticated user's account
    async fn handle_set_activation(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
        Json(request): Json<ActivationRequest>,
    ) -> Result<Response, AppError> {
        let user = state
            .sessions
            .authorize(authorization_header(&headers))
            .await
            .map_err(map_session_error)?;

        state
            .sessions
            .set_activation(&user, request.active)
            .await
            .map_err(map_session_error)?;

        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
