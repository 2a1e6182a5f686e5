// ABOUTME: Main library entry point for the Atlas Gym Platform API
// ABOUTME: Gym management with bearer-token session lifecycle at its core
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atlas Gym Platform

#![deny(unsafe_code)]

//! # Atlas Gym Server
//!
//! A multi-tenant gym-management API (trainees, trainers, training
//! sessions) backed by a relational store. The heart of the crate is the
//! session/token lifecycle: signup, login, authenticate, refresh, and
//! logout, built around issuance, rotation, and revocation of bearer
//! tokens tied to a user identity.
//!
//! ## Architecture
//!
//! - **Sessions**: the lifecycle manager orchestrating every operation and
//!   owning all token-state transitions
//! - **Auth**: the storage-independent token codec (signed JWTs)
//! - **Credentials**: password hashing and initial-password generation
//! - **Usernames**: collision-free `first.last.N` allocation
//! - **Database**: sqlx-backed user and append-only token stores
//! - **Routes**: the axum boundary that owns every HTTP concept
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use atlas_gym_server::config::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Atlas Gym Server configured with port: {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Token codec for signed, time-bounded bearer tokens
pub mod auth;

/// Environment-based configuration management
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Password hashing, verification, and generation
pub mod credentials;

/// User and token storage
pub mod database;

/// Unified error handling system with standard error codes
pub mod errors;

/// Brute-force protection interface
pub mod lockout;

/// Production logging and structured output
pub mod logging;

/// Common data models for users and tokens
pub mod models;

/// HTTP routes and boundary mapping
pub mod routes;

/// Session lifecycle management
pub mod sessions;

/// Collision-free username allocation
pub mod usernames;
