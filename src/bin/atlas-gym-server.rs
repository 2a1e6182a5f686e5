// ABOUTME: Server binary wiring configuration, logging, storage, and the HTTP boundary
// ABOUTME: Production entry point for the Atlas Gym Platform API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atlas Gym Platform

//! # Atlas Gym Server Binary
//!
//! Starts the gym-management API with user authentication, token lifecycle
//! management, and SQLite-backed storage.

use anyhow::Result;
use atlas_gym_server::{
    auth::TokenCodec,
    config::ServerConfig,
    database::Database,
    lockout::AllowAllGuard,
    logging,
    routes::{auth::AuthRoutes, health::HealthRoutes, members::MemberRoutes, AppState},
    sessions::SessionManager,
};
use clap::Parser;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[derive(Parser)]
#[command(name = "atlas-gym-server")]
#[command(about = "Atlas Gym Platform - Multi-tenant gym management API")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Container environments sometimes pass arguments clap cannot parse;
    // fall back to defaults rather than refusing to start
    let args = Args::try_parse().unwrap_or_else(|e| {
        eprintln!("Argument parsing failed: {e}");
        eprintln!("Using default configuration");
        Args { http_port: None }
    });

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env()?;

    info!("Starting Atlas Gym Server");
    info!("{}", config.summary());

    let database = Database::new(&config.database_url).await?;
    info!("Database initialized: {}", config.database_url);

    let codec = TokenCodec::new(
        &config.auth.jwt_secret,
        config.auth.access_token_expiry_hours,
        config.auth.refresh_token_expiry_hours,
    );
    let sessions = SessionManager::new(database, codec, Arc::new(AllowAllGuard));
    let state = Arc::new(AppState { sessions });

    let app = axum::Router::new()
        .merge(AuthRoutes::routes(state.clone()))
        .merge(MemberRoutes::routes(state))
        .merge(HealthRoutes::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.http_port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
