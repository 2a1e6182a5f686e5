// ABOUTME: Application constants and configuration values
// ABOUTME: Centralizes token TTLs, retry caps, ports, and service identity strings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Atlas Gym Platform

//! Application-wide constants

/// Limits and operational caps
pub mod limits {
    /// Access token lifetime in hours
    pub const ACCESS_TOKEN_EXPIRY_HOURS: i64 = 1;

    /// Refresh token lifetime in hours
    pub const REFRESH_TOKEN_EXPIRY_HOURS: i64 = 24;

    /// How many times signup re-allocates a username after a storage
    /// uniqueness violation before giving up
    pub const MAX_USERNAME_ALLOCATION_RETRIES: u32 = 3;

    /// Length of generated initial passwords for self-registered members
    pub const GENERATED_PASSWORD_LENGTH: usize = 10;

    /// Size of a generated JWT signing secret in bytes
    pub const JWT_SECRET_LENGTH: usize = 64;
}

/// Service identity strings
pub mod service_names {
    /// Service name used in logs and startup banners
    pub const ATLAS_GYM_SERVER: &str = "atlas-gym-server";

    /// Audience claim stamped into every issued token
    pub const TOKEN_AUDIENCE: &str = "atlas-gym";

    /// Server version from Cargo metadata
    pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Default network ports
pub mod ports {
    /// Default HTTP port when `HTTP_PORT` is not set
    pub const DEFAULT_HTTP_PORT: u16 = 8081;
}
