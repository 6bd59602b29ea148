// ABOUTME: Configuration management module for the workout manager server
// ABOUTME: Exposes the environment driven ServerConfig and its sections
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

//! Configuration module
//!
//! All settings come from environment variables. Binaries may override a few
//! of them through command line flags.

/// Environment and server configuration
pub mod environment;

pub use environment::{AuthConfig, DatabaseConfig, DatabaseUrl, ServerConfig};
