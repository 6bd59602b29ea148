// ABOUTME: Integration tests for environment configuration and server resource setup
// ABOUTME: Env var tests run serially; file databases live in temporary directories
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use serial_test::serial;
use std::env;
use tempfile::TempDir;
use workout_core::permissions::UserRole;
use workout_manager::config::{DatabaseUrl, ServerConfig};
use workout_manager::database::users::NewUser;
use workout_manager::resources::ServerResources;

const VARS: [&str; 8] = [
    "HTTP_PORT",
    "DATABASE_URL",
    "AUTO_MIGRATE",
    "BCRYPT_COST",
    "JWT_SECRET",
    "JWT_EXPIRY_HOURS",
    "CORS_ALLOWED_ORIGINS",
    "TEMP_USER_MAX_AGE_DAYS",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_from_env_reads_variables() {
    clear_env();
    env::set_var("HTTP_PORT", "9100");
    env::set_var("DATABASE_URL", "sqlite:./data/test.db");
    env::set_var("JWT_EXPIRY_HOURS", "2");
    env::set_var("CORS_ALLOWED_ORIGINS", "http://a.example,http://b.example");

    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.http_port, 9100);
    assert_eq!(
        config.database.url.to_connection_string(),
        "sqlite:./data/test.db"
    );
    assert_eq!(config.auth.jwt_expiry_hours, 2);
    assert!(config.auth.jwt_secret.is_none());
    assert_eq!(
        config.cors_allowed_origins,
        vec!["http://a.example", "http://b.example"]
    );
}

#[test]
#[serial]
fn test_from_env_rejects_bad_values() {
    clear_env();
    env::set_var("HTTP_PORT", "not-a-port");
    assert!(ServerConfig::from_env().is_err());

    env::set_var("HTTP_PORT", "8000");
    env::set_var("JWT_EXPIRY_HOURS", "0");
    assert!(ServerConfig::from_env().is_err());

    env::set_var("JWT_EXPIRY_HOURS", "24");
    env::set_var("BCRYPT_COST", "2");
    assert!(ServerConfig::from_env().is_err());
    clear_env();
}

#[test]
fn test_summary_hides_secret() {
    let config = ServerConfig::for_testing();
    let summary = config.summary();
    assert!(summary.contains("from environment"));
    assert!(!summary.contains("test-secret-for-integration-tests"));
}

#[tokio::test]
async fn test_generated_secret_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("workouts.db");

    let mut config = ServerConfig::for_testing();
    config.database.url = DatabaseUrl::SQLite { path };
    config.auth.jwt_secret = None;

    let first = ServerResources::initialize(config.clone()).await.unwrap();
    let user = first
        .database
        .users()
        .create_user(&NewUser {
            username: "persistent".to_owned(),
            email: None,
            password_hash: first.auth_manager.hash_password("persistent-pass").await.unwrap(),
            role: UserRole::User,
            is_temporary: false,
        })
        .await
        .unwrap();
    let token = first.auth_manager.generate_token(&user).unwrap();
    drop(first);

    let second = ServerResources::initialize(config).await.unwrap();
    let claims = second.auth_manager.validate_token(&token.access_token).unwrap();
    assert_eq!(claims.user_id().unwrap(), user.id);
    assert!(second
        .database
        .users()
        .get_user_by_login("persistent")
        .await
        .unwrap()
        .is_some());
}
