// ABOUTME: Demo data seeder for the workout manager
// ABOUTME: Creates demo accounts with workouts, logs, nutrition plans and weight history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

//! Demo data seeder for the workout manager.
//!
//! Every demo account uses the password `DemoUser123!`.
//!
//! Usage:
//! ```bash
//! # Seed with default settings
//! cargo run --bin seed-demo-data
//!
//! # More users and a longer weight history
//! cargo run --bin seed-demo-data -- --users 10 --weight-entries 90
//!
//! # Verbose output
//! cargo run --bin seed-demo-data -- -v
//! ```

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing::info;
use workout_manager::{
    auth::{generate_jwt_secret, AuthManager},
    config::{DatabaseUrl, ServerConfig},
    database::Database,
    demo_data::{seed_demo_data, DemoDataOptions, DEMO_USER_PASSWORD},
    logging::LoggingConfig,
};

#[derive(Parser)]
#[command(
    name = "seed-demo-data",
    about = "Workout Manager Demo Data Seeder",
    long_about = "Populate the database with demo accounts and realistic training and nutrition data"
)]
struct SeedArgs {
    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,

    /// Number of demo accounts
    #[arg(long, default_value = "3")]
    users: usize,

    /// Workouts per account
    #[arg(long, default_value = "2")]
    workouts: usize,

    /// Nutrition plans per account
    #[arg(long, default_value = "1")]
    nutrition_plans: usize,

    /// Days of weight history per account
    #[arg(long, default_value = "30")]
    weight_entries: usize,

    /// Random seed for reproducible data
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = SeedArgs::parse();

    let mut logging = LoggingConfig::from_env();
    if args.verbose {
        "debug".clone_into(&mut logging.level);
    }
    logging.init()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(url) = &args.database_url {
        config.database.url = DatabaseUrl::parse_url(url);
    }
    let database_url = config.database.url.to_connection_string();
    info!("Seeding demo data into {database_url}");

    let database = Database::new(&database_url).await?;
    let auth_manager = AuthManager::new(
        generate_jwt_secret().as_bytes(),
        config.auth.jwt_expiry_hours,
        config.auth.bcrypt_cost,
    );

    let options = DemoDataOptions {
        users: args.users,
        workouts: args.workouts,
        nutrition_plans: args.nutrition_plans,
        weight_entries: args.weight_entries,
        seed: args.seed,
    };
    let summary =
        seed_demo_data(&database, &auth_manager, &options, Utc::now().date_naive()).await?;

    println!("\nDemo data generated");
    println!("{}", "=".repeat(50));
    println!("   Users created:       {}", summary.users);
    println!("   Catalog exercises:   {}", summary.exercises);
    println!("   Catalog ingredients: {}", summary.ingredients);
    println!("   Workouts:            {}", summary.workouts);
    println!("   Log entries:         {}", summary.logs);
    println!("   Nutrition plans:     {}", summary.nutrition_plans);
    println!("   Weight entries:      {}", summary.weight_entries);
    println!("\nLog in as demo-user-1 with password {DEMO_USER_PASSWORD}");
    Ok(())
}
