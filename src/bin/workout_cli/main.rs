// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors
// ABOUTME: workout-cli - maintenance tool for the workout manager database
// ABOUTME: Creates administrators, removes stale guest accounts and runs the reminder jobs
//!
//! Usage:
//! ```bash
//! # Create an administrator
//! workout-cli user create-admin --username admin --email admin@example.com --password secret123
//!
//! # Delete guest accounts older than the configured age
//! workout-cli user delete-temporary
//!
//! # Send workout and weight reminders
//! workout-cli job email-reminders
//!
//! # Report inactive gym members to their trainers
//! workout-cli job inactive-members
//! ```

mod commands;
mod helpers;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use workout_manager::{
    config::{DatabaseUrl, ServerConfig},
    constants::service_names,
    database::Database,
    logging::LoggingConfig,
};

#[derive(Parser)]
#[command(
    name = "workout-cli",
    about = "Workout Manager maintenance CLI",
    long_about = "Command-line tool for administrator accounts, guest cleanup and scheduled jobs."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Account management
    User {
        #[command(subcommand)]
        action: UserCommand,
    },

    /// Scheduled jobs
    Job {
        #[command(subcommand)]
        action: JobCommand,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum UserCommand {
    /// Create an administrator account
    CreateAdmin {
        /// Login name
        #[arg(long)]
        username: String,

        /// Contact address
        #[arg(long)]
        email: Option<String>,

        /// Initial password
        #[arg(long)]
        password: String,

        /// Promote the account if it already exists
        #[arg(long)]
        force: bool,
    },

    /// Delete guest accounts older than the given age
    DeleteTemporary {
        /// Maximum age in days, defaults to `TEMP_USER_MAX_AGE_DAYS`
        #[arg(long)]
        max_age_days: Option<i64>,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum JobCommand {
    /// Remind users about expiring workouts and missing weight entries
    EmailReminders {
        /// Skip workout reminders
        #[arg(long)]
        skip_workouts: bool,

        /// Skip weight reminders
        #[arg(long)]
        skip_weight: bool,
    },

    /// Send trainers the list of inactive members of their gym
    InactiveMembers,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    logging.service_name = service_names::WORKOUT_CLI.to_owned();
    if cli.verbose {
        "debug".clone_into(&mut logging.level);
    }
    logging.init()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(url) = cli.database_url {
        config.database.url = DatabaseUrl::parse_url(&url);
    }

    let database_url = config.database.url.to_connection_string();
    info!("Connecting to database: {database_url}");
    let database = Database::new(&database_url).await?;

    match cli.command {
        Command::User { action } => match action {
            UserCommand::CreateAdmin {
                username,
                email,
                password,
                force,
            } => {
                commands::users::create_admin(&database, &config, username, email, password, force)
                    .await?;
            }
            UserCommand::DeleteTemporary { max_age_days } => {
                let max_age_days = max_age_days.unwrap_or(config.temp_user_max_age_days);
                commands::users::delete_temporary(&database, max_age_days).await?;
            }
        },
        Command::Job { action } => match action {
            JobCommand::EmailReminders {
                skip_workouts,
                skip_weight,
            } => {
                commands::jobs::email_reminders(&database, !skip_workouts, !skip_weight).await?;
            }
            JobCommand::InactiveMembers => {
                commands::jobs::inactive_members(&database).await?;
            }
        },
    }

    Ok(())
}
