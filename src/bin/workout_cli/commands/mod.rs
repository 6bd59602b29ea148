// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors
// ABOUTME: Re-exports command modules for workout-cli
// ABOUTME: Provides access to account management and scheduled job commands

pub mod jobs;
pub mod users;
