// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors
// ABOUTME: Re-exports helper modules for workout-cli
// ABOUTME: Provides access to console display formatting

pub mod display;
