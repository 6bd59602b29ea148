// ABOUTME: Demo data generation for local development and manual testing
// ABOUTME: Creates demo users with workouts, training logs, nutrition plans and weight history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

//! Demo data
//!
//! Generation is deterministic for a given seed. A small exercise and
//! ingredient catalogue is created when the database has none, so a fresh
//! database becomes usable straight away.

use crate::auth::AuthManager;
use crate::database::users::NewUser;
use crate::database::{Database, ExerciseFilter, IngredientFilter};
use crate::errors::{AppError, AppResult};
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;
use workout_core::constants::energy;
use workout_core::models::{
    Day, DayOfWeek, Exercise, ExerciseSet, Ingredient, Meal, MealItem, ModerationStatus,
    NutritionPlan, Setting, User, WorkoutLog,
};
use workout_core::permissions::UserRole;

/// Password of every demo account
pub const DEMO_USER_PASSWORD: &str = "DemoUser123!";

/// Exercise name and category
const DEMO_EXERCISES: &[(&str, &str)] = &[
    ("Bench Press", "Chest"),
    ("Incline Dumbbell Press", "Chest"),
    ("Squat", "Legs"),
    ("Romanian Deadlift", "Legs"),
    ("Leg Press", "Legs"),
    ("Pull Up", "Back"),
    ("Barbell Row", "Back"),
    ("Overhead Press", "Shoulders"),
    ("Lateral Raise", "Shoulders"),
    ("Biceps Curl", "Arms"),
    ("Triceps Pushdown", "Arms"),
    ("Plank", "Abs"),
];

/// Ingredient name with protein, carbohydrates and fat per 100 g
const DEMO_INGREDIENTS: &[(&str, f64, f64, f64)] = &[
    ("Oats", 13.5, 58.7, 7.0),
    ("Whole Milk", 3.4, 4.8, 3.6),
    ("Chicken Breast", 23.0, 0.0, 1.5),
    ("Brown Rice", 2.6, 23.0, 0.9),
    ("Broccoli", 2.8, 4.0, 0.4),
    ("Banana", 1.1, 22.8, 0.3),
    ("Eggs", 12.6, 0.7, 9.5),
    ("Olive Oil", 0.0, 0.0, 100.0),
    ("Greek Yogurt", 10.0, 3.6, 0.4),
    ("Salmon", 20.0, 0.0, 13.0),
];

const DEMO_MEALS: &[(&str, u32)] = &[("Breakfast", 7), ("Lunch", 12), ("Dinner", 19)];

/// How much to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoDataOptions {
    /// Demo accounts
    pub users: usize,
    /// Workouts per account
    pub workouts: usize,
    /// Nutrition plans per account
    pub nutrition_plans: usize,
    /// Daily weight entries per account, ending today
    pub weight_entries: usize,
    /// Random seed
    pub seed: u64,
}

impl Default for DemoDataOptions {
    fn default() -> Self {
        Self {
            users: 3,
            workouts: 2,
            nutrition_plans: 1,
            weight_entries: 30,
            seed: 42,
        }
    }
}

/// Rows created by a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DemoSummary {
    /// Accounts created
    pub users: usize,
    /// Catalogue exercises created
    pub exercises: usize,
    /// Catalogue ingredients created
    pub ingredients: usize,
    /// Workouts created
    pub workouts: usize,
    /// Training log entries created
    pub logs: usize,
    /// Nutrition plans created
    pub nutrition_plans: usize,
    /// Weight entries created
    pub weight_entries: usize,
}

/// Populate the database with demo data
///
/// Existing demo accounts are reused, so running twice adds more workouts and
/// plans without failing on duplicate usernames.
///
/// # Errors
///
/// Returns an error if a database operation or password hashing fails
pub async fn seed_demo_data(
    database: &Database,
    auth_manager: &AuthManager,
    options: &DemoDataOptions,
    today: NaiveDate,
) -> AppResult<DemoSummary> {
    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut summary = DemoSummary::default();

    let exercises = ensure_exercises(database, &mut summary).await?;
    let ingredients = ensure_ingredients(database, &mut summary).await?;
    let password_hash = auth_manager.hash_password(DEMO_USER_PASSWORD).await?;

    for index in 1..=options.users {
        let user = demo_user(database, index, &password_hash, &mut summary).await?;

        for number in 1..=options.workouts {
            seed_workout(database, &user, number, &exercises, today, &mut rng, &mut summary).await?;
        }
        for number in 1..=options.nutrition_plans {
            seed_nutrition_plan(database, &user, number, &ingredients, &mut rng).await?;
            summary.nutrition_plans += 1;
        }
        summary.weight_entries +=
            seed_weight_entries(database, &user, options.weight_entries, today, &mut rng).await?;

        debug!(username = %user.username, "Seeded demo user");
    }

    info!(
        users = summary.users,
        workouts = summary.workouts,
        logs = summary.logs,
        nutrition_plans = summary.nutrition_plans,
        weight_entries = summary.weight_entries,
        "Demo data generated"
    );
    Ok(summary)
}

async fn demo_user(
    database: &Database,
    index: usize,
    password_hash: &str,
    summary: &mut DemoSummary,
) -> AppResult<User> {
    let users = database.users();
    let username = format!("demo-user-{index}");
    if let Some(existing) = users.get_user_by_login(&username).await? {
        return Ok(existing);
    }
    let user = users
        .create_user(&NewUser {
            username: username.clone(),
            email: Some(format!("{username}@example.com")),
            password_hash: password_hash.to_owned(),
            role: UserRole::User,
            is_temporary: false,
        })
        .await?;
    summary.users += 1;
    Ok(user)
}

// ============================================================================
// Catalogue
// ============================================================================

async fn ensure_exercises(
    database: &Database,
    summary: &mut DemoSummary,
) -> AppResult<Vec<Exercise>> {
    let manager = database.exercises();
    let accepted = ExerciseFilter {
        status: Some(ModerationStatus::Accepted),
        ..ExerciseFilter::default()
    };
    let existing = manager.list_exercises(&accepted).await?;
    if !existing.is_empty() {
        return Ok(existing);
    }

    let language = manager.default_language().await?;
    let mut categories = manager.list_categories().await?;
    let mut created = Vec::with_capacity(DEMO_EXERCISES.len());
    for (name, category_name) in DEMO_EXERCISES {
        let category = match categories.iter().find(|c| c.name == *category_name) {
            Some(category) => category.clone(),
            None => {
                let category = manager.create_category(category_name).await?;
                categories.push(category.clone());
                category
            }
        };
        let exercise = Exercise {
            id: Uuid::new_v4(),
            name: (*name).to_owned(),
            description: String::new(),
            category_id: category.id,
            language_id: language.id,
            muscles: Vec::new(),
            muscles_secondary: Vec::new(),
            equipment: Vec::new(),
            status: ModerationStatus::Accepted,
            license_author: None,
            author_id: None,
            created_at: Utc::now(),
        };
        manager.create_exercise(&exercise).await?;
        created.push(exercise);
    }
    summary.exercises = created.len();
    Ok(created)
}

async fn ensure_ingredients(
    database: &Database,
    summary: &mut DemoSummary,
) -> AppResult<Vec<Ingredient>> {
    let manager = database.ingredients();
    let accepted = IngredientFilter {
        status: Some(ModerationStatus::Accepted),
        ..IngredientFilter::default()
    };
    let existing = manager.list_ingredients(&accepted).await?;
    if !existing.is_empty() {
        return Ok(existing);
    }

    let language = database.exercises().default_language().await?;
    let mut created = Vec::with_capacity(DEMO_INGREDIENTS.len());
    for (name, protein, carbohydrates, fat) in DEMO_INGREDIENTS {
        let now = Utc::now();
        let ingredient = Ingredient {
            id: Uuid::new_v4(),
            language_id: language.id,
            name: (*name).to_owned(),
            energy: (protein * energy::KCAL_PER_G_PROTEIN
                + carbohydrates * energy::KCAL_PER_G_CARBOHYDRATES
                + fat * energy::KCAL_PER_G_FAT)
                .round(),
            protein: *protein,
            carbohydrates: *carbohydrates,
            carbohydrates_sugar: None,
            fat: *fat,
            fat_saturated: None,
            fibre: None,
            sodium: None,
            status: ModerationStatus::Accepted,
            license_author: None,
            author_id: None,
            created_at: now,
            updated_at: now,
        };
        manager.create_ingredient(&ingredient).await?;
        created.push(ingredient);
    }
    summary.ingredients = created.len();
    Ok(created)
}

// ============================================================================
// Per-user data
// ============================================================================

const TRAINING_DAYS: &[&[DayOfWeek]] = &[
    &[DayOfWeek::Monday, DayOfWeek::Thursday],
    &[DayOfWeek::Tuesday, DayOfWeek::Friday],
    &[DayOfWeek::Wednesday, DayOfWeek::Saturday],
];

async fn seed_workout(
    database: &Database,
    user: &User,
    number: usize,
    exercises: &[Exercise],
    today: NaiveDate,
    rng: &mut StdRng,
    summary: &mut DemoSummary,
) -> AppResult<()> {
    let workouts = database.workouts();
    let workout = workouts
        .create_workout(user.id, &format!("Demo Routine {number}"))
        .await?;
    summary.workouts += 1;

    for (day_index, days_of_week) in TRAINING_DAYS.iter().enumerate() {
        let day = Day {
            id: Uuid::new_v4(),
            workout_id: workout.id,
            description: format!("Training day {}", day_index + 1),
            days_of_week: days_of_week.to_vec(),
        };
        workouts.create_day(&day).await?;

        let picked: Vec<&Exercise> = exercises.choose_multiple(rng, 3).collect();
        for (order, exercise) in (1_u32..).zip(picked) {
            let set = ExerciseSet {
                id: Uuid::new_v4(),
                day_id: day.id,
                order,
                sets: 4,
                exercises: vec![exercise.id],
            };
            workouts.create_set(&set).await?;

            let reps = rng.gen_range(6..=12);
            let weight = f64::from(rng.gen_range(8_u32..=40)) * 2.5;
            workouts
                .create_setting(&Setting {
                    id: Uuid::new_v4(),
                    set_id: set.id,
                    exercise_id: exercise.id,
                    reps,
                    weight: Some(weight),
                    rir: Some(2.0),
                    order: 1,
                    comment: String::new(),
                })
                .await?;

            // Two weeks of history, slightly lighter in the past
            for weeks_ago in 1..=2 {
                let log = WorkoutLog {
                    id: Uuid::new_v4(),
                    user_id: user.id,
                    workout_id: workout.id,
                    exercise_id: exercise.id,
                    reps,
                    weight: weight - 2.5 * f64::from(weeks_ago),
                    rir: Some(2.0),
                    date: today - Duration::weeks(i64::from(weeks_ago)),
                };
                database.logs().create_log(&log).await?;
                summary.logs += 1;
            }
        }
    }
    Ok(())
}

async fn seed_nutrition_plan(
    database: &Database,
    user: &User,
    number: usize,
    ingredients: &[Ingredient],
    rng: &mut StdRng,
) -> AppResult<()> {
    let nutrition = database.nutrition();
    let plan = NutritionPlan {
        id: Uuid::new_v4(),
        user_id: user.id,
        description: format!("Demo Plan {number}"),
        created: Utc::now().date_naive(),
        has_goal_calories: false,
    };
    nutrition.create_plan(&plan).await?;

    for (order, (name, hour)) in (1_u32..).zip(DEMO_MEALS) {
        let meal = Meal {
            id: Uuid::new_v4(),
            plan_id: plan.id,
            order,
            time: NaiveTime::from_hms_opt(*hour, 0, 0),
            name: (*name).to_owned(),
        };
        nutrition.create_meal(&meal).await?;

        for (item_order, ingredient) in (1_u32..).zip(ingredients.choose_multiple(rng, 2)) {
            nutrition
                .create_item(&MealItem {
                    id: Uuid::new_v4(),
                    meal_id: meal.id,
                    ingredient_id: ingredient.id,
                    weight_unit_id: None,
                    order: item_order,
                    amount: f64::from(rng.gen_range(5_u32..=30)) * 10.0,
                })
                .await?;
        }
    }
    Ok(())
}

async fn seed_weight_entries(
    database: &Database,
    user: &User,
    count: usize,
    today: NaiveDate,
    rng: &mut StdRng,
) -> AppResult<usize> {
    if count == 0 {
        return Ok(0);
    }
    let mut weight: f64 = rng.gen_range(65.0..95.0);
    let mut rows = Vec::with_capacity(count);
    let days =
        i64::try_from(count).map_err(|_| AppError::invalid_input("Too many weight entries"))?;
    for days_ago in (0..days).rev() {
        weight += rng.gen_range(-0.4..0.35);
        let date = today - Duration::days(days_ago);
        rows.push((date, (weight * 10.0).round() / 10.0));
    }
    let report = database.weight().import_entries(user.id, &rows).await?;
    Ok(report.imported)
}
