// ABOUTME: Body weight routes for entries and CSV import and export
// ABOUTME: Entries are unique per user and date in the owner's mass unit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use super::{authenticate, no_content, parse_id, require_read, require_write, today, OwnerQuery};
use crate::database::ImportReport;
use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use crate::weight_csv::{self, RowError};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use workout_core::constants::limits;
use workout_core::models::WeightEntry;

/// Weight entry fields
#[derive(Debug, Deserialize)]
pub struct WeightRequest {
    /// Measurement date, defaults to today
    pub date: Option<NaiveDate>,
    /// Weight in the user's unit
    pub weight: f64,
}

/// Entry listing filters, both bounds inclusive
#[derive(Debug, Default, Deserialize)]
pub struct WeightQuery {
    /// Whose entries, defaults to the caller
    pub user_id: Option<String>,
    /// Earliest date
    pub from: Option<NaiveDate>,
    /// Latest date
    pub to: Option<NaiveDate>,
}

/// Result of a CSV import
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    /// Rows written and dates skipped because they already had an entry
    #[serde(flatten)]
    pub report: ImportReport,
    /// Malformed rows
    pub errors: Vec<RowError>,
}

/// Weight routes
pub struct WeightRoutes;

impl WeightRoutes {
    /// Create the weight routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/v1/weight",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route("/api/v1/weight/import", post(Self::handle_import))
            .route("/api/v1/weight/export", get(Self::handle_export))
            .route(
                "/api/v1/weight/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    fn validate_weight(weight: f64) -> AppResult<()> {
        if (limits::MIN_BODY_WEIGHT..=limits::MAX_BODY_WEIGHT).contains(&weight) {
            Ok(())
        } else {
            Err(AppError::out_of_range(
                "weight",
                limits::MIN_BODY_WEIGHT,
                limits::MAX_BODY_WEIGHT,
            ))
        }
    }

    async fn load_entry(resources: &ServerResources, id: &str) -> AppResult<WeightEntry> {
        resources
            .database
            .weight()
            .get_entry(parse_id(id, "weight entry")?)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Weight entry {id}")))
    }

    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<WeightQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let owner_id = OwnerQuery {
            user_id: query.user_id,
        }
        .readable_owner(&resources, &auth)
        .await?;
        let entries = resources
            .database
            .weight()
            .list_entries(owner_id, query.from, query.to)
            .await?;
        Ok((StatusCode::OK, Json(entries)).into_response())
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<WeightRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        Self::validate_weight(body.weight)?;

        let entry = WeightEntry {
            id: Uuid::new_v4(),
            user_id: auth.user_id,
            date: body.date.unwrap_or_else(today),
            weight: body.weight,
        };
        resources.database.weight().create_entry(&entry).await?;
        Ok((StatusCode::CREATED, Json(entry)).into_response())
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let entry = Self::load_entry(&resources, &id).await?;
        require_read(&resources, &auth, entry.user_id).await?;
        Ok((StatusCode::OK, Json(entry)).into_response())
    }

    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(body): Json<WeightRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let mut entry = Self::load_entry(&resources, &id).await?;
        require_write(&resources, &auth, entry.user_id).await?;
        Self::validate_weight(body.weight)?;

        entry.weight = body.weight;
        if let Some(date) = body.date {
            entry.date = date;
        }
        resources.database.weight().update_entry(&entry).await?;
        Ok((StatusCode::OK, Json(entry)).into_response())
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let entry = Self::load_entry(&resources, &id).await?;
        require_write(&resources, &auth, entry.user_id).await?;
        resources.database.weight().delete_entry(entry.id).await?;
        Ok(no_content())
    }

    /// Handle POST /api/v1/weight/import
    ///
    /// The body is the raw CSV document. Valid rows are written in one
    /// transaction; malformed rows come back with their line numbers.
    async fn handle_import(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let parsed = weight_csv::parse(&body)?;

        let report = resources
            .database
            .weight()
            .import_entries(auth.user_id, &parsed.rows)
            .await?;
        tracing::info!(
            user_id = %auth.user_id,
            imported = report.imported,
            skipped = report.skipped.len(),
            malformed = parsed.errors.len(),
            "Imported weight entries"
        );
        Ok((
            StatusCode::OK,
            Json(ImportResponse {
                report,
                errors: parsed.errors,
            }),
        )
            .into_response())
    }

    /// Handle GET /api/v1/weight/export
    async fn handle_export(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<OwnerQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources).await?;
        let owner_id = query.readable_owner(&resources, &auth).await?;
        let entries = resources
            .database
            .weight()
            .list_entries(owner_id, None, None)
            .await?;
        let csv = weight_csv::export(&entries)?;
        Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"weight.csv\""),
            ],
            csv,
        )
            .into_response())
    }
}
