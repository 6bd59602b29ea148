// ABOUTME: CSV reading and writing of body weight entries
// ABOUTME: Uses a `date,weight` header and reports malformed rows with their line numbers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Workout Manager Contributors

use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use workout_core::constants::limits;
use workout_core::models::WeightEntry;

/// One CSV row
#[derive(Debug, Serialize, Deserialize)]
struct WeightRow {
    date: NaiveDate,
    weight: f64,
}

/// A row that could not be imported
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    /// 1-based line in the file, the header being line 1
    pub line: u64,
    /// What was wrong
    pub message: String,
}

/// Rows read from an uploaded file
#[derive(Debug, Default)]
pub struct ParsedWeights {
    /// Valid `(date, weight)` pairs in file order
    pub rows: Vec<(NaiveDate, f64)>,
    /// Rows that were rejected
    pub errors: Vec<RowError>,
}

/// Parse a `date,weight` CSV document
///
/// Rows failing to parse or outside the accepted weight range are collected
/// in [`ParsedWeights::errors`] and do not stop the rest of the file.
///
/// # Errors
///
/// Returns an error when the header is missing or does not name both columns
pub fn parse(input: &[u8]) -> AppResult<ParsedWeights> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::invalid_format(format!("Unreadable CSV header: {e}")))?;
    if !headers.iter().any(|h| h == "date") || !headers.iter().any(|h| h == "weight") {
        return Err(AppError::invalid_format(
            "CSV header must contain the columns date and weight",
        ));
    }

    let mut parsed = ParsedWeights::default();
    for (index, result) in reader.deserialize::<WeightRow>().enumerate() {
        let line = index as u64 + 2;
        match result {
            Ok(row)
                if (limits::MIN_BODY_WEIGHT..=limits::MAX_BODY_WEIGHT).contains(&row.weight) =>
            {
                parsed.rows.push((row.date, row.weight));
            }
            Ok(row) => parsed.errors.push(RowError {
                line,
                message: format!(
                    "Weight {} is outside {}..={}",
                    row.weight,
                    limits::MIN_BODY_WEIGHT,
                    limits::MAX_BODY_WEIGHT
                ),
            }),
            Err(e) => parsed.errors.push(RowError {
                line: e.position().map_or(line, csv::Position::line),
                message: e.to_string(),
            }),
        }
    }
    Ok(parsed)
}

/// Render entries as a `date,weight` CSV document ordered by date
///
/// # Errors
///
/// Returns an error if a row cannot be serialized
pub fn export(entries: &[WeightEntry]) -> AppResult<String> {
    let mut sorted: Vec<&WeightEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.date);

    let mut writer = csv::Writer::from_writer(Vec::new());
    for entry in sorted {
        writer
            .serialize(WeightRow {
                date: entry.date,
                weight: entry.weight,
            })
            .map_err(|e| AppError::internal(format!("Failed to write CSV row: {e}")))?;
    }
    // An empty export still carries the header
    if entries.is_empty() {
        writer
            .write_record(["date", "weight"])
            .map_err(|e| AppError::internal(format!("Failed to write CSV header: {e}")))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::internal(format!("Failed to flush CSV: {e}")))?;
    String::from_utf8(bytes).map_err(|e| AppError::internal(format!("CSV is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_collects_valid_rows_and_line_errors() {
        let input =
            b"date,weight\n2024-01-01,80.5\nnot-a-date,81\n2024-01-03,12\n2024-01-04, 79.9\n";
        let parsed = parse(input).unwrap();

        assert_eq!(parsed.rows, vec![(date(2024, 1, 1), 80.5), (date(2024, 1, 4), 79.9)]);
        assert_eq!(parsed.errors.len(), 2);
        assert_eq!(parsed.errors[0].line, 3);
        assert_eq!(parsed.errors[1].line, 4);
    }

    #[test]
    fn test_parse_rejects_missing_columns() {
        assert!(parse(b"day,kg\n2024-01-01,80\n").is_err());
    }

    #[test]
    fn test_export_orders_by_date() {
        let user_id = Uuid::new_v4();
        let entries = vec![
            WeightEntry {
                id: Uuid::new_v4(),
                user_id,
                date: date(2024, 2, 1),
                weight: 81.0,
            },
            WeightEntry {
                id: Uuid::new_v4(),
                user_id,
                date: date(2024, 1, 1),
                weight: 80.5,
            },
        ];
        let csv = export(&entries).unwrap();
        assert_eq!(csv, "date,weight\n2024-01-01,80.5\n2024-02-01,81.0\n");
    }

    #[test]
    fn test_export_empty_has_header() {
        assert_eq!(export(&[]).unwrap(), "date,weight\n");
    }
}
