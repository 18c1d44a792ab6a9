//! Puzzle database CSV.
//!
//! Expected header (column names are matched case-insensitively):
//!
//! `PuzzleId,FEN,Moves,Rating,RatingDeviation,Popularity,NbPlays,Themes,GameUrl,OpeningTags`
//!
//! Only `PuzzleId` and `Rating` are required. Every other column is kept as a
//! raw string and written back verbatim, in the original column order.

use std::collections::HashMap;
use std::io::{Read, Write};

use csv::StringRecord;
use serde_json::Value;

use crate::domain::RatedEntity;
use crate::error::AppError;

const ID_COLUMN: &str = "puzzleid";
const RATING_COLUMN: &str = "rating";

/// Header layout captured on read and reused on write.
#[derive(Debug, Clone)]
pub struct CsvLayout {
    headers: StringRecord,
    id_col: usize,
    rating_col: usize,
}

/// Rows must have exactly one cell per header column; a row that doesn't
/// could not be written back unchanged.
pub fn read_entities_csv<R: Read>(
    reader: R,
) -> Result<(CsvLayout, Vec<RatedEntity>), AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::usage(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let id_col = *header_map
        .get(ID_COLUMN)
        .ok_or_else(|| AppError::usage("Missing required column: `PuzzleId`"))?;
    let rating_col = *header_map
        .get(RATING_COLUMN)
        .ok_or_else(|| AppError::usage("Missing required column: `Rating`"))?;

    let mut entities = Vec::new();

    // Unlike an import, a store cannot skip bad rows: they would be dropped
    // from the file on the next write.
    for (idx, result) in reader.records().enumerate() {
        // +2: 1-based lines, plus the header row.
        let line = idx + 2;
        let record = result
            .map_err(|e| AppError::usage(format!("CSV parse error on line {line}: {e}")))?;

        let id = record
            .get(id_col)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::usage(format!("Line {line}: missing `PuzzleId`.")))?;
        let rating = parse_rating(record.get(rating_col).unwrap_or(""))
            .map_err(|msg| AppError::usage(format!("Line {line}: {msg}")))?;

        let mut entity = RatedEntity::new(id, rating);
        for (col, name) in headers.iter().enumerate() {
            if col == id_col || col == rating_col {
                continue;
            }
            let value = record.get(col).unwrap_or("");
            entity.fields.insert(name.to_string(), Value::from(value));
        }
        entities.push(entity);
    }

    Ok((
        CsvLayout {
            headers,
            id_col,
            rating_col,
        },
        entities,
    ))
}

pub fn write_entities_csv<W: Write>(
    writer: W,
    layout: &CsvLayout,
    entities: &[RatedEntity],
) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer
        .write_record(&layout.headers)
        .map_err(|e| AppError::persistence(format!("Failed to write CSV header: {e}")))?;

    for entity in entities {
        let row: Vec<String> = layout
            .headers
            .iter()
            .enumerate()
            .map(|(col, name)| {
                if col == layout.id_col {
                    entity.id.to_string()
                } else if col == layout.rating_col {
                    format_rating(entity.glicko.r)
                } else {
                    match entity.fields.get(name) {
                        Some(Value::String(s)) => s.clone(),
                        Some(other) => other.to_string(),
                        None => String::new(),
                    }
                }
            })
            .collect();
        writer
            .write_record(&row)
            .map_err(|e| {
                AppError::persistence(format!("Failed to write CSV row for {}: {e}", entity.id))
            })?;
    }

    writer
        .flush()
        .map_err(|e| AppError::persistence(format!("Failed to flush CSV: {e}")))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_rating(raw: &str) -> Result<f64, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("missing `Rating`.".to_string());
    }
    let value = trimmed
        .parse::<f64>()
        .map_err(|_| format!("invalid rating '{trimmed}'."))?;
    if !value.is_finite() {
        return Err(format!("rating '{trimmed}' is not finite."));
    }
    Ok(value)
}

/// Whole ratings keep the integer form the database uses.
fn format_rating(r: f64) -> String {
    if r.fract() == 0.0 && r.abs() < 1e15 {
        format!("{r:.0}")
    } else {
        format!("{r}")
    }
}
