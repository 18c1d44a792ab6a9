//! Puzzle documents as JSON.
//!
//! Two layouts are accepted, matching what database exports usually produce:
//! - a single array of documents
//! - JSON Lines (one document per line)
//!
//! The layout found on read is reused on write.

use std::io::{Read, Write};

use crate::domain::{PuzzleId, RatedEntity};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonLayout {
    Array,
    Lines,
}

pub fn read_entities_json<R: Read>(
    mut reader: R,
) -> Result<(JsonLayout, Vec<RatedEntity>), AppError> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| AppError::usage(format!("Failed to read puzzle JSON: {e}")))?;

    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        return Ok((JsonLayout::Array, Vec::new()));
    }

    if trimmed.starts_with('[') {
        let entities: Vec<RatedEntity> = serde_json::from_str(trimmed)
            .map_err(|e| AppError::usage(format!("Invalid puzzle JSON: {e}")))?;
        return Ok((JsonLayout::Array, entities));
    }

    let mut entities = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let entity: RatedEntity = serde_json::from_str(line)
            .map_err(|e| AppError::usage(format!("Invalid puzzle JSON on line {}: {e}", idx + 1)))?;
        entities.push(entity);
    }
    Ok((JsonLayout::Lines, entities))
}

pub fn write_entities_json<W: Write>(
    mut writer: W,
    layout: JsonLayout,
    entities: &[RatedEntity],
) -> Result<(), AppError> {
    match layout {
        JsonLayout::Array => {
            serde_json::to_writer_pretty(&mut writer, entities)
                .map_err(|e| AppError::persistence(format!("Failed to write puzzle JSON: {e}")))?;
            writeln!(writer)
                .map_err(|e| AppError::persistence(format!("Failed to write puzzle JSON: {e}")))?;
        }
        JsonLayout::Lines => {
            for entity in entities {
                serde_json::to_writer(&mut writer, entity).map_err(|e| write_error(&entity.id, e))?;
                writeln!(writer).map_err(|e| write_error(&entity.id, e))?;
            }
        }
    }
    writer
        .flush()
        .map_err(|e| AppError::persistence(format!("Failed to flush puzzle JSON: {e}")))
}

fn write_error(id: &PuzzleId, e: impl std::fmt::Display) -> AppError {
    AppError::persistence(format!("Failed to write puzzle {id}: {e}"))
}
