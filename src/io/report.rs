//! JSON run report for `reseed run --report`.
//!
//! The report records what a sweep did so a later run (or a reviewer) can
//! tell which settings produced the current ratings.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::{ReseedConfig, StoreFormat};
use crate::error::AppError;
use crate::reseed::ReseedOutcome;

#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub tool: &'static str,
    pub store: &'a Path,
    pub store_format: StoreFormat,
    pub seed: Option<u64>,
    #[serde(flatten)]
    pub outcome: &'a ReseedOutcome,
}

pub fn write_reseed_report(
    path: &Path,
    outcome: &ReseedOutcome,
    config: &ReseedConfig,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::usage(format!("Failed to create report JSON '{}': {e}", path.display()))
    })?;

    let report = RunReport {
        tool: "reseed",
        store: &config.store_path,
        store_format: config.store_format,
        seed: config.seed,
        outcome,
    };

    serde_json::to_writer_pretty(file, &report)
        .map_err(|e| AppError::persistence(format!("Failed to write report JSON: {e}")))?;

    Ok(())
}

/// Default report location next to the store: `<store>.reseed.json`.
pub fn default_report_path(store: &Path) -> PathBuf {
    let mut name = store.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".reseed.json");
    store.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use chrono::Local;
    use serde_json::Value;

    use super::*;
    use crate::domain::{ReseedMode, ReseedParams, SamplerMethod};

    #[test]
    fn report_path_sits_next_to_store() {
        assert_eq!(
            default_report_path(Path::new("/data/puzzles.csv")),
            PathBuf::from("/data/puzzles.csv.reseed.json")
        );
    }

    #[test]
    fn report_serializes_outcome_fields_at_top_level() {
        let now = Local::now();
        let outcome = ReseedOutcome {
            mode: ReseedMode::Apply,
            method: SamplerMethod::BoxMuller,
            params: ReseedParams::default(),
            matched: 3,
            updated: 3,
            clamped: 0,
            new_ratings: None,
            preview: Vec::new(),
            started_at: now,
            finished_at: now,
        };
        let report = RunReport {
            tool: "reseed",
            store: Path::new("p.json"),
            store_format: StoreFormat::Json,
            seed: Some(42),
            outcome: &outcome,
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["tool"], Value::from("reseed"));
        assert_eq!(value["store_format"], Value::from("json"));
        assert_eq!(value["mode"], Value::from("apply"));
        assert_eq!(value["method"], Value::from("box-muller"));
        assert_eq!(value["updated"], Value::from(3));
        assert_eq!(value["params"]["filter_rating"], Value::from(1500.0));
        assert!(value["started_at"].is_string());
    }
}
