//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - loaded from and written back to puzzle store files
//! - passed between the sampler, the reseeder and the store
//! - exported in JSON run reports

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;

/// Glicko rating every imported puzzle starts with.
pub const DEFAULT_RATING: f64 = 1500.0;
pub const DEFAULT_MEAN: f64 = 1550.0;
pub const DEFAULT_STDDEV: f64 = 350.0;
pub const DEFAULT_MIN_RATING: f64 = 600.0;

/// Opaque puzzle key (the `_id` of a stored document).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PuzzleId(String);

impl PuzzleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PuzzleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Glicko rating record.
///
/// Only `r` is ever written by this crate. Deviation (`d`), volatility (`v`)
/// and any other keys stay in `rest` exactly as read, nulls included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glicko {
    pub r: f64,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl Glicko {
    pub fn new(r: f64) -> Self {
        Self { r, rest: Map::new() }
    }

    /// Rating deviation, when stored as a number.
    pub fn deviation(&self) -> Option<f64> {
        self.rest.get("d").and_then(Value::as_f64)
    }

    /// Rating volatility, when stored as a number.
    pub fn volatility(&self) -> Option<f64> {
        self.rest.get("v").and_then(Value::as_f64)
    }
}

/// A stored puzzle with its rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedEntity {
    #[serde(rename = "_id")]
    pub id: PuzzleId,
    pub glicko: Glicko,
    /// Everything else in the document (FEN, moves, themes, ...).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl RatedEntity {
    pub fn new(id: impl Into<String>, rating: f64) -> Self {
        Self {
            id: PuzzleId::new(id),
            glicko: Glicko::new(rating),
            fields: Map::new(),
        }
    }

    pub fn rating(&self) -> f64 {
        self.glicko.r
    }
}

/// Selects entities by exact rating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingFilter {
    pub rating: f64,
}

impl RatingFilter {
    pub fn exact(rating: f64) -> Self {
        Self { rating }
    }

    pub fn matches(&self, entity: &RatedEntity) -> bool {
        entity.glicko.r == self.rating
    }
}

/// Fields written back for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingUpdate {
    pub r: f64,
}

impl RatingUpdate {
    pub fn apply(&self, glicko: &mut Glicko) {
        glicko.r = self.r;
    }
}

/// Parameters of one reseed sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReseedParams {
    /// Only entities rated exactly this are reseeded.
    pub filter_rating: f64,
    pub mean: f64,
    pub stddev: f64,
    /// Floor applied to every new rating.
    pub min: f64,
}

impl Default for ReseedParams {
    fn default() -> Self {
        Self {
            filter_rating: DEFAULT_RATING,
            mean: DEFAULT_MEAN,
            stddev: DEFAULT_STDDEV,
            min: DEFAULT_MIN_RATING,
        }
    }
}

impl ReseedParams {
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.filter_rating.is_finite() {
            return Err(AppError::usage("Filter rating must be a finite number."));
        }
        if !self.mean.is_finite() {
            return Err(AppError::usage("Mean must be a finite number."));
        }
        if !(self.stddev.is_finite() && self.stddev >= 0.0) {
            return Err(AppError::usage("Standard deviation must be finite and >= 0."));
        }
        if !self.min.is_finite() {
            return Err(AppError::usage("Minimum rating must be a finite number."));
        }
        Ok(())
    }

    pub fn filter(&self) -> RatingFilter {
        RatingFilter::exact(self.filter_rating)
    }
}

/// Whether a sweep writes to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReseedMode {
    Apply,
    DryRun,
}

/// One computed rating change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingChange {
    pub id: PuzzleId,
    pub old: f64,
    pub new: f64,
}

/// Which normal sampler drives the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SamplerMethod {
    /// Box-Muller transform over two uniform draws.
    BoxMuller,
    /// `rand_distr::StandardNormal` (Ziggurat), for comparison runs.
    Ziggurat,
}

impl SamplerMethod {
    pub fn display_name(self) -> &'static str {
        match self {
            SamplerMethod::BoxMuller => "Box-Muller",
            SamplerMethod::Ziggurat => "Ziggurat",
        }
    }
}

/// On-disk layout of a puzzle store file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreFormat {
    /// Pick from the file extension (`.json` or `.csv`).
    Auto,
    /// Array of documents with `_id` and `glicko`.
    Json,
    /// Puzzle database CSV (`PuzzleId`, `Rating`, `RatingDeviation`, ...).
    Csv,
}

/// Fully resolved settings for `reseed run`.
#[derive(Debug, Clone)]
pub struct ReseedConfig {
    pub store_path: PathBuf,
    pub store_format: StoreFormat,
    pub params: ReseedParams,
    pub seed: Option<u64>,
    pub method: SamplerMethod,
    pub mode: ReseedMode,
    pub report_path: Option<PathBuf>,
    pub preview: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_matches_exact_rating_only() {
        let filter = RatingFilter::exact(DEFAULT_RATING);
        assert!(filter.matches(&RatedEntity::new("a", 1500.0)));
        assert!(!filter.matches(&RatedEntity::new("b", 1500.0001)));
        assert!(!filter.matches(&RatedEntity::new("c", 1723.4)));
    }

    #[test]
    fn update_only_touches_r() {
        let mut glicko: Glicko = serde_json::from_str(r#"{"r":1500,"d":350,"v":0.09}"#).unwrap();
        RatingUpdate { r: 1612.5 }.apply(&mut glicko);
        assert_eq!(glicko.r, 1612.5);
        assert_eq!(glicko.deviation(), Some(350.0));
        assert_eq!(glicko.volatility(), Some(0.09));
    }

    #[test]
    fn params_reject_negative_stddev() {
        let params = ReseedParams {
            stddev: -1.0,
            ..ReseedParams::default()
        };
        assert!(params.validate().is_err());
        assert!(ReseedParams::default().validate().is_ok());
    }

    #[test]
    fn entity_document_keeps_unknown_fields() {
        let doc = r#"{"_id":"00sHx","gameId":"abc","glicko":{"r":1500,"d":500,"v":0.09,"x":1}}"#;
        let entity: RatedEntity = serde_json::from_str(doc).unwrap();
        assert_eq!(entity.id.as_str(), "00sHx");
        assert_eq!(entity.rating(), 1500.0);
        assert_eq!(entity.glicko.deviation(), Some(500.0));
        assert_eq!(entity.fields.get("gameId"), Some(&Value::from("abc")));
        assert_eq!(entity.glicko.rest.get("x"), Some(&Value::from(1)));

        let back = serde_json::to_value(&entity).unwrap();
        assert_eq!(back["gameId"], Value::from("abc"));
        assert_eq!(back["glicko"]["x"], Value::from(1));
    }

    #[test]
    fn null_deviation_survives_a_rewrite() {
        let doc = r#"{"_id":"a","glicko":{"r":1500,"d":null,"v":0.09}}"#;
        let mut entity: RatedEntity = serde_json::from_str(doc).unwrap();
        assert_eq!(entity.glicko.deviation(), None);

        RatingUpdate { r: 1700.0 }.apply(&mut entity.glicko);
        let back = serde_json::to_value(&entity).unwrap();
        let glicko = back["glicko"].as_object().unwrap();

        assert_eq!(glicko.get("d"), Some(&Value::Null));
        assert_eq!(glicko.get("v"), Some(&Value::from(0.09)));
        assert_eq!(glicko.get("r"), Some(&Value::from(1700.0)));
        assert_eq!(glicko.len(), 3);
    }
}
