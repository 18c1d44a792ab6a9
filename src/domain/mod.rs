//! Domain types used throughout the tool.
//!
//! This module defines:
//!
//! - stored puzzles and their ratings (`RatedEntity`, `Glicko`, `PuzzleId`)
//! - selection and update values (`RatingFilter`, `RatingUpdate`)
//! - sweep configuration (`ReseedParams`, `ReseedConfig`, `SamplerMethod`, `StoreFormat`)

pub mod types;

pub use types::*;
