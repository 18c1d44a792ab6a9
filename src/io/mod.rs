//! Input/output helpers.
//!
//! - puzzle store codecs (`json_file`, `csv_file`)
//! - JSON run reports (`report`)

pub mod csv_file;
pub mod json_file;
pub mod report;

pub use report::*;
