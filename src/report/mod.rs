//! Reporting utilities: terminal summaries.

pub mod format;

pub use format::*;
