//! Statistics over the pick log
//!
//! Counts and rankings come straight from the pick store. Picker names are
//! resolved through the osu! API in batches, best-effort.

mod analyzer;
mod export;
mod model;

pub use analyzer::StatsAnalyzer;
pub use export::export_json;
pub use model::*;
