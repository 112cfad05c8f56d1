/// Alert classification and selection.
///
/// Submodules:
/// - `parse`  — provider records → classified `WeatherAlert`s.
/// - `select` — expiry filtering and importance ranking.

pub mod parse;
pub mod select;

pub use parse::{parse_alert, parse_alert_collection, ParsedCollection, RawAlert};
pub use select::{select_most_important, select_most_important_per_group};
