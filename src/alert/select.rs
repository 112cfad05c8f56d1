//! Selection engine: reduces an alert set to the single most actionable
//! alert.
//!
//! Ordering key, highest wins:
//!   1. importance score
//!   2. onset (later onset wins; a missing onset loses to any onset)
//!   3. input order (the first alert encountered wins a full tie)
//!
//! Expired alerts are removed before ranking, so an expired Extreme alert
//! never beats an active Severe one.

use crate::model::WeatherAlert;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

fn rank_key(alert: &WeatherAlert) -> (u16, Option<DateTime<Utc>>) {
    // Option orders None below Some, which is the tie-break we want.
    (alert.importance_score(), alert.onset)
}

/// Returns the most important alert that is not expired at `now`, or
/// `None` if every alert is expired or the slice is empty.
pub fn select_most_important(alerts: &[WeatherAlert], now: DateTime<Utc>) -> Option<&WeatherAlert> {
    alerts
        .iter()
        .filter(|alert| !alert.is_expired(now))
        .fold(None, |best: Option<&WeatherAlert>, alert| match best {
            // Strictly greater, so earlier alerts keep full ties.
            Some(current) if rank_key(alert) <= rank_key(current) => Some(current),
            _ => Some(alert),
        })
}

/// Applies `select_most_important` to every group independently. Every key
/// of `groups` appears in the result, with `None` for groups that have no
/// active alert.
pub fn select_most_important_per_group<'a>(
    groups: &'a BTreeMap<String, Vec<WeatherAlert>>,
    now: DateTime<Utc>,
) -> BTreeMap<String, Option<&'a WeatherAlert>> {
    groups
        .iter()
        .map(|(key, alerts)| (key.clone(), select_most_important(alerts, now)))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
