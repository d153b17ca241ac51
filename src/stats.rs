//! Per-user processing statistics with a TTL read cache.
//!
//! Statistics are always derived from the persisted records, never from a
//! running counter, so a cache miss after invalidation recomputes exactly
//! what the store says.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use rusqlite::{params, Connection};
use serde::Serialize;

use crate::config;
use crate::db::DatabaseError;

/// Aggregate view of one user's processing history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStatistics {
    pub total_processed: i64,
    pub by_risk_classification: BTreeMap<String, i64>,
    pub average_processing_time_ms: f64,
    pub last_processed_at: Option<String>,
}

impl UserStatistics {
    fn empty() -> Self {
        Self {
            total_processed: 0,
            by_risk_classification: BTreeMap::new(),
            average_processing_time_ms: 0.0,
            last_processed_at: None,
        }
    }
}

/// Compute statistics for one user straight from the store.
pub fn compute_statistics(
    conn: &Connection,
    user_id: &str,
) -> Result<UserStatistics, DatabaseError> {
    let (total, average, last): (i64, Option<f64>, Option<String>) = conn.query_row(
        "SELECT COUNT(*), AVG(processing_time_ms), MAX(processed_at)
         FROM medical_notes WHERE user_id = ?1",
        params![user_id],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;

    if total == 0 {
        return Ok(UserStatistics::empty());
    }

    let mut stmt = conn.prepare(
        "SELECT risk_classification, COUNT(*)
         FROM medical_notes WHERE user_id = ?1
         GROUP BY risk_classification",
    )?;
    let by_risk_classification = stmt
        .query_map(params![user_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<Result<BTreeMap<_, _>, _>>()?;

    Ok(UserStatistics {
        total_processed: total,
        by_risk_classification,
        average_processing_time_ms: round2(average.unwrap_or(0.0)),
        last_processed_at: last,
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// TTL cache over [`compute_statistics`]. Entries expire after `ttl` or on
/// explicit invalidation; the workflow invalidates on every successful
/// processing run, so the TTL only bounds staleness for external writers.
pub struct StatsCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, UserStatistics)>>,
}

impl StatsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_default_ttl() -> Self {
        Self::new(config::STATS_CACHE_TTL)
    }

    /// Cached statistics for one user, recomputing on miss or expiry. A
    /// poisoned lock degrades to an uncached computation.
    pub fn fetch(&self, conn: &Connection, user_id: &str) -> Result<UserStatistics, DatabaseError> {
        let Ok(mut entries) = self.entries.lock() else {
            return compute_statistics(conn, user_id);
        };

        if let Some((stored_at, stats)) = entries.get(user_id) {
            if stored_at.elapsed() < self.ttl {
                return Ok(stats.clone());
            }
        }

        let stats = compute_statistics(conn, user_id)?;
        entries.insert(user_id.to_string(), (Instant::now(), stats.clone()));
        Ok(stats)
    }

    /// Drop the cached entry for one user.
    pub fn invalidate(&self, user_id: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(user_id);
        }
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl Default for StatsCache {
    fn default() -> Self {
        Self::with_default_ttl()
    }
}
