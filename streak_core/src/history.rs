//! Activity history loading.
//!
//! History comes from two places: the JSONL activity log written by this
//! tool, and an optional CSV archive of workouts exported from elsewhere.
//! Archive timestamps arrive in whatever form the exporting system used, so
//! they go through [`RawTimestamp`] resolution and bad rows are dropped.

use crate::dates::RawTimestamp;
use crate::{ActivityEntry, Error, Result, WorkoutLog};
use chrono::TimeZone;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

/// CSV row format for archived workouts
#[derive(Debug, Deserialize)]
struct CsvRow {
    id: String,
    #[serde(default)]
    routine_name: Option<String>,
    performed_at: String,
    #[serde(default)]
    calories_burned: Option<f64>,
    #[serde(default)]
    total_reps: Option<u32>,
    #[serde(default)]
    duration_minutes: Option<u32>,
    #[serde(default)]
    intensity: Option<f64>,
}

impl CsvRow {
    fn into_workout<Tz: TimeZone>(self, tz: &Tz) -> Result<WorkoutLog> {
        let id = Uuid::parse_str(self.id.trim())
            .map_err(|e| Error::InvalidInput(format!("Invalid UUID {:?}: {}", self.id, e)))?;

        let performed_at = RawTimestamp::Text(&self.performed_at)
            .resolve(tz)
            .ok_or_else(|| {
                Error::InvalidInput(format!("Invalid timestamp {:?}", self.performed_at))
            })?;

        Ok(WorkoutLog {
            id,
            routine_name: self
                .routine_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| "Workout Session".into()),
            performed_at,
            calories_burned: self.calories_burned.unwrap_or(0.0).max(0.0),
            total_reps: self.total_reps.unwrap_or(0),
            duration_minutes: self.duration_minutes.unwrap_or(0),
            intensity_score: self.intensity,
            exercises: vec![],
            completed: true,
        })
    }
}

/// Load the full activity history from the log and the archive
///
/// Returns entries newest first. An entry present in both sources is kept
/// once, preferring the log's copy. Either file may be missing.
pub fn load_activity<Tz: TimeZone>(
    log_path: &Path,
    archive_path: &Path,
    tz: &Tz,
) -> Result<Vec<ActivityEntry>> {
    let mut entries = Vec::new();
    let mut seen_ids = HashSet::new();

    for entry in crate::activity_log::read_entries(log_path)? {
        if seen_ids.insert(entry.id()) {
            entries.push(entry);
        }
    }
    let log_count = entries.len();

    if archive_path.exists() {
        let mut archive_count = 0;
        for workout in load_archived_workouts(archive_path, tz)? {
            if seen_ids.insert(workout.id) {
                entries.push(ActivityEntry::Workout(workout));
                archive_count += 1;
            }
        }
        tracing::debug!("Loaded {} workouts from archive", archive_count);
    }

    entries.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));

    tracing::info!(
        "Loaded {} activity entries ({} from log)",
        entries.len(),
        log_count
    );
    Ok(entries)
}

/// Load all workouts from an archive CSV, skipping rows that do not parse
pub fn load_archived_workouts<Tz: TimeZone>(path: &Path, tz: &Tz) -> Result<Vec<WorkoutLog>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut workouts = Vec::new();
    for (row_num, result) in reader.deserialize::<CsvRow>().enumerate() {
        match result {
            Ok(row) => match row.into_workout(tz) {
                Ok(workout) => workouts.push(workout),
                Err(e) => tracing::warn!("Dropping archive row {}: {}", row_num + 1, e),
            },
            Err(e) => tracing::warn!("Failed to deserialize archive row {}: {}", row_num + 1, e),
        }
    }

    Ok(workouts)
}
