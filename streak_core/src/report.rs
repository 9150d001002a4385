//! Progress report assembly.
//!
//! Pulls one user's activity through every calculation (streak, weekly
//! consistency, daily aggregation, trend) against a single reference "now" so
//! that all the numbers describe the same moment.

use crate::config::TrendConfig;
use crate::daily::{aggregate_daily_metrics, split_windows};
use crate::dates::DateKey;
use crate::streak::compute_streak;
use crate::trend::TrendClassifier;
use crate::{
    ActivityEntry, DailyMetric, Result, SessionRecord, StreakResult, TrendClassification,
    WorkoutLog,
};
use chrono::{DateTime, TimeZone};
use serde::Serialize;

/// Lifetime totals across the supplied history
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct ActivityTotals {
    pub workouts: u32,
    pub total_reps: u64,
    pub calories_burned: f64,
    pub calories_today: f64,
    pub challenges_completed: u32,
    pub challenge_points: u64,
}

/// Everything the progress dashboard shows
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ProgressReport {
    pub today: DateKey,
    pub streak: StreakResult,
    pub trend: TrendClassification,
    pub totals: ActivityTotals,
    /// Days of the recent trend window that had activity, newest first
    pub recent_days: Vec<DailySummary>,
}

/// One day of the recent window, ready for display
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DailySummary {
    pub date: DateKey,
    pub calories_burned: f64,
    pub workouts_completed: u32,
    pub total_reps: u32,
    pub intensity: f64,
}

impl From<&DailyMetric> for DailySummary {
    fn from(metric: &DailyMetric) -> Self {
        Self {
            date: DateKey::new(metric.date),
            calories_burned: metric.calories_burned,
            workouts_completed: metric.workouts_completed,
            total_reps: metric.total_reps,
            intensity: metric.effective_intensity(),
        }
    }
}

/// Build the report for `entries` as seen at `now`
///
/// Fails only when `config` names a zero-day trend window.
pub fn build_report<Tz: TimeZone>(
    entries: &[ActivityEntry],
    now: &DateTime<Tz>,
    config: &TrendConfig,
) -> Result<ProgressReport> {
    let classifier = TrendClassifier::new(config)?;
    let tz = now.timezone();
    let today = DateKey::today(now);

    let streak = compute_streak(entries.iter().filter_map(ActivityEntry::occurred_at), now);

    let workouts: Vec<WorkoutLog> = entries
        .iter()
        .filter_map(ActivityEntry::as_workout)
        .filter(|w| w.completed)
        .cloned()
        .collect();

    let daily = aggregate_daily_metrics(&workouts, &tz);
    let windows = split_windows(&daily, classifier.window().days(), today);
    let sessions: Vec<SessionRecord> = workouts.iter().map(WorkoutLog::session_record).collect();
    let trend = classifier.classify(&windows.recent, &windows.previous, &sessions);

    let totals = totals(entries, &daily, today);

    tracing::info!(
        "Report for {}: streak {} (best {}), trend {}",
        today,
        streak.current,
        streak.longest,
        trend.status
    );

    Ok(ProgressReport {
        today,
        streak,
        trend,
        totals,
        recent_days: windows.recent.iter().map(DailySummary::from).collect(),
    })
}

fn totals(entries: &[ActivityEntry], daily: &[DailyMetric], today: DateKey) -> ActivityTotals {
    let mut totals = ActivityTotals::default();

    for metric in daily {
        totals.workouts = totals.workouts.saturating_add(metric.workouts_completed);
        totals.total_reps += u64::from(metric.total_reps);
        totals.calories_burned += metric.calories_burned;
        if metric.date == today.date() {
            totals.calories_today += metric.calories_burned;
        }
    }

    for entry in entries {
        if let (Some(challenge), Some(_)) = (entry.as_challenge(), entry.occurred_at()) {
            totals.challenges_completed += 1;
            totals.challenge_points += u64::from(challenge.points);
        }
    }

    totals
}
