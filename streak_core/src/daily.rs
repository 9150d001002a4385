//! Per-day aggregation of activity.
//!
//! Turns workout logs into one [`DailyMetric`] per local calendar day and
//! splits a day series into the recent/previous windows the trend
//! classifier compares.

use crate::dates::DateKey;
use crate::{DailyMetric, WorkoutLog};
use chrono::{Days, NaiveDate, TimeZone};
use std::collections::BTreeMap;

/// Running totals for one day while merging
#[derive(Default)]
struct DayAccumulator {
    calories_burned: f64,
    workouts_completed: u32,
    total_reps: u32,
    intensity_sum: f64,
    intensity_count: u32,
}

impl DayAccumulator {
    fn add_intensity(&mut self, intensity: Option<f64>) {
        if let Some(value) = intensity {
            self.intensity_sum += value;
            self.intensity_count += 1;
        }
    }

    fn finish(self, date: NaiveDate) -> DailyMetric {
        let intensity = (self.intensity_count > 0)
            .then(|| (self.intensity_sum / self.intensity_count as f64).round());

        DailyMetric {
            date,
            calories_burned: self.calories_burned,
            workouts_completed: self.workouts_completed,
            total_reps: self.total_reps,
            intensity,
        }
    }
}

fn into_metrics_desc(days: BTreeMap<NaiveDate, DayAccumulator>) -> Vec<DailyMetric> {
    days.into_iter()
        .rev()
        .map(|(date, acc)| acc.finish(date))
        .collect()
}

/// Roll completed workout logs up into one entry per local day, newest first
///
/// Calories and reps are summed, each log counts as one workout, and the
/// day's intensity is the rounded mean of its session intensities.
pub fn aggregate_daily_metrics<Tz: TimeZone>(logs: &[WorkoutLog], tz: &Tz) -> Vec<DailyMetric> {
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

    for log in logs.iter().filter(|l| l.completed) {
        let date = DateKey::from_instant(&log.performed_at, tz).date();
        let acc = days.entry(date).or_default();
        acc.calories_burned += log.calories_burned.max(0.0);
        acc.workouts_completed = acc.workouts_completed.saturating_add(1);
        acc.total_reps = acc.total_reps.saturating_add(log.total_reps);
        acc.add_intensity(Some(log.session_intensity()));
    }

    tracing::debug!(
        "Aggregated {} workout logs into {} days",
        logs.len(),
        days.len()
    );
    into_metrics_desc(days)
}

/// Additively merge entries that share a date, newest first
pub fn merge_daily_metrics(metrics: impl IntoIterator<Item = DailyMetric>) -> Vec<DailyMetric> {
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

    for metric in metrics {
        let acc = days.entry(metric.date).or_default();
        acc.calories_burned += metric.calories_burned.max(0.0);
        acc.workouts_completed = acc.workouts_completed.saturating_add(metric.workouts_completed);
        acc.total_reps = acc.total_reps.saturating_add(metric.total_reps);
        acc.add_intensity(metric.intensity);
    }

    into_metrics_desc(days)
}

/// Daily metrics split into the two comparison windows
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricWindows {
    /// Days in `[today - W + 1, today]`, newest first
    pub recent: Vec<DailyMetric>,
    /// Days in `[today - 2W + 1, today - W]`, newest first
    pub previous: Vec<DailyMetric>,
}

/// Split a day series into calendar windows of `window_days` ending today
///
/// Days after `today` or older than both windows are left out. Days with no
/// entry are simply absent; they are not filled in.
pub fn split_windows(metrics: &[DailyMetric], window_days: u32, today: DateKey) -> MetricWindows {
    let window = u64::from(window_days);
    let today = today.date();
    let recent_start = window
        .checked_sub(1)
        .and_then(|n| today.checked_sub_days(Days::new(n)));
    let previous_start =
        today.checked_sub_days(Days::new(window.saturating_mul(2).saturating_sub(1)));

    let mut sorted: Vec<&DailyMetric> = metrics.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let mut windows = MetricWindows::default();
    let (Some(recent_start), Some(previous_start)) = (recent_start, previous_start) else {
        return windows;
    };

    for metric in sorted {
        if metric.date > today {
            continue;
        }
        if metric.date >= recent_start {
            windows.recent.push(metric.clone());
        } else if metric.date >= previous_start {
            windows.previous.push(metric.clone());
        }
    }
    windows
}
