//! Streak and weekly-consistency calculation.
//!
//! Rules:
//! - The current streak is anchored on today if there was activity today,
//!   otherwise on yesterday, otherwise it is zero.
//! - The longest streak is the best consecutive run anywhere in the history
//!   and is never shorter than the current streak.
//! - Weekly consistency is the share of the 7 days ending today with activity.

use crate::dates::{normalize_to_date_keys, DateKey, DateKeys};
use crate::StreakResult;
use chrono::{DateTime, TimeZone, Utc};

/// Length of the trailing consistency window, today inclusive
pub const CONSISTENCY_WINDOW_DAYS: u64 = 7;

/// Compute the streak summary for raw activity instants
///
/// `now` fixes both the reference day and the viewer's calendar.
pub fn compute_streak<Tz, I>(instants: I, now: &DateTime<Tz>) -> StreakResult
where
    Tz: TimeZone,
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let keys = normalize_to_date_keys(instants, &now.timezone());
    streak_from_keys(&keys, DateKey::today(now))
}

/// Compute the streak summary from already-normalized keys
pub fn streak_from_keys(keys: &DateKeys, today: DateKey) -> StreakResult {
    let Some(last_activity) = keys.most_recent() else {
        return StreakResult::default();
    };

    let current = anchor(keys, today).map_or(0, |a| run_length_from(keys, a));
    let longest = longest_run(keys).max(current);
    let weekly_consistency_percent = weekly_consistency_from_keys(keys, today);

    tracing::debug!(
        "Streak at {}: current {}, longest {}, weekly {}%",
        today,
        current,
        longest,
        weekly_consistency_percent
    );

    StreakResult {
        current,
        longest,
        weekly_consistency_percent,
        last_activity_date: Some(last_activity),
    }
}

/// Percentage of the last 7 days (today inclusive) with activity
pub fn compute_weekly_consistency<Tz, I>(instants: I, now: &DateTime<Tz>) -> u8
where
    Tz: TimeZone,
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let keys = normalize_to_date_keys(instants, &now.timezone());
    weekly_consistency_from_keys(&keys, DateKey::today(now))
}

pub fn weekly_consistency_from_keys(keys: &DateKeys, today: DateKey) -> u8 {
    let window_start = today
        .days_before(CONSISTENCY_WINDOW_DAYS - 1)
        .unwrap_or(today);

    let active_days = keys
        .iter()
        .filter(|key| **key >= window_start && **key <= today)
        .count();

    let percent = (active_days as f64 / CONSISTENCY_WINDOW_DAYS as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

/// The day the current streak counts back from, if the chain is unbroken
fn anchor(keys: &DateKeys, today: DateKey) -> Option<DateKey> {
    if keys.contains(today) {
        return Some(today);
    }
    today.pred().filter(|yesterday| keys.contains(*yesterday))
}

/// Consecutive days present in `keys`, walking back from `start`
fn run_length_from(keys: &DateKeys, start: DateKey) -> u32 {
    let Some(index) = keys.position(start) else {
        return 0;
    };

    let mut run = 1;
    let mut previous = start;
    for key in &keys.as_slice()[index + 1..] {
        if !key.is_day_before(&previous) {
            break;
        }
        run += 1;
        previous = *key;
    }
    run
}

/// Best consecutive run anywhere in the sequence
fn longest_run(keys: &DateKeys) -> u32 {
    if keys.is_empty() {
        return 0;
    }

    let mut best = 1;
    let mut run = 1;
    for pair in keys.as_slice().windows(2) {
        if pair[1].is_day_before(&pair[0]) {
            run += 1;
            best = best.max(run);
        } else {
            run = 1;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, NaiveDate};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 15, 30, 0).unwrap()
    }

    /// An instant `days_ago` days before `now()`, at a varying time of day
    fn days_ago(days: i64) -> DateTime<Utc> {
        now() - Duration::days(days) - Duration::hours(days % 5)
    }

    fn streak(days: &[i64]) -> StreakResult {
        compute_streak(days.iter().map(|d| days_ago(*d)), &now())
    }

    #[test]
    fn test_empty_history() {
        let result = compute_streak(Vec::new(), &now());
        assert_eq!(result, StreakResult::default());
        assert_eq!(result.current, 0);
        assert_eq!(result.longest, 0);
        assert_eq!(result.last_activity_date, None);
    }

    #[test]
    fn test_single_day_today() {
        let result = streak(&[0]);
        assert_eq!(result.current, 1);
        assert_eq!(result.longest, 1);
        assert_eq!(
            result.last_activity_date,
            Some(DateKey::new(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()))
        );
    }

    #[test]
    fn test_consecutive_run_ending_today() {
        for n in 1..=12 {
            let days: Vec<i64> = (0..n).collect();
            let result = streak(&days);
            assert_eq!(result.current, n as u32, "run of {}", n);
            assert_eq!(result.longest, n as u32, "run of {}", n);
        }
    }

    #[test]
    fn test_gap_breaks_current_but_not_longest() {
        let result = streak(&[0, 1, 3, 4, 5]);
        assert_eq!(result.current, 2);
        assert_eq!(result.longest, 3);
    }

    #[test]
    fn test_anchors_on_yesterday() {
        let result = streak(&[1, 2, 3]);
        assert_eq!(result.current, 3);
        assert_eq!(result.longest, 3);
    }

    #[test]
    fn test_no_recent_activity_resets_current() {
        let result = streak(&[2, 3, 4, 5, 10]);
        assert_eq!(result.current, 0);
        assert_eq!(result.longest, 4);
    }

    #[test]
    fn test_isolated_old_day() {
        let result = streak(&[20]);
        assert_eq!(result.current, 0);
        assert_eq!(result.longest, 1);
    }

    #[test]
    fn test_same_day_records_count_once() {
        let result = compute_streak(
            vec![
                now(),
                now() - Duration::hours(3),
                now() - Duration::hours(15),
                now() - Duration::days(1),
            ],
            &now(),
        );
        assert_eq!(result.current, 2);
        assert_eq!(result.longest, 2);
    }

    #[test]
    fn test_longest_never_below_current() {
        let result = streak(&[0, 1, 2, 3, 5, 6, 8, 9, 10]);
        assert_eq!(result.current, 4);
        assert!(result.longest >= result.current);
        assert_eq!(result.longest, 4);
    }

    #[test]
    fn test_unordered_input() {
        let result = streak(&[4, 0, 2, 1, 3]);
        assert_eq!(result.current, 5);
        assert_eq!(result.longest, 5);
    }

    #[test]
    fn test_future_days_do_not_extend_current() {
        let tomorrow = now() + Duration::days(1);
        let result = compute_streak(vec![tomorrow, now()], &now());
        assert_eq!(result.current, 1);
        assert_eq!(result.longest, 2);
    }

    #[test]
    fn test_weekly_consistency_three_of_seven() {
        assert_eq!(
            compute_weekly_consistency(vec![days_ago(0), days_ago(2), days_ago(6)], &now()),
            43
        );
        assert_eq!(streak(&[0, 2, 6]).weekly_consistency_percent, 43);
    }

    #[test]
    fn test_weekly_consistency_bounds() {
        assert_eq!(compute_weekly_consistency(Vec::new(), &now()), 0);

        let full: Vec<_> = (0..7).map(days_ago).collect();
        assert_eq!(compute_weekly_consistency(full, &now()), 100);

        // Day 7 is outside the window
        assert_eq!(compute_weekly_consistency(vec![days_ago(7)], &now()), 0);
        assert_eq!(compute_weekly_consistency(vec![days_ago(6)], &now()), 14);
    }

    #[test]
    fn test_viewer_time_zone_shifts_today() {
        // 15:30 UTC on the 10th is 00:30 on the 11th in UTC+9
        let tokyo_now = now().with_timezone(&FixedOffset::east_opt(9 * 3600).unwrap());
        let activity = vec![Utc.with_ymd_and_hms(2024, 3, 10, 1, 0, 0).unwrap()];

        // Activity on the 10th local: yesterday from Tokyo's point of view
        let result = compute_streak(activity.clone(), &tokyo_now);
        assert_eq!(result.current, 1);

        let result = compute_streak(activity, &now());
        assert_eq!(result.current, 1);
        assert_eq!(
            result.last_activity_date,
            Some(DateKey::new(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()))
        );
    }

    #[test]
    fn test_streak_from_prenormalized_keys() {
        let today = DateKey::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        let keys: DateKeys = [0u64, 1, 2]
            .iter()
            .filter_map(|d| today.days_before(*d))
            .collect();

        let result = streak_from_keys(&keys, today);
        assert_eq!(result.current, 3);
        assert_eq!(result.longest, 3);
        assert_eq!(result.weekly_consistency_percent, 43);
    }
}
