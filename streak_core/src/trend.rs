//! Improvement trend classification.
//!
//! Three independent signals each vote improving, maintaining or regressing:
//!
//! 1. **Calories**: average calories burned in the recent window against the
//!    previous window (or oldest against newest day when history is short)
//! 2. **Intensity**: mean intensity of the newer half of the most recent
//!    sessions (20 by default) against the older half
//! 3. **Consistency**: active days in the recent window
//!
//! Two matching votes decide. A three-way split goes to regressing if anyone
//! voted for it, then improving, then maintaining.

use crate::config::{ConsistencyScaling, TrendConfig};
use crate::{
    DailyMetric, Error, Result, SessionRecord, TrendClassification, TrendSignals, TrendStatus,
};

/// Reference window length the consistency thresholds are stated for
const CONSISTENCY_REFERENCE_DAYS: u32 = 7;
const IMPROVING_ACTIVE_DAYS: u32 = 6;
const MAINTAINING_ACTIVE_DAYS: u32 = 4;

/// A validated, non-zero window length in days
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrendWindow(u32);

impl TrendWindow {
    pub fn new(days: u32) -> Result<Self> {
        if days == 0 {
            return Err(Error::InvalidWindow(days));
        }
        Ok(Self(days))
    }

    pub fn days(&self) -> u32 {
        self.0
    }

    fn len(&self) -> usize {
        self.0 as usize
    }
}

impl Default for TrendWindow {
    fn default() -> Self {
        Self(CONSISTENCY_REFERENCE_DAYS)
    }
}

/// Classify the trend with the default one-week window
pub fn classify_trend(
    recent: &[DailyMetric],
    previous: &[DailyMetric],
    sessions: &[SessionRecord],
) -> Result<TrendClassification> {
    Ok(TrendClassifier::new(&TrendConfig::default())?.classify(recent, previous, sessions))
}

/// Trend classifier bound to one set of parameters
#[derive(Clone, Debug)]
pub struct TrendClassifier {
    window: TrendWindow,
    calorie_change_percent: f64,
    min_intensity_sessions: usize,
    recent_sessions: usize,
    consistency_scaling: ConsistencyScaling,
}

impl Default for TrendClassifier {
    fn default() -> Self {
        let config = TrendConfig::default();
        Self {
            window: TrendWindow::default(),
            calorie_change_percent: config.calorie_change_percent,
            min_intensity_sessions: config.min_intensity_sessions,
            recent_sessions: config.recent_sessions,
            consistency_scaling: config.consistency_scaling,
        }
    }
}

impl TrendClassifier {
    /// Build a classifier, rejecting a zero-day window
    pub fn new(config: &TrendConfig) -> Result<Self> {
        let min_intensity_sessions = config.min_intensity_sessions.max(2);
        Ok(Self {
            window: TrendWindow::new(config.window_days)?,
            calorie_change_percent: config.calorie_change_percent.abs(),
            min_intensity_sessions,
            recent_sessions: config.recent_sessions.max(min_intensity_sessions),
            consistency_scaling: config.consistency_scaling,
        })
    }

    pub fn window(&self) -> TrendWindow {
        self.window
    }

    /// Combine the three signals into one classification
    ///
    /// `recent` and `previous` may arrive in any order; each is trimmed to its
    /// newest `W` days. `sessions` may also be unordered.
    pub fn classify(
        &self,
        recent: &[DailyMetric],
        previous: &[DailyMetric],
        sessions: &[SessionRecord],
    ) -> TrendClassification {
        let recent = newest_first(recent, self.window.len());
        let previous = newest_first(previous, self.window.len());

        let signals = TrendSignals {
            calories: self.calorie_signal(&recent, &previous),
            intensity: self.intensity_signal(sessions),
            consistency: self.consistency_signal(&recent),
        };

        let classification = combine(signals);
        tracing::debug!(
            "Trend {:?} (score {:.1}) from calories={:?} intensity={:?} consistency={:?}",
            classification.status,
            classification.score,
            signals.calories,
            signals.intensity,
            signals.consistency
        );
        classification
    }

    fn calorie_signal(&self, recent: &[&DailyMetric], previous: &[&DailyMetric]) -> TrendStatus {
        let window = self.window.len();

        let change = if recent.len() >= window && previous.len() >= window {
            percent_change(mean_calories(previous), mean_calories(recent))
        } else {
            // Short history: oldest known day against newest known day
            let newest = recent.first().or_else(|| previous.first());
            let oldest = previous.last().or_else(|| recent.last());
            match (oldest, newest) {
                (Some(oldest), Some(newest)) if oldest.date < newest.date => {
                    tracing::debug!("Calorie trend falling back to first-vs-last comparison");
                    percent_change(oldest.calories_burned, newest.calories_burned)
                }
                _ => return TrendStatus::Maintaining,
            }
        };

        if change >= self.calorie_change_percent {
            TrendStatus::Improving
        } else if change <= -self.calorie_change_percent {
            TrendStatus::Regressing
        } else {
            TrendStatus::Maintaining
        }
    }

    fn intensity_signal(&self, sessions: &[SessionRecord]) -> TrendStatus {
        let mut sorted: Vec<&SessionRecord> = sessions.iter().collect();
        sorted.sort_by(|a, b| b.performed_at.cmp(&a.performed_at));
        sorted.truncate(self.recent_sessions);

        if sorted.len() < self.min_intensity_sessions {
            return TrendStatus::Maintaining;
        }

        let half = sorted.len() / 2;
        let newer = mean_intensity(&sorted[..half]);
        let older = mean_intensity(&sorted[half..half * 2]);

        if newer > older {
            TrendStatus::Improving
        } else if newer < older {
            TrendStatus::Regressing
        } else {
            TrendStatus::Maintaining
        }
    }

    fn consistency_signal(&self, recent: &[&DailyMetric]) -> TrendStatus {
        let active = recent.iter().filter(|m| m.is_active()).count() as u32;

        let meets = |threshold: u32| match self.consistency_scaling {
            ConsistencyScaling::Fixed => active >= threshold,
            ConsistencyScaling::Proportional => {
                u64::from(active) * u64::from(CONSISTENCY_REFERENCE_DAYS)
                    >= u64::from(threshold) * u64::from(self.window.days())
            }
        };

        if meets(IMPROVING_ACTIVE_DAYS) {
            TrendStatus::Improving
        } else if meets(MAINTAINING_ACTIVE_DAYS) {
            TrendStatus::Maintaining
        } else {
            TrendStatus::Regressing
        }
    }
}

/// Majority vote with a regressing-first tie-break, plus the meter score
pub fn combine(signals: TrendSignals) -> TrendClassification {
    let count = |status: TrendStatus| signals.votes().iter().filter(|v| **v == status).count();
    let improving = count(TrendStatus::Improving);
    let maintaining = count(TrendStatus::Maintaining);
    let regressing = count(TrendStatus::Regressing);

    let status = if improving >= 2 {
        TrendStatus::Improving
    } else if regressing >= 2 {
        TrendStatus::Regressing
    } else if maintaining >= 2 {
        TrendStatus::Maintaining
    } else if regressing > 0 {
        TrendStatus::Regressing
    } else if improving > 0 {
        TrendStatus::Improving
    } else {
        TrendStatus::Maintaining
    };

    TrendClassification {
        status,
        score: meter_score(improving, regressing),
        signals,
    }
}

/// Linear 0-100 meter value: 50 plus a third for each improving vote, minus a
/// third for each regressing vote
pub fn meter_score(improving: usize, regressing: usize) -> f64 {
    let third = 100.0 / 3.0;
    (improving as f64 * third - regressing as f64 * third + 50.0).clamp(0.0, 100.0)
}

/// Percent change from `previous` to `recent`; a zero baseline counts as a
/// 100% rise if anything was burned since
fn percent_change(previous: f64, recent: f64) -> f64 {
    if previous == 0.0 {
        if recent > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        (recent - previous) / previous * 100.0
    }
}

fn newest_first(metrics: &[DailyMetric], window: usize) -> Vec<&DailyMetric> {
    let mut sorted: Vec<&DailyMetric> = metrics.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(window);
    sorted
}

fn mean_calories(metrics: &[&DailyMetric]) -> f64 {
    if metrics.is_empty() {
        return 0.0;
    }
    metrics.iter().map(|m| m.calories_burned.max(0.0)).sum::<f64>() / metrics.len() as f64
}

fn mean_intensity(sessions: &[&SessionRecord]) -> f64 {
    if sessions.is_empty() {
        return 0.0;
    }
    sessions.iter().map(|s| s.effective_intensity()).sum::<f64>() / sessions.len() as f64
}
