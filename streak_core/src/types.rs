//! Core domain types for Streakline.
//!
//! This module defines:
//! - Activity records (workout logs, challenge completions)
//! - Per-day aggregated metrics
//! - Streak and trend result values

use crate::dates::DateKey;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Intensity assumed for a session or day that carries no intensity value
pub const NEUTRAL_INTENSITY: f64 = 5.0;

/// Upper bound of the intensity scale
pub const MAX_INTENSITY: f64 = 10.0;

// ============================================================================
// Activity Records
// ============================================================================

/// One exercise performed as part of a workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseEntry {
    pub name: String,
    #[serde(default)]
    pub intensity: Option<f64>,
}

/// A logged workout session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutLog {
    pub id: Uuid,
    pub routine_name: String,
    pub performed_at: DateTime<Utc>,
    #[serde(default)]
    pub calories_burned: f64,
    #[serde(default)]
    pub total_reps: u32,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default)]
    pub intensity_score: Option<f64>,
    #[serde(default)]
    pub exercises: Vec<ExerciseEntry>,
    #[serde(default = "default_completed")]
    pub completed: bool,
}

fn default_completed() -> bool {
    true
}

impl WorkoutLog {
    /// Intensity of this session on the 0-10 scale
    ///
    /// Uses the explicit score when present, otherwise the rounded mean of the
    /// exercise intensities (each defaulting to neutral), otherwise neutral.
    pub fn session_intensity(&self) -> f64 {
        if let Some(score) = self.intensity_score {
            return clamp_intensity(score);
        }

        if self.exercises.is_empty() {
            return NEUTRAL_INTENSITY;
        }

        let total: f64 = self
            .exercises
            .iter()
            .map(|e| e.intensity.map_or(NEUTRAL_INTENSITY, clamp_intensity))
            .sum();
        (total / self.exercises.len() as f64).round()
    }

    /// Reduce this log to the record the intensity trend consumes
    pub fn session_record(&self) -> SessionRecord {
        SessionRecord {
            performed_at: self.performed_at,
            intensity: Some(self.session_intensity()),
        }
    }
}

/// Cadence of a challenge
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    Daily,
    Weekly,
}

/// Lifecycle of a user's attempt at a challenge
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStatus {
    Completed,
    InProgress,
    Failed,
}

/// A user's record against a daily or weekly challenge
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChallengeCompletion {
    pub id: Uuid,
    pub challenge_id: String,
    pub challenge_title: String,
    pub kind: ChallengeKind,
    #[serde(default)]
    pub points: u32,
    pub completed_at: DateTime<Utc>,
    pub status: ChallengeStatus,
}

/// Anything stored in the activity log
///
/// Only entries that represent performed activity take part in streaks;
/// see [`ActivityEntry::occurred_at`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityEntry {
    Workout(WorkoutLog),
    Challenge(ChallengeCompletion),
}

impl ActivityEntry {
    pub fn id(&self) -> Uuid {
        match self {
            ActivityEntry::Workout(log) => log.id,
            ActivityEntry::Challenge(challenge) => challenge.id,
        }
    }

    /// Timestamp used for ordering, whether or not the entry counts as activity
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ActivityEntry::Workout(log) => log.performed_at,
            ActivityEntry::Challenge(challenge) => challenge.completed_at,
        }
    }

    /// The instant this entry counts as activity, if it does at all
    ///
    /// Unfinished workouts and challenges that are in progress or failed
    /// return `None`.
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        match self {
            ActivityEntry::Workout(log) if log.completed => Some(log.performed_at),
            ActivityEntry::Challenge(challenge)
                if challenge.status == ChallengeStatus::Completed =>
            {
                Some(challenge.completed_at)
            }
            _ => None,
        }
    }

    pub fn as_workout(&self) -> Option<&WorkoutLog> {
        match self {
            ActivityEntry::Workout(log) => Some(log),
            ActivityEntry::Challenge(_) => None,
        }
    }

    pub fn as_challenge(&self) -> Option<&ChallengeCompletion> {
        match self {
            ActivityEntry::Workout(_) => None,
            ActivityEntry::Challenge(challenge) => Some(challenge),
        }
    }
}

/// Per-session input to the intensity trend
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub performed_at: DateTime<Utc>,
    #[serde(default)]
    pub intensity: Option<f64>,
}

impl SessionRecord {
    pub fn effective_intensity(&self) -> f64 {
        self.intensity.map_or(NEUTRAL_INTENSITY, clamp_intensity)
    }
}

// ============================================================================
// Daily Metrics
// ============================================================================

/// Aggregated activity for a single calendar day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DailyMetric {
    pub date: NaiveDate,
    #[serde(default)]
    pub calories_burned: f64,
    #[serde(default)]
    pub workouts_completed: u32,
    #[serde(default)]
    pub total_reps: u32,
    #[serde(default)]
    pub intensity: Option<f64>,
}

impl DailyMetric {
    /// A day with nothing recorded
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            calories_burned: 0.0,
            workouts_completed: 0,
            total_reps: 0,
            intensity: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.workouts_completed > 0
    }

    /// Intensity for display, falling back to the neutral estimate
    pub fn effective_intensity(&self) -> f64 {
        self.intensity.map_or(NEUTRAL_INTENSITY, clamp_intensity)
    }
}

fn clamp_intensity(value: f64) -> f64 {
    if value.is_nan() {
        NEUTRAL_INTENSITY
    } else {
        value.clamp(0.0, MAX_INTENSITY)
    }
}

// ============================================================================
// Results
// ============================================================================

/// Streak summary for one user at one reference day
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreakResult {
    pub current: u32,
    pub longest: u32,
    pub weekly_consistency_percent: u8,
    pub last_activity_date: Option<DateKey>,
}

/// Direction a user's training is heading
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TrendStatus {
    Improving,
    Maintaining,
    Regressing,
}

impl TrendStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendStatus::Improving => "improving",
            TrendStatus::Maintaining => "maintaining",
            TrendStatus::Regressing => "regressing",
        }
    }

    /// Encouragement shown next to the improvement meter
    pub fn message(&self) -> &'static str {
        match self {
            TrendStatus::Improving => "Great progress! Keep it up!",
            TrendStatus::Maintaining => "Steady progress. Push a bit harder!",
            TrendStatus::Regressing => "Time to refocus. You can do it!",
        }
    }
}

impl std::fmt::Display for TrendStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The vote cast by each of the three trend signals
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrendSignals {
    pub calories: TrendStatus,
    pub intensity: TrendStatus,
    pub consistency: TrendStatus,
}

impl TrendSignals {
    pub fn votes(&self) -> [TrendStatus; 3] {
        [self.calories, self.intensity, self.consistency]
    }
}

/// Combined trend verdict plus a 0-100 meter value
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrendClassification {
    pub status: TrendStatus,
    pub score: f64,
    pub signals: TrendSignals,
}
