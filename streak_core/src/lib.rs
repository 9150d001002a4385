#![forbid(unsafe_code)]

//! Streak, consistency and trend computation for Streakline.
//!
//! This crate provides:
//! - Domain types (workout logs, challenge completions, daily metrics)
//! - Calendar-date normalization
//! - Streak and weekly consistency calculation
//! - Improvement trend classification
//! - Persistence adapters (JSONL activity log, CSV archive import)
//! - Progress report assembly

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod dates;
pub mod streak;
pub mod daily;
pub mod trend;
pub mod activity_log;
pub mod history;
pub mod report;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::{Config, ConsistencyScaling, TrendConfig};
pub use dates::{normalize_to_date_keys, DateKey, DateKeys, RawTimestamp};
pub use streak::{compute_streak, compute_weekly_consistency};
pub use daily::{aggregate_daily_metrics, merge_daily_metrics, split_windows};
pub use trend::{classify_trend, TrendClassifier};
pub use activity_log::{ActivitySink, JsonlActivityLog};
pub use history::load_activity;
pub use report::{build_report, ProgressReport};
