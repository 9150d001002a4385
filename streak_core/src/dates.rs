//! Calendar-date normalization.
//!
//! Every streak computation works on [`DateKey`]s: instants truncated to a day
//! in the viewer's calendar. The viewer's calendar is whatever time zone the
//! caller's "now" carries, so two instants that fall on the same local day
//! always produce the same key.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar day with no time-of-day or zone attached
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The day `instant` falls on in the calendar of `tz`
    pub fn from_instant<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> Self {
        Self(instant.with_timezone(tz).date_naive())
    }

    /// The reference day for a computation anchored at `now`
    pub fn today<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        Self(now.date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The previous calendar day, `None` only at the start of chrono's range
    pub fn pred(&self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    /// The day `days` before this one
    pub fn days_before(&self, days: u64) -> Option<Self> {
        self.0.checked_sub_days(Days::new(days)).map(Self)
    }

    /// Whether `self` is exactly the calendar day before `later`
    pub fn is_day_before(&self, later: &DateKey) -> bool {
        later.pred() == Some(*self)
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Deduplicated date keys, most recent first
///
/// Only constructible through normalization, so every holder can rely on the
/// ordering without re-sorting.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DateKeys(Vec<DateKey>);

impl DateKeys {
    /// Sort descending and drop duplicates
    pub fn from_keys(keys: impl IntoIterator<Item = DateKey>) -> Self {
        let mut keys: Vec<DateKey> = keys.into_iter().collect();
        keys.sort_unstable_by(|a, b| b.cmp(a));
        keys.dedup();
        Self(keys)
    }

    pub fn as_slice(&self) -> &[DateKey] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DateKey> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn most_recent(&self) -> Option<DateKey> {
        self.0.first().copied()
    }

    /// Index of `key` in the descending sequence
    pub fn position(&self, key: DateKey) -> Option<usize> {
        // Descending order: an element greater than `key` sorts before it
        self.0.binary_search_by(|probe| key.cmp(probe)).ok()
    }

    pub fn contains(&self, key: DateKey) -> bool {
        self.position(key).is_some()
    }
}

impl FromIterator<DateKey> for DateKeys {
    fn from_iter<I: IntoIterator<Item = DateKey>>(iter: I) -> Self {
        Self::from_keys(iter)
    }
}

impl<'a> IntoIterator for &'a DateKeys {
    type Item = &'a DateKey;
    type IntoIter = std::slice::Iter<'a, DateKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Convert resolved instants into deduplicated, descending date keys
pub fn normalize_to_date_keys<Tz, I>(instants: I, tz: &Tz) -> DateKeys
where
    Tz: TimeZone,
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let keys = DateKeys::from_keys(
        instants
            .into_iter()
            .map(|instant| DateKey::from_instant(&instant, tz)),
    );
    tracing::debug!("Normalized activity to {} distinct days", keys.len());
    keys
}

// ============================================================================
// Raw timestamp resolution (caller side)
// ============================================================================

/// A timestamp as it arrives from a store, before it is resolved to an instant
#[derive(Clone, Debug, PartialEq)]
pub enum RawTimestamp<'a> {
    /// Milliseconds since the Unix epoch
    EpochMillis(i64),
    /// RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD`, or epoch milliseconds as text
    Text(&'a str),
    /// Already an instant
    Instant(DateTime<Utc>),
}

impl RawTimestamp<'_> {
    /// Resolve to an instant, reading zone-less values in the calendar of `tz`
    ///
    /// Returns `None` for anything that cannot be interpreted.
    pub fn resolve<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::EpochMillis(ms) => DateTime::from_timestamp_millis(*ms),
            RawTimestamp::Text(text) => parse_timestamp(text, tz),
            RawTimestamp::Instant(instant) => Some(*instant),
        }
    }
}

/// Parse a textual timestamp
///
/// Values without an offset are taken as local time in `tz`; a bare date is
/// local midnight.
pub fn parse_timestamp<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(ms) = raw.parse::<i64>() {
        return DateTime::from_timestamp_millis(ms);
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
