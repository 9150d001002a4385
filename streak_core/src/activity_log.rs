//! The activity log: every workout and challenge the user records, one JSON
//! object per line in `activity.jsonl`.
//!
//! The CLI may run several times at once, so appends hold an exclusive
//! `fs2` lock and reads hold a shared one. A torn or hand-edited line costs
//! that one entry, not the whole history.

use crate::{ActivityEntry, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Somewhere new activity can be recorded
pub trait ActivitySink {
    fn append(&mut self, entry: &ActivityEntry) -> Result<()>;
}

/// `activity.jsonl` on disk
pub struct JsonlActivityLog {
    path: PathBuf,
}

impl JsonlActivityLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_all(&self) -> Result<Vec<ActivityEntry>> {
        read_entries(&self.path)
    }
}

impl ActivitySink for JsonlActivityLog {
    fn append(&mut self, entry: &ActivityEntry) -> Result<()> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;
        let written = file.write_all(&line).and_then(|_| file.flush());
        file.unlock()?;
        written?;

        tracing::debug!("Recorded {} in {:?}", entry.id(), self.path);
        Ok(())
    }
}

/// Every entry in the log at `path`, oldest first
///
/// No file yet means no activity yet. Lines that are not valid UTF-8 or do
/// not decode as an [`ActivityEntry`] are logged and skipped; any other read
/// failure is returned.
pub fn read_entries(path: &Path) -> Result<Vec<ActivityEntry>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    file.lock_shared()?;
    let entries = parse_lines(BufReader::new(&file));
    file.unlock()?;

    let entries = entries?;
    tracing::debug!("{} entries in {:?}", entries.len(), path);
    Ok(entries)
}

fn parse_lines(reader: impl BufRead) -> Result<Vec<ActivityEntry>> {
    let mut entries = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = match line {
            Ok(line) => line,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                tracing::warn!("Activity log line {} is not UTF-8, skipping", line_no);
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => tracing::warn!("Skipping activity log line {}: {}", line_no, e),
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChallengeCompletion, ChallengeKind, ChallengeStatus, WorkoutLog};
    use chrono::Utc;
    use uuid::Uuid;

    fn workout_entry() -> ActivityEntry {
        ActivityEntry::Workout(WorkoutLog {
            id: Uuid::new_v4(),
            routine_name: "Upper body".into(),
            performed_at: Utc::now(),
            calories_burned: 180.0,
            total_reps: 45,
            duration_minutes: 25,
            intensity_score: Some(6.0),
            exercises: vec![],
            completed: true,
        })
    }

    fn challenge_entry() -> ActivityEntry {
        ActivityEntry::Challenge(ChallengeCompletion {
            id: Uuid::new_v4(),
            challenge_id: "pushups-50".into(),
            challenge_title: "50 push-ups".into(),
            kind: ChallengeKind::Daily,
            points: 15,
            completed_at: Utc::now(),
            status: ChallengeStatus::Completed,
        })
    }

    #[test]
    fn test_append_and_read_back() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("activity.jsonl");

        let workout = workout_entry();
        let challenge = challenge_entry();

        let mut log = JsonlActivityLog::new(&path);
        log.append(&workout).unwrap();
        log.append(&challenge).unwrap();

        let entries = log.read_all().unwrap();
        assert_eq!(entries, vec![workout, challenge]);
    }

    #[test]
    fn test_append_creates_parent_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested/dir/activity.jsonl");

        let mut log = JsonlActivityLog::new(&path);
        log.append(&workout_entry()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_read_missing_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let entries = read_entries(&temp_dir.path().join("nonexistent.jsonl")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_non_utf8_line_is_skipped() {
        crate::logging::init_test();

        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("activity.jsonl");

        let good = challenge_entry();
        let mut contents = vec![0xff, 0xfe, b'{', b'\n'];
        contents.extend(serde_json::to_vec(&good).unwrap());
        contents.push(b'\n');
        std::fs::write(&path, contents).unwrap();

        assert_eq!(read_entries(&path).unwrap(), vec![good]);
    }

    #[test]
    fn test_unreadable_path_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        // A directory opens on Unix but every read fails with a non-data error
        let result = read_entries(temp_dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_corrupt_lines_are_skipped() {
        crate::logging::init_test();

        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("activity.jsonl");

        let good = workout_entry();
        let contents = format!(
            "{{ not json }}\n\n{}\n{{\"type\":\"workout\",\"id\":\"truncated",
            serde_json::to_string(&good).unwrap()
        );
        std::fs::write(&path, contents).unwrap();

        let entries = read_entries(&path).unwrap();
        assert_eq!(entries, vec![good]);
    }
}
