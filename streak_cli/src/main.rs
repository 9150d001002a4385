use chrono::{DateTime, FixedOffset, Local, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use streak_core::dates::parse_timestamp;
use streak_core::report::ProgressReport;
use streak_core::*;

#[derive(Parser)]
#[command(name = "streakline")]
#[command(about = "Workout streak and progress tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Reference time (RFC 3339) to use instead of the local clock
    #[arg(long, global = true)]
    now: Option<String>,

    /// Print debug logging to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show streak, consistency, trend and totals (default)
    Report {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show current and longest streak
    Streak {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the improvement trend and the vote behind it
    Trend {
        /// Comparison window in days (overrides config)
        #[arg(long)]
        window: Option<u32>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record a completed workout
    Log {
        /// Routine name
        #[arg(long)]
        routine: String,

        /// Calories burned
        #[arg(long, default_value_t = 0.0)]
        calories: f64,

        /// Total reps performed
        #[arg(long, default_value_t = 0)]
        reps: u32,

        /// Duration in minutes
        #[arg(long, default_value_t = 0)]
        duration: u32,

        /// Session intensity (0-10)
        #[arg(long)]
        intensity: Option<f64>,

        /// When the workout happened (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Record a completed challenge
    Challenge {
        /// Challenge identifier
        #[arg(long)]
        id: String,

        /// Challenge title
        #[arg(long)]
        title: String,

        #[arg(long, value_enum, default_value_t = KindArg::Daily)]
        kind: KindArg,

        /// Points awarded
        #[arg(long, default_value_t = 10)]
        points: u32,

        /// When the challenge was completed (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Daily,
    Weekly,
}

impl From<KindArg> for ChallengeKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Daily => ChallengeKind::Daily,
            KindArg::Weekly => ChallengeKind::Weekly,
        }
    }
}

/// File locations inside the data directory
struct DataPaths {
    log: PathBuf,
    archive: PathBuf,
}

impl DataPaths {
    fn new(data_dir: &Path) -> Self {
        Self {
            log: data_dir.join("activity.jsonl"),
            archive: data_dir.join("archive.csv"),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep stdout clean for --json unless asked for detail
    if cli.verbose {
        streak_core::logging::init_with_level("debug");
    } else {
        streak_core::logging::init_with_level("warn");
    }

    let config = Config::load()?;
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());
    let paths = DataPaths::new(&data_dir);
    let now = resolve_now(cli.now.as_deref())?;
    tracing::debug!("Data dir {:?}, reference time {}", data_dir, now);

    match cli.command {
        Some(Commands::Report { json }) => cmd_report(&paths, &now, &config, json),
        Some(Commands::Streak { json }) => cmd_streak(&paths, &now, json),
        Some(Commands::Trend { window, json }) => {
            let mut trend_config = config.trend.clone();
            if let Some(days) = window {
                trend_config.window_days = days;
            }
            cmd_trend(&paths, &now, &trend_config, json)
        }
        Some(Commands::Log {
            routine,
            calories,
            reps,
            duration,
            intensity,
            at,
        }) => {
            let workout = WorkoutLog {
                id: uuid::Uuid::new_v4(),
                routine_name: routine,
                performed_at: resolve_at(at.as_deref(), &now)?,
                calories_burned: calories.max(0.0),
                total_reps: reps,
                duration_minutes: duration,
                intensity_score: intensity,
                exercises: vec![],
                completed: true,
            };
            cmd_record(&paths, &now, ActivityEntry::Workout(workout))
        }
        Some(Commands::Challenge {
            id,
            title,
            kind,
            points,
            at,
        }) => {
            let challenge = ChallengeCompletion {
                id: uuid::Uuid::new_v4(),
                challenge_id: id,
                challenge_title: title,
                kind: kind.into(),
                points,
                completed_at: resolve_at(at.as_deref(), &now)?,
                status: ChallengeStatus::Completed,
            };
            cmd_record(&paths, &now, ActivityEntry::Challenge(challenge))
        }
        None => cmd_report(&paths, &now, &config, false),
    }
}

fn resolve_now(raw: Option<&str>) -> Result<DateTime<FixedOffset>> {
    match raw {
        Some(raw) => DateTime::parse_from_rfc3339(raw.trim())
            .map_err(|e| Error::InvalidInput(format!("--now {:?}: {}", raw, e))),
        None => Ok(Local::now().fixed_offset()),
    }
}

fn resolve_at(raw: Option<&str>, now: &DateTime<FixedOffset>) -> Result<DateTime<Utc>> {
    match raw {
        Some(raw) => parse_timestamp(raw, &now.timezone())
            .ok_or_else(|| Error::InvalidInput(format!("--at {:?} is not a timestamp", raw))),
        None => Ok(now.with_timezone(&Utc)),
    }
}

fn load_entries(paths: &DataPaths, now: &DateTime<FixedOffset>) -> Result<Vec<ActivityEntry>> {
    load_activity(&paths.log, &paths.archive, &now.timezone())
}

fn cmd_report(
    paths: &DataPaths,
    now: &DateTime<FixedOffset>,
    config: &Config,
    json: bool,
) -> Result<()> {
    let entries = load_entries(paths, now)?;
    let report = build_report(&entries, now, &config.trend)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display_report(&report);
    }
    Ok(())
}

fn cmd_streak(paths: &DataPaths, now: &DateTime<FixedOffset>, json: bool) -> Result<()> {
    let entries = load_entries(paths, now)?;
    let streak = compute_streak(entries.iter().filter_map(ActivityEntry::occurred_at), now);

    if json {
        println!("{}", serde_json::to_string_pretty(&streak)?);
    } else {
        display_streak(&streak);
    }
    Ok(())
}

fn cmd_trend(
    paths: &DataPaths,
    now: &DateTime<FixedOffset>,
    trend_config: &TrendConfig,
    json: bool,
) -> Result<()> {
    let entries = load_entries(paths, now)?;
    let report = build_report(&entries, now, trend_config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report.trend)?);
    } else {
        display_trend(&report.trend);
    }
    Ok(())
}

fn cmd_record(paths: &DataPaths, now: &DateTime<FixedOffset>, entry: ActivityEntry) -> Result<()> {
    let mut log = JsonlActivityLog::new(&paths.log);
    log.append(&entry)?;

    match &entry {
        ActivityEntry::Workout(workout) => println!("✓ Workout logged: {}", workout.routine_name),
        ActivityEntry::Challenge(challenge) => println!(
            "✓ Challenge completed: {} (+{} points)",
            challenge.challenge_title, challenge.points
        ),
    }

    let entries = load_entries(paths, now)?;
    let streak = compute_streak(entries.iter().filter_map(ActivityEntry::occurred_at), now);
    println!("  Current streak: {} {}", streak.current, days(streak.current));
    Ok(())
}

fn days(n: u32) -> &'static str {
    if n == 1 {
        "day"
    } else {
        "days"
    }
}

fn display_report(report: &ProgressReport) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  PROGRESS · {}", report.today);
    println!("╰─────────────────────────────────────────╯");
    println!();

    display_streak(&report.streak);
    println!();
    display_trend(&report.trend);
    println!();

    let totals = &report.totals;
    println!(
        "  Workouts: {}   Reps: {}   Calories: {:.0} (today {:.0})",
        totals.workouts, totals.total_reps, totals.calories_burned, totals.calories_today
    );
    println!(
        "  Challenges: {} ({} points)",
        totals.challenges_completed, totals.challenge_points
    );

    if !report.recent_days.is_empty() {
        println!();
        println!("  Recent days:");
        for day in &report.recent_days {
            println!(
                "    {}  {:>5.0} kcal  {} workout(s)  {:>4} reps  intensity {:.0}",
                day.date, day.calories_burned, day.workouts_completed, day.total_reps, day.intensity
            );
        }
    }
    println!();
}

fn display_streak(streak: &StreakResult) {
    println!("  Current streak:     {} {}", streak.current, days(streak.current));
    println!("  Longest streak:     {} {}", streak.longest, days(streak.longest));
    println!("  Weekly consistency: {}%", streak.weekly_consistency_percent);
    match streak.last_activity_date {
        Some(date) => println!("  Last activity:      {}", date),
        None => println!("  Last activity:      none yet"),
    }
}

fn display_trend(trend: &TrendClassification) {
    println!("  Trend: {} (score {:.0})", trend.status, trend.score);
    println!(
        "    calories: {} · intensity: {} · consistency: {}",
        trend.signals.calories, trend.signals.intensity, trend.signals.consistency
    );
    println!("  {}", trend.status.message());
}
