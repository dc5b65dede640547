//! MoodRhythm CLI
//!
//! Privacy-first mood and energy analysis from keystroke timing.

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use crossbeam_channel::RecvTimeoutError;
use moodrhythm::{
    analysis::{
        analyze_session, calculate_mood_timeline, rhythm::day_name, weekly_rhythm,
        SessionAnalysis, DEFAULT_WINDOW_SIZE,
    },
    capture::{ManualSource, StdinSource, TypingRecorder},
    config::Config,
    export::{read_events, read_hourly_stats, write_session_summary},
    transparency::{create_shared_log_with_persistence, TransparencyLog},
    PRIVACY_DECLARATION, VERSION,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "moodrhythm")]
#[command(version = VERSION)]
#[command(about = "Privacy-first mood analysis from typing rhythm", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record typing rhythm (one keypress per byte read from stdin)
    Record {
        /// Stop automatically after this many seconds (0 = until Ctrl+C)
        #[arg(long, default_value_t = 0)]
        duration: u64,
    },

    /// Run a synthetic typing profile through the recorder and analyzer
    Simulate {
        /// Typing profile to replay
        #[arg(long, value_enum, default_value_t = Profile::Steady)]
        profile: Profile,

        /// Number of keypresses to synthesize
        #[arg(long, default_value_t = 120)]
        events: usize,
    },

    /// Analyze a historical events file (JSON array of timing events)
    Analyze {
        /// Path to the events file
        input: PathBuf,

        /// Events per timeline window (defaults to the configured window)
        #[arg(long)]
        window: Option<usize>,
    },

    /// Summarize weekly rhythm from an hourly-stats file
    Rhythm {
        /// Path to the hourly stats file (JSON array of day/hour buckets)
        input: PathBuf,
    },

    /// Show configuration and cumulative collection statistics
    Status,

    /// Display privacy declaration
    Privacy,

    /// Show configuration
    Config,
}

/// Deterministic synthetic typing profiles.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Profile {
    /// Even ~100ms rhythm
    Steady,
    /// Burst runs broken by long gaps
    Bursty,
    /// Unhurried ~500ms rhythm
    Sluggish,
    /// Regular typing interrupted by thinking pauses
    Weary,
}

impl Profile {
    /// Inter-keystroke gaps (ms) for a session of `count` keypresses.
    fn gaps(self, count: usize) -> Vec<i64> {
        let n = count.saturating_sub(1);
        (0..n as i64)
            .map(|i| match self {
                Profile::Steady => 95 + (i % 3) * 5,
                Profile::Bursty => {
                    if i % 4 == 3 {
                        700
                    } else {
                        30
                    }
                }
                Profile::Sluggish => 480 + (i % 5) * 10,
                Profile::Weary => {
                    if i % 5 == 4 {
                        2600
                    } else {
                        300
                    }
                }
            })
            .collect()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Record { duration } => cmd_record(duration),
        Commands::Simulate { profile, events } => cmd_simulate(profile, events),
        Commands::Analyze { input, window } => cmd_analyze(&input, window),
        Commands::Rhythm { input } => cmd_rhythm(&input),
        Commands::Status => cmd_status(),
        Commands::Privacy => cmd_privacy(),
        Commands::Config => cmd_config(),
    }
}

fn cmd_record(duration_secs: u64) {
    let config = Config::load().unwrap_or_default();
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: could not create directories: {e}");
    }

    let transparency =
        create_shared_log_with_persistence(config.data_path.join("transparency.json"));

    println!("MoodRhythm v{VERSION}");
    println!();
    println!("Recording typing rhythm from stdin.");
    println!("Only keystroke timing is read - never key identity.");
    if duration_secs > 0 {
        println!("Capturing for {duration_secs}s. Press Ctrl+C to stop early.");
    } else {
        println!("Press Ctrl+C to stop.");
    }
    println!();

    let mut recorder = TypingRecorder::new(StdinSource::new());
    let session_id = match recorder.start() {
        Ok(id) => id,
        Err(e) => {
            eprintln!("Error starting capture: {e}");
            eprintln!();
            eprintln!("The input source could not be opened. Check that stdin is");
            eprintln!("readable, then try again.");
            std::process::exit(1);
        }
    };
    println!("Session: {session_id}");
    println!();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    let updates = recorder.updates().clone();
    let started = Instant::now();
    let mut last_stats = Instant::now();
    let mut seen = 0u64;

    while running.load(Ordering::SeqCst) {
        if duration_secs > 0 && started.elapsed() >= Duration::from_secs(duration_secs) {
            break;
        }

        match updates.recv_timeout(Duration::from_millis(200)) {
            Ok(event) => {
                transparency.record_keypress(event.is_pause, event.is_burst);
                seen += 1;
                if seen <= 5 || seen % 50 == 0 {
                    match event.interval_ms {
                        Some(gap) => {
                            let tag = if event.is_pause {
                                " (pause)"
                            } else if event.is_burst {
                                " (burst)"
                            } else {
                                ""
                            };
                            println!("  keypress #{seen}: {gap:.0}ms gap{tag}");
                        }
                        None => println!("  keypress #{seen}: session start"),
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if last_stats.elapsed() >= Duration::from_secs(5) {
            let stats = recorder.current_stats();
            if stats.keypress_count > 0 {
                println!(
                    "  [{:.0}s] {} keypresses | {:.1} wpm | {} pauses | {} bursts",
                    stats.elapsed_secs,
                    stats.keypress_count,
                    stats.wpm,
                    stats.pause_count,
                    stats.burst_count
                );
            }
            last_stats = Instant::now();
        }
    }

    println!();
    println!("Stopping capture...");
    let Some(summary) = recorder.stop() else {
        println!("Nothing recorded.");
        return;
    };
    transparency.record_session();

    println!(
        "Session {} finished: {} keypresses in {:.1}s",
        summary.session_id, summary.total_keypresses, summary.duration_secs
    );
    println!();

    let analysis = analyze_session(&summary.events);
    transparency.record_analysis();
    print_analysis(&analysis);
    println!();

    match write_session_summary(&config.export_path, &summary) {
        Ok(path) => println!("Exported session to {path:?}"),
        Err(e) => eprintln!("Error writing session export: {e}"),
    }

    if let Err(e) = transparency.save() {
        eprintln!("Warning: could not save transparency stats: {e}");
    }

    println!();
    println!("{}", transparency.summary());
}

fn cmd_simulate(profile: Profile, count: usize) {
    println!("Simulating {count} keypresses ({profile:?} profile)...");
    println!();

    let source = ManualSource::new();
    let keys = source.handle();
    let mut recorder = TypingRecorder::new(source);

    if let Err(e) = recorder.start() {
        eprintln!("Error starting recorder: {e}");
        std::process::exit(1);
    }

    if count > 0 {
        let mut ts = Utc::now();
        keys.press_at(ts);
        for gap in profile.gaps(count) {
            ts = ts + chrono::Duration::milliseconds(gap);
            keys.press_at(ts);
        }
    }

    // Wait for the listener thread to drain the synthetic presses
    let deadline = Instant::now() + Duration::from_secs(5);
    while recorder.events().len() < count && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }

    let Some(summary) = recorder.stop() else {
        eprintln!("Recorder was not running");
        std::process::exit(1);
    };

    println!("Recorded {} events", summary.total_keypresses);
    println!();

    let analysis = analyze_session(&summary.events);
    print_analysis(&analysis);
    println!();

    let timeline = calculate_mood_timeline(&summary.events, DEFAULT_WINDOW_SIZE);
    println!("Timeline ({} points):", timeline.len());
    for point in &timeline {
        println!(
            "  {} | energy {} | {:.1} wpm",
            point.mood, point.energy_score, point.wpm
        );
    }
}

fn cmd_analyze(input: &PathBuf, window: Option<usize>) {
    let config = Config::load().unwrap_or_default();

    let events = match read_events(input) {
        Ok(events) => events,
        Err(e) => {
            eprintln!("Error loading events from {input:?}: {e}");
            std::process::exit(1);
        }
    };
    println!("Loaded {} events from {:?}", events.len(), input);
    println!();

    let analysis = analyze_session(&events);
    print_analysis(&analysis);
    println!();

    let window = window.unwrap_or(config.timeline_window);
    let timeline = calculate_mood_timeline(&events, window);
    println!("Mood timeline ({} windows of {} events):", timeline.len(), window);
    for point in &timeline {
        println!(
            "  {} | {} | energy {} | {:.1} wpm",
            point.timestamp.format("%Y-%m-%d %H:%M:%S"),
            point.mood,
            point.energy_score,
            point.wpm
        );
    }

    let transparency =
        create_shared_log_with_persistence(config.data_path.join("transparency.json"));
    transparency.record_analysis();
    if let Err(e) = transparency.save() {
        tracing::debug!("could not save transparency stats: {e}");
    }
}

fn cmd_rhythm(input: &PathBuf) {
    let stats = match read_hourly_stats(input) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("Error loading hourly stats from {input:?}: {e}");
            std::process::exit(1);
        }
    };

    let rhythm = weekly_rhythm(&stats);
    let (Some(_), Some(_)) = (rhythm.peak_day, rhythm.peak_hour) else {
        println!("No activity data.");
        return;
    };

    println!("Weekly rhythm from {} hourly buckets", stats.len());
    println!();

    for insight in &rhythm.insights {
        println!("  {insight}");
    }
    if rhythm.insights.is_empty() {
        println!("  No activity recorded yet.");
    }
    println!();

    println!("Keypresses per day:");
    for (day, row) in rhythm.activity_matrix.iter().enumerate() {
        let total: u64 = row.iter().sum();
        if let Some(name) = day_name(day) {
            println!("  {name:<9} {total}");
        }
    }
}

fn cmd_status() {
    let config = Config::load().unwrap_or_default();

    println!("MoodRhythm Status");
    println!("=================");
    println!();

    println!("Configuration:");
    println!("  Export path: {:?}", config.export_path);
    println!("  Data path: {:?}", config.data_path);
    println!("  Timeline window: {} events", config.timeline_window);
    println!();

    let stats_path = config.data_path.join("transparency.json");
    if stats_path.exists() {
        let log = TransparencyLog::with_persistence(stats_path);
        println!("{}", log.summary());
    } else {
        println!("No previous collection data found.");
    }
}

fn cmd_privacy() {
    println!("{PRIVACY_DECLARATION}");
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

fn print_analysis(analysis: &SessionAnalysis) {
    println!("Session Analysis:");
    println!(
        "  Mood: {} (confidence {:.2})",
        analysis.mood, analysis.mood_confidence
    );
    println!("  Energy score: {}", analysis.energy_score);
    println!("  WPM: {:.1}", analysis.wpm);
    println!("  Keypresses: {}", analysis.total_keypresses);
    println!("  Duration: {:.1}s", analysis.duration_secs);
    if let Some(indicators) = &analysis.indicators {
        println!("  Indicators:");
        println!("    avg interval: {:.1}ms", indicators.avg_interval_ms);
        println!(
            "    rhythm consistency: {:.2}",
            indicators.rhythm_consistency
        );
        println!("    burst ratio: {:.3}", indicators.burst_ratio);
        println!("    pause ratio: {:.3}", indicators.pause_ratio);
    }
}
