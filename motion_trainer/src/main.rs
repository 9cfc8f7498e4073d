// Offline front end of the trainer: replays a directory of still frames through
// the same session the live camera loop uses, and prints the training history
// kept in the session log.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use motion_trainer::core_modules::utils::image_helper::image_helper;
use motion_trainer::session::HistoryFilter;
use motion_trainer::{
    Exercise, Frame, FrameReport, HistoryReport, RepAlert, SessionLog, SilentAlert, TerminalBell,
    TrainerConfig, TrainerSession,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

#[derive(Parser, Debug)]
#[command(name = "motion_trainer")]
#[command(about = "Count squats, jumping jacks and sit-ups from motion, no pose model required")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a recorded sequence of frames through the rep counter
    Replay(ReplayArgs),
    /// Summarize past sessions from the session log
    History(HistoryArgs),
}

#[derive(clap::Args, Debug)]
struct ReplayArgs {
    /// squat, jumping_jack or situp
    #[arg(short, long)]
    exercise: Exercise,

    /// Directory of frames, replayed in file name order
    #[arg(short, long)]
    frames: PathBuf,

    /// Frame index at which to calibrate (the first later frame with a person is used)
    #[arg(long, default_value_t = 30)]
    calibrate_at: usize,

    /// Frame rate the sequence was recorded at, used for the session duration
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write every foreground mask as a PNG into this directory
    #[arg(long)]
    dump_masks: Option<PathBuf>,

    /// Session log to append to (defaults to the configured path)
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// Do not append the session to the log
    #[arg(long)]
    no_save: bool,

    /// Ring the terminal bell on every rep
    #[arg(long)]
    bell: bool,
}

#[derive(clap::Args, Debug)]
struct HistoryArgs {
    /// Session log to read (defaults to the configured path)
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only include these exercises (repeatable)
    #[arg(short, long)]
    exercise: Vec<Exercise>,

    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("motion_trainer=info")),
        )
        .init();

    match Cli::parse().command {
        Command::Replay(args) => replay(args),
        Command::History(args) => history(args),
    }
}

fn load_config(path: Option<&Path>) -> Result<TrainerConfig> {
    match path {
        Some(path) => TrainerConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(TrainerConfig::default()),
    }
}

/// An explicit `--log` wins over `session.log_path` from the config.
fn resolve_log_path(explicit: Option<PathBuf>, config: &TrainerConfig) -> PathBuf {
    explicit.unwrap_or_else(|| PathBuf::from(&config.session.log_path))
}

fn frame_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("cannot read frame directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

fn replay(args: ReplayArgs) -> Result<()> {
    if args.fps <= 0.0 {
        bail!("--fps must be positive, got {}", args.fps);
    }
    let config = load_config(args.config.as_deref())?;
    let paths = frame_paths(&args.frames)?;
    if paths.is_empty() {
        bail!("no frames found in {}", args.frames.display());
    }
    if let Some(dir) = &args.dump_masks {
        fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    }

    let alert: Box<dyn RepAlert> = if args.bell {
        Box::new(TerminalBell)
    } else {
        Box::new(SilentAlert)
    };
    let mut session = TrainerSession::with_alert(args.exercise, &config, alert);
    info!(frames = paths.len(), exercise = %args.exercise, "replay started");

    for (index, path) in paths.iter().enumerate() {
        let frame = match Frame::open(path) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(frame = %path.display(), error = %e, "skipping unreadable frame");
                continue;
            }
        };
        let report = match session.process_frame(&frame) {
            Ok(report) => report,
            Err(e) => {
                warn!(frame = %path.display(), error = %e, "skipping frame");
                continue;
            }
        };

        if let (Some(dir), Some(mask)) = (&args.dump_masks, session.last_mask()) {
            let target = dir.join(image_helper::mask_file_name(index));
            if let Err(e) = image_helper::save_mask(&target, mask) {
                warn!(error = %e, "could not write mask");
            }
        }

        if index >= args.calibrate_at && !session.is_calibrated() && report.silhouette().is_some() {
            session.calibrate();
        }

        if let FrameReport::Counted { update, .. } = &report {
            if update.rep_completed {
                println!("frame {index:>5}: rep {} ({})", update.rep_count, update.feedback);
            }
        }
    }

    if !session.is_calibrated() {
        warn!("never calibrated: no person was detected at or after frame {}", args.calibrate_at);
    }

    let elapsed = Duration::from_secs_f64(paths.len() as f64 / args.fps);
    let summary = session.finish_after(elapsed);
    println!("{summary}");

    if !args.no_save {
        let log_path = resolve_log_path(args.log, &config);
        match SessionLog::new(&log_path).append(&summary) {
            Ok(()) => println!("Session saved to {}", log_path.display()),
            Err(e) => warn!(error = %e, "failed to save session"),
        }
    }
    Ok(())
}

fn history(args: HistoryArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let log_path = resolve_log_path(args.log, &config);
    let records = SessionLog::new(&log_path)
        .read_all()
        .with_context(|| format!("cannot read session log {}", log_path.display()))?;
    if records.is_empty() {
        println!("No session data yet. Run a session first.");
        return Ok(());
    }

    let filter = HistoryFilter {
        exercises: args.exercise,
        from: args.from,
        to: args.to,
    };
    match HistoryReport::build(&records, &filter) {
        Some(report) => print!("{report}"),
        None => println!("No sessions in selected range."),
    }
    Ok(())
}
