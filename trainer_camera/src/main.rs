// Live front end: reads the webcam, runs every frame through a
// `TrainerSession` and draws the result on top of the picture.
//
// Controls: `c` calibrates against the person currently in view, `q` quits.
// When the camera stops delivering frames the loop ends as if `q` had been
// pressed. A frame that fails to draw or display is logged and skipped. Every
// way out of the loop goes through `finish_session`, so the summary is always
// printed and saved.

use clap::Parser;
use motion_trainer::{Exercise, SessionLog, SessionSummary, TrainerError, TrainerSession};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "trainer_camera")]
#[command(about = "Count exercise repetitions live from a webcam")]
struct Args {
    /// squat, jumping_jack or situp
    #[arg(short, long, default_value = "squat")]
    exercise: Exercise,

    /// Camera device index
    #[arg(long, default_value_t = 0)]
    camera: i32,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Session log to append to (defaults to the configured path)
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// Show the camera image as-is instead of mirrored
    #[arg(long)]
    no_mirror: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("motion_trainer=info,trainer_camera=info")),
        )
        .init();

    run(Args::parse())
}

/// Consecutive failed frames after which the loop gives up.
const MAX_CONSECUTIVE_ERRORS: u32 = 30;

/// What one pass of the capture loop decided.
#[cfg_attr(not(feature = "camera"), allow(dead_code))]
enum Tick {
    Continue,
    Quit,
    CameraLost(TrainerError),
}

/// Runs `tick` until it quits, the camera goes away, or too many frames in a
/// row fail. A failed frame is logged and the loop moves on.
#[cfg_attr(not(feature = "camera"), allow(dead_code))]
fn drive<F>(session: &mut TrainerSession, mut tick: F)
where
    F: FnMut(&mut TrainerSession) -> anyhow::Result<Tick>,
{
    let mut failures = 0;
    loop {
        match tick(session) {
            Ok(Tick::Continue) => failures = 0,
            Ok(Tick::Quit) => break,
            Ok(Tick::CameraLost(e)) => {
                warn!(error = %e, "stopping capture");
                println!("Camera not available.");
                break;
            }
            Err(e) => {
                failures += 1;
                warn!(error = %e, failures, "frame failed");
                if failures >= MAX_CONSECUTIVE_ERRORS {
                    warn!("too many failed frames in a row, stopping capture");
                    break;
                }
            }
        }
    }
}

/// Prints the session summary and appends it to `log_path`. A failed write is
/// logged, never fatal.
#[cfg_attr(not(feature = "camera"), allow(dead_code))]
fn finish_session(session: &TrainerSession, log_path: &Path) -> SessionSummary {
    let summary = session.finish();
    println!(
        "Session ended. Time: {:.1}s, Reps: {}, Calories (est): {:.2}",
        summary.duration_seconds, summary.reps, summary.calories
    );
    match SessionLog::new(log_path).append(&summary) {
        Ok(()) => info!(path = %log_path.display(), "session saved"),
        Err(e) => warn!(error = %e, "failed to save session"),
    }
    summary
}

#[cfg(feature = "camera")]
fn run(args: Args) -> anyhow::Result<()> {
    live::run(args)
}

#[cfg(not(feature = "camera"))]
fn run(args: Args) -> anyhow::Result<()> {
    tracing::error!(
        exercise = %args.exercise,
        camera = args.camera,
        "live capture requested without camera support"
    );
    let _ = (args.config, args.log, args.no_mirror);
    Err(anyhow::anyhow!(
        "camera feature not enabled. Rebuild with: cargo run -p trainer_camera --features camera"
    ))
}

#[cfg(feature = "camera")]
mod live {
    use super::{Args, Tick, drive, finish_session};
    use anyhow::{Context, Result};
    use motion_trainer::{Frame, FrameReport, Silhouette, TerminalBell, TrainerConfig, TrainerError, TrainerSession};
    use opencv::{
        core::{self, Mat, Point, Rect, Scalar},
        highgui, imgproc,
        prelude::*,
        videoio::{self, VideoCapture},
    };
    use std::path::PathBuf;
    use tracing::warn;

    const WINDOW: &str = "Motion Trainer";

    pub fn run(args: Args) -> Result<()> {
        let config = match &args.config {
            Some(path) => TrainerConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => TrainerConfig::default(),
        };
        let log_path = args.log.clone().unwrap_or_else(|| PathBuf::from(&config.session.log_path));

        let mut cap = VideoCapture::new(args.camera, videoio::CAP_ANY)
            .with_context(|| format!("failed to open camera {}", args.camera))?;
        if !cap.is_opened()? {
            let e = TrainerError::CameraUnavailable(format!("device {} did not open", args.camera));
            warn!(error = %e, "no capture device");
            println!("Camera not available.");
            return Ok(());
        }
        highgui::named_window(WINDOW, highgui::WINDOW_AUTOSIZE)?;

        let mut session = TrainerSession::with_alert(args.exercise, &config, Box::new(TerminalBell));
        println!("Controls: press 'c' to calibrate, 'q' to quit. Calibrate by standing normally in frame.");

        let mut raw = Mat::default();
        drive(&mut session, |session| tick(&mut cap, &mut raw, !args.no_mirror, session));

        finish_session(&session, &log_path);

        if let Err(e) = highgui::destroy_all_windows() {
            warn!(error = %e, "failed to close the preview window");
        }
        Ok(())
    }

    /// One captured frame: read, process, draw, show, then handle the key.
    fn tick(cap: &mut VideoCapture, raw: &mut Mat, mirror: bool, session: &mut TrainerSession) -> Result<Tick> {
        match cap.read(raw) {
            Ok(true) if !raw.empty() => {}
            Ok(_) => {
                return Ok(Tick::CameraLost(TrainerError::CameraUnavailable(
                    "no frame delivered".to_string(),
                )));
            }
            Err(e) => return Ok(Tick::CameraLost(TrainerError::CameraUnavailable(e.to_string()))),
        }

        let mut picture = Mat::default();
        if mirror {
            core::flip(&*raw, &mut picture, 1)?;
        } else {
            picture = raw.clone();
        }

        match to_frame(&picture) {
            Ok(frame) => match session.process_frame(&frame) {
                Ok(report) => draw_report(&mut picture, &report)?,
                Err(e) => warn!(error = %e, "skipping frame"),
            },
            Err(e) => warn!(error = %e, "skipping frame"),
        }

        highgui::imshow(WINDOW, &picture)?;
        let key = highgui::wait_key(1)? & 0xFF;
        if key == 'q' as i32 {
            return Ok(Tick::Quit);
        }
        if key == 'c' as i32 {
            match session.calibrate() {
                Some(_) => println!("Calibrated. Now start exercising."),
                None => println!("Cannot calibrate: no person detected"),
            }
        }
        Ok(Tick::Continue)
    }

    /// BGR capture → RGB `Frame`.
    fn to_frame(bgr: &Mat) -> Result<Frame> {
        let mut rgb = Mat::default();
        imgproc::cvt_color(bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
        let width = rgb.cols() as u32;
        let height = rgb.rows() as u32;
        let bytes = rgb.data_bytes()?.to_vec();
        Ok(Frame::from_rgb_bytes(width, height, bytes)?)
    }

    fn draw_report(picture: &mut Mat, report: &FrameReport) -> Result<()> {
        match report {
            FrameReport::NoSilhouette => {
                put_text(picture, "No person detected", 30, 0.7, Scalar::new(0.0, 0.0, 255.0, 0.0), 2)?;
            }
            FrameReport::AwaitingCalibration(silhouette) => {
                draw_silhouette(picture, silhouette)?;
                put_text(
                    picture,
                    "Press 'c' to calibrate (stand normally)",
                    30,
                    0.7,
                    Scalar::new(0.0, 255.0, 255.0, 0.0),
                    2,
                )?;
            }
            FrameReport::Counted { silhouette, update } => {
                draw_silhouette(picture, silhouette)?;
                put_text(
                    picture,
                    &format!("Reps: {}", update.rep_count),
                    60,
                    1.0,
                    Scalar::new(0.0, 255.0, 0.0, 0.0),
                    3,
                )?;
                put_text(
                    picture,
                    &format!("Feedback: {}", update.feedback),
                    100,
                    0.7,
                    Scalar::new(255.0, 255.0, 0.0, 0.0),
                    2,
                )?;
            }
        }
        Ok(())
    }

    fn draw_silhouette(picture: &mut Mat, silhouette: &Silhouette) -> Result<()> {
        let bbox = silhouette.bounding_box;
        let rect = Rect::new(bbox.x as i32, bbox.y as i32, bbox.width as i32, bbox.height as i32);
        imgproc::rectangle(picture, rect, Scalar::new(0.0, 255.0, 0.0, 0.0), 2, imgproc::LINE_8, 0)?;
        let center = Point::new(silhouette.centroid.x as i32, silhouette.centroid.y as i32);
        imgproc::circle(picture, center, 4, Scalar::new(0.0, 0.0, 255.0, 0.0), -1, imgproc::LINE_8, 0)?;
        Ok(())
    }

    fn put_text(picture: &mut Mat, text: &str, y: i32, scale: f64, color: Scalar, thickness: i32) -> Result<()> {
        imgproc::put_text(
            picture,
            text,
            Point::new(10, y),
            imgproc::FONT_HERSHEY_SIMPLEX,
            scale,
            color,
            thickness,
            imgproc::LINE_8,
            false,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motion_trainer::TrainerConfig;

    fn session() -> TrainerSession {
        TrainerSession::new(Exercise::Squat, &TrainerConfig::default())
    }

    #[test]
    fn failed_frames_are_skipped_and_the_session_is_saved() {
        let dir = tempfile::tempdir().expect("temp dir");
        let log_path = dir.path().join("session_log.csv");
        let mut session = session();

        let mut ticks = 0;
        drive(&mut session, |_| {
            ticks += 1;
            match ticks {
                1 | 3 => Err(anyhow::anyhow!("imshow failed")),
                5 => Ok(Tick::Quit),
                _ => Ok(Tick::Continue),
            }
        });
        assert_eq!(ticks, 5);

        let summary = finish_session(&session, &log_path);
        let records = SessionLog::new(&log_path).read_all().expect("log read");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reps, summary.reps);
        assert_eq!(records[0].exercise, Exercise::Squat);
    }

    #[test]
    fn lost_camera_ends_the_loop_but_still_saves() {
        let dir = tempfile::tempdir().expect("temp dir");
        let log_path = dir.path().join("session_log.csv");
        let mut session = session();

        let mut ticks = 0;
        drive(&mut session, |_| {
            ticks += 1;
            Ok(Tick::CameraLost(TrainerError::CameraUnavailable("unplugged".to_string())))
        });
        assert_eq!(ticks, 1);

        finish_session(&session, &log_path);
        assert_eq!(SessionLog::new(&log_path).read_all().expect("log read").len(), 1);
    }

    #[test]
    fn persistent_failures_stop_the_loop() {
        let mut session = session();
        let mut ticks = 0;
        drive(&mut session, |_| {
            ticks += 1;
            Err(anyhow::anyhow!("wait_key failed"))
        });
        assert_eq!(ticks, MAX_CONSECUTIVE_ERRORS);
    }
}
