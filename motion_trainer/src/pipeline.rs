// THEORY:
// The `pipeline` module is the top-level API of the trainer. `TrainerSession`
// encapsulates the full stack (segmentation, measurement, calibration and the
// rep state machine) behind one object that a capture loop feeds one frame at
// a time.
//
// Key architectural principles:
// 1.  **One Owner**: the session exclusively owns the background model, the
//     calibration reference and the smoothing histories. Nothing is shared,
//     so nothing is locked.
// 2.  **Reports, Not Errors**: "nobody in view" and "not calibrated yet" are
//     normal states of a live session. They come back as `FrameReport`
//     variants. Only a malformed frame is an `Err`, and the caller skips it.
// 3.  **Calibrate On Demand**: the session remembers the last silhouette it
//     saw, so a calibrate command from the UI needs no measurement of its own
//     and is refused when nobody is in view.

use crate::config::TrainerConfig;
use crate::core_modules::alert::RepAlert;
use crate::core_modules::calibration::CalibrationReference;
use crate::core_modules::exercise::Exercise;
use crate::core_modules::frame::Frame;
use crate::core_modules::mask::ForegroundMask;
use crate::core_modules::preprocessor::FramePreprocessor;
use crate::core_modules::rep_counter::{CycleState, RepCounter};
use crate::core_modules::silhouette::Silhouette;
use crate::core_modules::silhouette_extractor::silhouette_extractor;
use crate::error::Result;
use crate::session::SessionSummary;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub use crate::core_modules::rep_counter::RepUpdate;

/// The outcome of one processed frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameReport {
    /// No foreground region large enough to be a person.
    NoSilhouette,
    /// A person is in view but no calibration has been taken yet.
    AwaitingCalibration(Silhouette),
    Counted { silhouette: Silhouette, update: RepUpdate },
}

impl FrameReport {
    pub fn silhouette(&self) -> Option<&Silhouette> {
        match self {
            FrameReport::NoSilhouette => None,
            FrameReport::AwaitingCalibration(silhouette) => Some(silhouette),
            FrameReport::Counted { silhouette, .. } => Some(silhouette),
        }
    }
}

pub struct TrainerSession {
    exercise: Exercise,
    preprocessor: FramePreprocessor,
    counter: RepCounter,
    min_area: u32,
    body_weight_kg: f64,
    last_silhouette: Option<Silhouette>,
    last_mask: Option<ForegroundMask>,
    frames_processed: u64,
    started: Instant,
}

impl TrainerSession {
    pub fn new(exercise: Exercise, config: &TrainerConfig) -> Self {
        Self::from_parts(exercise, config, RepCounter::new(exercise, &config.counter))
    }

    pub fn with_alert(exercise: Exercise, config: &TrainerConfig, alert: Box<dyn RepAlert>) -> Self {
        Self::from_parts(
            exercise,
            config,
            RepCounter::with_alert(exercise, &config.counter, alert),
        )
    }

    fn from_parts(exercise: Exercise, config: &TrainerConfig, counter: RepCounter) -> Self {
        info!(%exercise, "session started");
        Self {
            exercise,
            preprocessor: FramePreprocessor::new(&config.preprocess),
            counter,
            min_area: config.silhouette.min_area,
            body_weight_kg: config.session.body_weight_kg,
            last_silhouette: None,
            last_mask: None,
            frames_processed: 0,
            started: Instant::now(),
        }
    }

    pub fn process_frame(&mut self, frame: &Frame) -> Result<FrameReport> {
        let mask = self.preprocessor.process(frame)?;
        let report = self.process_mask(&mask);
        self.last_mask = Some(mask);
        Ok(report)
    }

    /// Measurement and counting on an already segmented frame.
    pub fn process_mask(&mut self, mask: &ForegroundMask) -> FrameReport {
        self.frames_processed += 1;

        let Some(silhouette) = silhouette_extractor::find_largest(mask, self.min_area) else {
            debug!(frame = self.frames_processed, "no silhouette");
            self.last_silhouette = None;
            return FrameReport::NoSilhouette;
        };
        self.last_silhouette = Some(silhouette);

        let bbox = silhouette.bounding_box;
        let update = self.counter.update(silhouette.centroid, bbox.width, bbox.height);
        debug!(
            frame = self.frames_processed,
            area = silhouette.area,
            reps = update.rep_count,
            feedback = %update.feedback,
            "frame measured"
        );

        if self.counter.is_calibrated() {
            FrameReport::Counted { silhouette, update }
        } else {
            FrameReport::AwaitingCalibration(silhouette)
        }
    }

    /// Calibrates against the silhouette of the most recent frame. Refused
    /// when that frame had none.
    pub fn calibrate(&mut self) -> Option<CalibrationReference> {
        let Some(silhouette) = self.last_silhouette else {
            warn!("calibration refused: no person detected");
            return None;
        };
        let bbox = silhouette.bounding_box;
        Some(self.counter.calibrate(silhouette.centroid, bbox.width, bbox.height))
    }

    pub fn is_calibrated(&self) -> bool {
        self.counter.is_calibrated()
    }

    pub fn calibration(&self) -> Option<CalibrationReference> {
        self.counter.calibration()
    }

    pub fn cycle_state(&self) -> CycleState {
        self.counter.state()
    }

    pub fn rep_count(&self) -> u32 {
        self.counter.rep_count()
    }

    pub fn exercise(&self) -> Exercise {
        self.exercise
    }

    pub fn last_silhouette(&self) -> Option<&Silhouette> {
        self.last_silhouette.as_ref()
    }

    pub fn last_mask(&self) -> Option<&ForegroundMask> {
        self.last_mask.as_ref()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Starts over: new background, no calibration, zero reps, fresh clock.
    pub fn restart(&mut self) {
        self.preprocessor.reset();
        self.counter.reset();
        self.last_silhouette = None;
        self.last_mask = None;
        self.frames_processed = 0;
        self.started = Instant::now();
        info!(exercise = %self.exercise, "session restarted");
    }

    /// Summary over the wall-clock time since the session started.
    pub fn finish(&self) -> SessionSummary {
        self.finish_after(self.elapsed())
    }

    /// Summary over an explicit duration, for sessions not run in real time.
    pub fn finish_after(&self, elapsed: Duration) -> SessionSummary {
        let summary = SessionSummary::new(self.exercise, self.rep_count(), elapsed, self.body_weight_kg);
        info!(
            exercise = %summary.exercise,
            reps = summary.reps,
            duration_seconds = summary.duration_seconds,
            calories = summary.calories,
            "session finished"
        );
        summary
    }
}
