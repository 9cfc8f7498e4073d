// THEORY:
// The `rep_counter` module is the heart of the trainer. It adds memory to the
// stateless, per-frame `Silhouette` measurements and turns a noisy stream of
// bounding boxes into a monotonically increasing repetition count.
//
// Key architectural principles:
// 1.  **Explicit State Machine**: every exercise moves through the same three
//     states, `AwaitCalibration -> Rest -> Extreme -> Rest`. A repetition is
//     counted on the transition back into `Rest`, never anywhere else, so the
//     count rises by at most one per frame.
// 2.  **Named Threshold Rules**: what "rest" and "extreme" mean is captured by
//     a `CycleRule` chosen from the exercise's motion family. The vertical
//     family uses a rest band around the calibrated centroid; the width family
//     uses a hysteresis pair. The rule is data, so it can be tuned and tested
//     on its own.
// 3.  **Smoothing Before Judgement**: raw measurements are appended to short
//     ring buffers and only their trailing mean reaches the rule. A single
//     bad mask cannot complete a repetition.
// 4.  **Relative Measures**: the rule never sees pixels, only ratios against
//     the `CalibrationReference`, so the same thresholds work at any distance
//     from the camera.

use crate::config::CounterConfig;
use crate::core_modules::alert::{RepAlert, SilentAlert};
use crate::core_modules::calibration::CalibrationReference;
use crate::core_modules::exercise::{Exercise, MotionFamily};
use crate::core_modules::silhouette::Centroid;
use crate::core_modules::smoothing::SmoothedSignal;
use tracing::{debug, info, trace};

pub const NOT_CALIBRATED: &str = "not calibrated";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    AwaitCalibration,
    Rest,
    Extreme,
}

/// Decides, from one relative measure, whether the body is at rest or at the
/// far end of a movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleRule {
    /// Extreme once `m` leaves `[low, high]` in either direction; back at rest
    /// only once `m` is inside the narrower `[low + margin, high - margin]`.
    RestBand { low: f64, high: f64, margin: f64 },
    /// Extreme once `m > enter`; back at rest only once `m < exit`.
    Hysteresis { enter: f64, exit: f64 },
}

impl CycleRule {
    pub fn for_exercise(exercise: Exercise, config: &CounterConfig) -> Self {
        match exercise.family() {
            MotionFamily::VerticalDisplacement => CycleRule::RestBand {
                low: config.vertical_low,
                high: config.vertical_high,
                margin: config.vertical_margin,
            },
            MotionFamily::WidthExpansion => CycleRule::Hysteresis {
                enter: config.width_enter,
                exit: config.width_exit,
            },
        }
    }

    pub fn is_extreme(&self, m: f64) -> bool {
        match *self {
            CycleRule::RestBand { low, high, .. } => m < low || m > high,
            CycleRule::Hysteresis { enter, .. } => m > enter,
        }
    }

    pub fn is_rest(&self, m: f64) -> bool {
        match *self {
            CycleRule::RestBand { low, high, margin } => m >= low + margin && m <= high - margin,
            CycleRule::Hysteresis { exit, .. } => m < exit,
        }
    }
}

/// The bare state machine, independent of smoothing and calibration.
#[derive(Debug, Clone)]
pub struct CycleDetector {
    rule: CycleRule,
    state: CycleState,
    count: u32,
}

impl CycleDetector {
    pub fn new(rule: CycleRule) -> Self {
        Self {
            rule,
            state: CycleState::AwaitCalibration,
            count: 0,
        }
    }

    /// Enters `Rest` from any state. The count is untouched.
    pub fn arm(&mut self) {
        self.state = CycleState::Rest;
    }

    /// Feeds one relative measure. Returns true when a cycle completed on this
    /// step. NaN never satisfies either side of a rule, so it holds the state.
    pub fn step(&mut self, m: f64) -> bool {
        match self.state {
            CycleState::AwaitCalibration => false,
            CycleState::Rest => {
                if self.rule.is_extreme(m) {
                    self.state = CycleState::Extreme;
                }
                false
            }
            CycleState::Extreme => {
                if self.rule.is_rest(m) {
                    self.state = CycleState::Rest;
                    self.count += 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn rule(&self) -> CycleRule {
        self.rule
    }
}

/// Result of one `RepCounter::update`.
#[derive(Debug, Clone, PartialEq)]
pub struct RepUpdate {
    pub rep_count: u32,
    /// Smoothed centroid Y for squats, sit-ups and any uncalibrated update;
    /// smoothed width for jumping jacks.
    pub measure: f64,
    pub feedback: String,
    pub rep_completed: bool,
}

pub struct RepCounter {
    exercise: Exercise,
    signal: SmoothedSignal,
    detector: CycleDetector,
    calibration: Option<CalibrationReference>,
    alert: Box<dyn RepAlert>,
}

impl RepCounter {
    pub fn new(exercise: Exercise, config: &CounterConfig) -> Self {
        Self::with_alert(exercise, config, Box::new(SilentAlert))
    }

    pub fn with_alert(exercise: Exercise, config: &CounterConfig, alert: Box<dyn RepAlert>) -> Self {
        Self {
            exercise,
            signal: SmoothedSignal::new(config.smoothing_window),
            detector: CycleDetector::new(CycleRule::for_exercise(exercise, config)),
            calibration: None,
            alert,
        }
    }

    /// Stores the rest snapshot and arms the state machine. Calling it again
    /// replaces the snapshot and re-arms; reps already counted are kept.
    pub fn calibrate(&mut self, centroid: Centroid, width: u32, height: u32) -> CalibrationReference {
        let reference = CalibrationReference::capture(centroid, width, height);
        self.calibration = Some(reference);
        self.detector.arm();
        info!(
            exercise = %self.exercise,
            centroid_y = reference.centroid_y,
            width = reference.width,
            height = reference.height,
            "calibrated"
        );
        reference
    }

    pub fn update(&mut self, centroid: Centroid, width: u32, height: u32) -> RepUpdate {
        let smoothed = self.signal.push(centroid.y, width, height);

        let Some(reference) = self.calibration else {
            return RepUpdate {
                rep_count: self.detector.count(),
                measure: smoothed.centroid_y,
                feedback: NOT_CALIBRATED.to_string(),
                rep_completed: false,
            };
        };

        let (measure, relative, feedback) = match self.exercise.family() {
            MotionFamily::VerticalDisplacement => {
                let rel_cy = reference.relative_centroid_y(smoothed.centroid_y);
                let rel_h = reference.relative_height(smoothed.height);
                trace!(rel_cy, rel_h, "vertical measures");
                (smoothed.centroid_y, rel_cy, format!("rel_cy:{rel_cy:.2}"))
            }
            MotionFamily::WidthExpansion => {
                let rel_w = reference.relative_width(smoothed.width);
                (smoothed.width, rel_w, format!("rel_w:{rel_w:.2}"))
            }
        };

        let rep_completed = self.detector.step(relative);
        if rep_completed {
            info!(exercise = %self.exercise, reps = self.detector.count(), "rep completed");
            if let Err(e) = self.alert.fire() {
                debug!(error = %e, "rep alert failed");
            }
        }

        RepUpdate {
            rep_count: self.detector.count(),
            measure,
            feedback,
            rep_completed,
        }
    }

    pub fn rep_count(&self) -> u32 {
        self.detector.count()
    }

    pub fn exercise(&self) -> Exercise {
        self.exercise
    }

    pub fn calibration(&self) -> Option<CalibrationReference> {
        self.calibration
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_some()
    }

    pub fn state(&self) -> CycleState {
        self.detector.state()
    }

    /// Back to a fresh, uncalibrated counter with zero reps.
    pub fn reset(&mut self) {
        self.signal.clear();
        self.detector = CycleDetector::new(self.detector.rule());
        self.calibration = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io;
    use std::rc::Rc;

    const REST: CycleRule = CycleRule::RestBand { low: 0.85, high: 1.12, margin: 0.05 };
    const JACK: CycleRule = CycleRule::Hysteresis { enter: 1.15, exit: 1.05 };

    fn at(y: u32) -> Centroid {
        Centroid { x: 160, y }
    }

    struct CountingAlert {
        fired: Rc<Cell<u32>>,
        fail: bool,
    }

    impl RepAlert for CountingAlert {
        fn fire(&mut self) -> io::Result<()> {
            self.fired.set(self.fired.get() + 1);
            if self.fail {
                Err(io::Error::other("no audio device"))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn detector_waits_for_calibration() {
        let mut detector = CycleDetector::new(REST);
        assert!(!detector.step(0.5));
        assert!(!detector.step(1.0));
        assert_eq!(detector.state(), CycleState::AwaitCalibration);
        assert_eq!(detector.count(), 0);
    }

    #[test]
    fn squat_sequence_counts_once_on_the_return_to_rest() {
        let mut detector = CycleDetector::new(REST);
        detector.arm();

        let mut sequence = vec![1.0, 1.0];
        sequence.extend([0.80; 6]);
        sequence.extend([1.0; 6]);

        let completed: Vec<usize> = sequence
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| detector.step(m).then_some(i))
            .collect();
        assert_eq!(completed, vec![8]);
        assert_eq!(detector.count(), 1);
        assert_eq!(detector.state(), CycleState::Rest);
    }

    #[test]
    fn deep_squat_leaving_the_band_upwards_also_counts() {
        let mut detector = CycleDetector::new(REST);
        detector.arm();
        for m in [1.0, 1.05, 1.2, 1.3, 1.2, 1.1, 1.0] {
            detector.step(m);
        }
        assert_eq!(detector.count(), 1);
    }

    #[test]
    fn jitter_around_the_upper_edge_never_counts() {
        let mut detector = CycleDetector::new(REST);
        detector.arm();
        for _ in 0..5 {
            detector.step(1.11);
            detector.step(1.13);
        }
        assert_eq!(detector.state(), CycleState::Extreme);
        assert_eq!(detector.count(), 0);
    }

    #[test]
    fn jitter_around_the_lower_edge_never_counts() {
        let mut detector = CycleDetector::new(REST);
        detector.arm();
        for _ in 0..5 {
            detector.step(0.86);
            detector.step(0.84);
        }
        assert_eq!(detector.count(), 0);
        // A real return to standing still completes the cycle.
        assert!(detector.step(1.0));
    }

    #[test]
    fn bobbing_near_the_edge_without_squatting_counts_nothing() {
        let mut counter = RepCounter::new(Exercise::Squat, &CounterConfig::default());
        counter.calibrate(at(200), 80, 240);
        for _ in 0..5 {
            for y in [218, 232] {
                for _ in 0..6 {
                    counter.update(at(y), 80, 240);
                }
            }
        }
        assert_eq!(counter.rep_count(), 0);
    }

    #[test]
    fn jumping_jack_counts_only_on_the_falling_crossing() {
        let mut detector = CycleDetector::new(JACK);
        detector.arm();
        assert!(!detector.step(1.10));
        assert!(!detector.step(1.20));
        assert_eq!(detector.state(), CycleState::Extreme);
        // Inside the hysteresis gap nothing changes.
        assert!(!detector.step(1.10));
        assert!(!detector.step(1.16));
        assert!(detector.step(1.00));
        assert_eq!(detector.count(), 1);
    }

    #[test]
    fn nan_holds_the_current_state() {
        let mut detector = CycleDetector::new(JACK);
        detector.arm();
        detector.step(f64::NAN);
        assert_eq!(detector.state(), CycleState::Rest);
        detector.step(1.3);
        detector.step(f64::NAN);
        assert_eq!(detector.state(), CycleState::Extreme);
        assert_eq!(detector.count(), 0);
    }

    #[test]
    fn update_before_calibration_never_counts() {
        let mut counter = RepCounter::new(Exercise::Squat, &CounterConfig::default());
        for y in [200, 100, 300, 200, 50, 200] {
            let update = counter.update(at(y), 80, 240);
            assert_eq!(update.rep_count, 0);
            assert_eq!(update.feedback, NOT_CALIBRATED);
            assert!(!update.rep_completed);
        }
        assert_eq!(counter.state(), CycleState::AwaitCalibration);
    }

    #[test]
    fn smoothed_squat_counts_exactly_one_rep() {
        let mut counter = RepCounter::new(Exercise::Squat, &CounterConfig::default());
        counter.calibrate(at(200), 80, 240);

        let mut raw = vec![200; 8];
        raw.extend([160; 12]);
        raw.extend([200; 12]);

        let mut previous = 0;
        for y in raw {
            let update = counter.update(at(y), 80, 240);
            assert!(update.rep_count == previous || update.rep_count == previous + 1);
            assert!(update.feedback.starts_with("rel_cy:"));
            previous = update.rep_count;
        }
        assert_eq!(counter.rep_count(), 1);
    }

    #[test]
    fn jumping_jack_reports_width_and_counts_on_the_way_in() {
        let mut counter = RepCounter::new(Exercise::JumpingJack, &CounterConfig::default());
        counter.calibrate(at(200), 100, 240);

        let mut widths = vec![100; 6];
        widths.extend([130; 12]);
        widths.extend([100; 12]);

        let mut completions = Vec::new();
        for w in widths {
            let update = counter.update(at(200), w, 240);
            assert!(update.feedback.starts_with("rel_w:"));
            if update.rep_completed {
                completions.push(update.measure);
            }
        }
        assert_eq!(completions.len(), 1);
        assert!(completions[0] < 105.0);
        assert_eq!(counter.rep_count(), 1);
    }

    #[test]
    fn feedback_uses_two_decimals() {
        let mut counter = RepCounter::new(Exercise::JumpingJack, &CounterConfig::default());
        counter.calibrate(at(200), 100, 240);
        let update = counter.update(at(200), 120, 240);
        assert_eq!(update.feedback, "rel_w:1.20");
        assert_eq!(update.measure, 120.0);
    }

    #[test]
    fn zero_sized_calibration_does_not_divide_by_zero() {
        let mut counter = RepCounter::new(Exercise::JumpingJack, &CounterConfig::default());
        let reference = counter.calibrate(at(0), 0, 0);
        assert_eq!((reference.width, reference.height), (1, 1));
        let update = counter.update(at(0), 0, 0);
        assert_eq!(update.feedback, "rel_w:0.00");
    }

    #[test]
    fn alert_fires_per_rep_and_failures_are_swallowed() {
        let fired = Rc::new(Cell::new(0));
        let alert = CountingAlert { fired: Rc::clone(&fired), fail: true };
        let config = CounterConfig { smoothing_window: 1, ..CounterConfig::default() };
        let mut counter = RepCounter::with_alert(Exercise::Situp, &config, Box::new(alert));
        counter.calibrate(at(100), 80, 80);

        for _ in 0..3 {
            counter.update(at(60), 80, 80);
            let update = counter.update(at(100), 80, 80);
            assert!(update.rep_completed);
        }
        assert_eq!(counter.rep_count(), 3);
        assert_eq!(fired.get(), 3);
    }

    #[test]
    fn recalibration_keeps_the_count() {
        let config = CounterConfig { smoothing_window: 1, ..CounterConfig::default() };
        let mut counter = RepCounter::new(Exercise::Squat, &config);
        counter.calibrate(at(200), 80, 240);
        counter.update(at(250), 80, 240);
        counter.update(at(200), 80, 240);
        assert_eq!(counter.rep_count(), 1);

        counter.calibrate(at(150), 80, 240);
        assert_eq!(counter.state(), CycleState::Rest);
        assert_eq!(counter.rep_count(), 1);

        counter.reset();
        assert_eq!(counter.rep_count(), 0);
        assert!(!counter.is_calibrated());
    }
}
