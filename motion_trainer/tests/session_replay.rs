// End-to-end runs of `TrainerSession` over synthetic frames: a static dark room,
// then a bright rectangle standing in for the person.

use image::{Rgb, RgbImage};
use motion_trainer::{
    Exercise, Frame, FrameReport, SessionLog, TrainerConfig, TrainerError, TrainerSession,
};
use std::time::Duration;

const WIDTH: u32 = 80;
const HEIGHT: u32 = 60;
/// Long enough that a person present for a few dozen frames stays foreground.
const WARM_UP_FRAMES: usize = 120;
const PHASE_FRAMES: usize = 12;

#[derive(Clone, Copy)]
struct Body {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

const STANDING: Body = Body { x: 32, y: 8, w: 16, h: 36 };
const SQUATTING: Body = Body { x: 32, y: 24, w: 16, h: 28 };
const ARMS_IN: Body = Body { x: 32, y: 8, w: 16, h: 44 };
const ARMS_OUT: Body = Body { x: 20, y: 8, w: 40, h: 44 };

fn frame(body: Option<Body>) -> Frame {
    let image = RgbImage::from_fn(WIDTH, HEIGHT, |x, y| match body {
        Some(b) if x >= b.x && x < b.x + b.w && y >= b.y && y < b.y + b.h => Rgb([210, 200, 190]),
        _ => Rgb([30, 35, 40]),
    });
    Frame::from_image(image).expect("valid frame")
}

fn warm_up(session: &mut TrainerSession) {
    for _ in 0..WARM_UP_FRAMES {
        let report = session.process_frame(&frame(None)).expect("frame processed");
        assert_eq!(report, FrameReport::NoSilhouette);
    }
}

/// Feeds `frames` copies of `body` and returns the rep count after each one.
fn hold(session: &mut TrainerSession, body: Body, frames: usize) -> Vec<u32> {
    (0..frames)
        .map(|_| {
            session.process_frame(&frame(Some(body))).expect("frame processed");
            session.rep_count()
        })
        .collect()
}

fn assert_monotonic(counts: &[u32]) {
    for pair in counts.windows(2) {
        assert!(pair[1] == pair[0] || pair[1] == pair[0] + 1, "counts jumped: {counts:?}");
    }
}

#[test]
fn empty_room_never_produces_a_silhouette() {
    let mut session = TrainerSession::new(Exercise::Squat, &TrainerConfig::default());
    warm_up(&mut session);
    assert!(session.calibrate().is_none());
    assert_eq!(session.frames_processed(), WARM_UP_FRAMES as u64);
}

#[test]
fn squats_are_counted_once_per_cycle() {
    let mut session = TrainerSession::new(Exercise::Squat, &TrainerConfig::default());
    warm_up(&mut session);

    let report = session.process_frame(&frame(Some(STANDING))).expect("frame processed");
    let silhouette = match report {
        FrameReport::AwaitingCalibration(silhouette) => silhouette,
        other => panic!("expected a person awaiting calibration, got {other:?}"),
    };
    assert!(silhouette.area >= 500);
    assert!(silhouette.bounding_box.x <= STANDING.x);
    assert!(silhouette.bounding_box.right() >= STANDING.x + STANDING.w);

    let mut counts = hold(&mut session, STANDING, PHASE_FRAMES);
    let reference = session.calibrate().expect("person in view");
    assert!(reference.centroid_y > 0);

    for _ in 0..2 {
        counts.extend(hold(&mut session, SQUATTING, PHASE_FRAMES));
        counts.extend(hold(&mut session, STANDING, PHASE_FRAMES));
    }

    assert_monotonic(&counts);
    assert_eq!(session.rep_count(), 2);
}

#[test]
fn jumping_jacks_are_counted_and_survive_a_lost_person() {
    let mut session = TrainerSession::new(Exercise::JumpingJack, &TrainerConfig::default());
    warm_up(&mut session);

    hold(&mut session, ARMS_IN, PHASE_FRAMES);
    session.calibrate().expect("person in view");

    let mut counts = Vec::new();
    for _ in 0..2 {
        counts.extend(hold(&mut session, ARMS_OUT, PHASE_FRAMES));
        counts.extend(hold(&mut session, ARMS_IN, PHASE_FRAMES));
    }
    assert_monotonic(&counts);
    assert_eq!(session.rep_count(), 2);

    // A frame with the wrong size is rejected and changes nothing.
    let odd = Frame::from_image(RgbImage::new(WIDTH / 2, HEIGHT)).expect("valid frame");
    assert!(matches!(session.process_frame(&odd), Err(TrainerError::InvalidFrame(_))));
    assert_eq!(session.rep_count(), 2);
}

#[test]
fn finished_session_lands_in_the_log() {
    let dir = tempfile::tempdir().expect("temp dir");
    let log = SessionLog::new(dir.path().join("session_log.csv"));

    let mut session = TrainerSession::new(Exercise::Squat, &TrainerConfig::default());
    warm_up(&mut session);
    hold(&mut session, STANDING, PHASE_FRAMES);
    session.calibrate().expect("person in view");
    hold(&mut session, SQUATTING, PHASE_FRAMES);
    hold(&mut session, STANDING, PHASE_FRAMES);

    let summary = session.finish_after(Duration::from_secs(90));
    log.append(&summary).expect("log written");

    let records = log.read_all().expect("log read");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].exercise, Exercise::Squat);
    assert_eq!(records[0].reps, 1);
    assert_eq!(records[0].duration_seconds, 90.0);
    assert_eq!(records[0].calories, 8.75);
}
