// THEORY:
// This file is the main entry point for the `motion_trainer` library crate.
// It exposes `TrainerSession` and its associated data structures
// (`TrainerConfig`, `FrameReport`, `SessionSummary`, ...) as the clean,
// high-level interface for counting exercise repetitions from video frames.
//
// The segmentation and measurement stages live in `core_modules` and stay
// usable on their own for testing and tooling, but a capture loop only needs
// the re-exports below.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod pipeline;
pub mod session;

pub use config::TrainerConfig;
pub use core_modules::alert::{RepAlert, SilentAlert, TerminalBell};
pub use core_modules::calibration::CalibrationReference;
pub use core_modules::exercise::Exercise;
pub use core_modules::frame::Frame;
pub use core_modules::mask::ForegroundMask;
pub use core_modules::silhouette::{BoundingBox, Centroid, Silhouette};
pub use error::{Result, TrainerError};
pub use pipeline::{FrameReport, RepUpdate, TrainerSession};
pub use session::{HistoryFilter, HistoryReport, SessionLog, SessionSummary};
