// THEORY:
// Everything that outlives a single camera session: the write-once summary,
// its durable CSV log, and the read-side report built from that log. None of
// it touches pixels; the core hands over a `SessionSummary` and is done.

pub mod history;
pub mod log;
pub mod summary;

pub use history::{HistoryFilter, HistoryReport, Trend, TrendAnalysis};
pub use log::{SessionLog, SessionRecord};
pub use summary::SessionSummary;

pub const DEFAULT_BODY_WEIGHT_KG: f64 = 70.0;
