// THEORY:
// `HistoryReport` is the read side of the session log. It answers the
// questions a user asks after a few weeks of training: how much was done,
// on which days, and whether the numbers are going up.
//
// Key principles:
// 1.  **Filter First**: every figure is computed over the same filtered set of
//     sessions (chosen exercises, inclusive date range), in log order.
// 2.  **Trend As A Line**: the trend is the least-squares slope of reps per
//     session against the session's calendar day, in reps per day. Fewer than
//     two sessions give no trend at all.
// 3.  **Smoothed View**: a trailing moving average of reps, over up to five
//     sessions, shows the shape of the curve without the day-to-day noise.

use crate::core_modules::exercise::Exercise;
use crate::core_modules::smoothing::MovingAverage;
use crate::session::log::SessionRecord;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::fmt;

/// Slope, in reps per day, beyond which the trend is no longer "stable".
pub const TREND_TOLERANCE: f64 = 0.05;
const MOVING_AVERAGE_WINDOW: usize = 5;
const RECENT_SESSIONS_SHOWN: usize = 10;

/// Which sessions a report covers. Empty `exercises` means all of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryFilter {
    pub exercises: Vec<Exercise>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl HistoryFilter {
    pub fn matches(&self, record: &SessionRecord) -> bool {
        let date = record.timestamp.date();
        (self.exercises.is_empty() || self.exercises.contains(&record.exercise))
            && self.from.is_none_or(|from| date >= from)
            && self.to.is_none_or(|to| date <= to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}

impl Trend {
    pub fn from_slope(slope_per_day: f64) -> Self {
        if slope_per_day > TREND_TOLERANCE {
            Trend::Improving
        } else if slope_per_day < -TREND_TOLERANCE {
            Trend::Declining
        } else {
            Trend::Stable
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trend::Improving => "Performance improving",
            Trend::Stable => "Stable performance",
            Trend::Declining => "Performance decreasing, consider rest",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendAnalysis {
    pub slope_per_day: f64,
    pub trend: Trend,
    /// Trailing mean of reps, one value per session.
    pub moving_average: Vec<f64>,
}

impl TrendAnalysis {
    /// `None` with fewer than two sessions.
    pub fn from_sessions(sessions: &[SessionRecord]) -> Option<Self> {
        if sessions.len() < 2 {
            return None;
        }
        let points: Vec<(f64, f64)> = sessions
            .iter()
            .map(|s| (s.timestamp.date().num_days_from_ce() as f64, s.reps as f64))
            .collect();
        let slope_per_day = least_squares_slope(&points);

        let mut average = MovingAverage::new(MOVING_AVERAGE_WINDOW.min(sessions.len()));
        let moving_average = sessions.iter().map(|s| average.push(s.reps as f64)).collect();

        Some(Self {
            slope_per_day,
            trend: Trend::from_slope(slope_per_day),
            moving_average,
        })
    }
}

/// Slope of the best-fit line. All points on one day have no defined slope and
/// read as flat.
fn least_squares_slope(points: &[(f64, f64)]) -> f64 {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx) = (0.0, 0.0);
    for &(x, y) in points {
        sxy += (x - mean_x) * (y - mean_y);
        sxx += (x - mean_x) * (x - mean_x);
    }
    if sxx == 0.0 { 0.0 } else { sxy / sxx }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryReport {
    pub sessions: Vec<SessionRecord>,
    pub total_reps: u64,
    pub total_calories: f64,
    pub reps_per_day: BTreeMap<NaiveDate, u64>,
    pub trend: Option<TrendAnalysis>,
}

impl HistoryReport {
    /// `None` when no session passes the filter.
    pub fn build(records: &[SessionRecord], filter: &HistoryFilter) -> Option<Self> {
        let sessions: Vec<SessionRecord> = records.iter().filter(|r| filter.matches(r)).cloned().collect();
        if sessions.is_empty() {
            return None;
        }

        let mut reps_per_day = BTreeMap::new();
        for session in &sessions {
            *reps_per_day.entry(session.timestamp.date()).or_insert(0) += session.reps as u64;
        }

        Some(Self {
            total_reps: sessions.iter().map(|s| s.reps as u64).sum(),
            total_calories: sessions.iter().map(|s| s.calories).sum(),
            reps_per_day,
            trend: TrendAnalysis::from_sessions(&sessions),
            sessions,
        })
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl fmt::Display for HistoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total sessions: {}", self.session_count())?;
        writeln!(f, "Total reps: {}", self.total_reps)?;
        writeln!(f, "Total calories (est.): {:.1} kcal", self.total_calories)?;

        writeln!(f)?;
        writeln!(f, "Reps per day:")?;
        for (date, reps) in &self.reps_per_day {
            writeln!(f, "  {date}  {reps:>5}")?;
        }

        writeln!(f)?;
        writeln!(f, "Recent sessions:")?;
        for (i, s) in self.sessions.iter().enumerate().rev().take(RECENT_SESSIONS_SHOWN) {
            write!(
                f,
                "  {}  {:<12} {:>4} reps  {:>7.1} s  {:>6.2} kcal",
                s.timestamp.format("%Y-%m-%d %H:%M"),
                s.exercise.as_str(),
                s.reps,
                s.duration_seconds,
                s.calories
            )?;
            // The trailing average only exists once there is a trend.
            match self.trend.as_ref().and_then(|t| t.moving_average.get(i)) {
                Some(avg) => writeln!(f, "  avg {avg:>6.1}")?,
                None => writeln!(f)?,
            }
        }

        writeln!(f)?;
        match &self.trend {
            Some(trend) => {
                writeln!(f, "Trend slope: {:.3} reps/day", trend.slope_per_day)?;
                writeln!(f, "{}", trend.trend)
            }
            None => writeln!(f, "Not enough sessions for trend analysis (need at least 2)."),
        }
    }
}
