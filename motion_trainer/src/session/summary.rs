use crate::core_modules::exercise::Exercise;
use chrono::{Local, NaiveDateTime};
use std::fmt;
use std::time::Duration;

/// Shortest duration the calorie estimate will use, in hours.
const MIN_HOURS: f64 = 1.0 / 3600.0;

/// What a finished session reports. Built once, then appended to the log.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    /// Local wall-clock time at which the session ended.
    pub timestamp: NaiveDateTime,
    pub exercise: Exercise,
    pub reps: u32,
    pub duration_seconds: f64,
    pub calories: f64,
}

impl SessionSummary {
    pub fn new(exercise: Exercise, reps: u32, elapsed: Duration, body_weight_kg: f64) -> Self {
        Self::at(Local::now().naive_local(), exercise, reps, elapsed, body_weight_kg)
    }

    pub fn at(
        timestamp: NaiveDateTime,
        exercise: Exercise,
        reps: u32,
        elapsed: Duration,
        body_weight_kg: f64,
    ) -> Self {
        let duration_seconds = elapsed.as_secs_f64();
        Self {
            timestamp,
            exercise,
            reps,
            duration_seconds,
            calories: estimate_calories(exercise, duration_seconds, body_weight_kg),
        }
    }
}

/// MET x kg x hours, with the duration floored to one second.
pub fn estimate_calories(exercise: Exercise, duration_seconds: f64, body_weight_kg: f64) -> f64 {
    let hours = (duration_seconds / 3600.0).max(MIN_HOURS);
    exercise.met() * body_weight_kg * hours
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Session summary: {} reps of {}, {:.1} s, {:.2} kcal",
            self.reps, self.exercise, self.duration_seconds, self.calories
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::DEFAULT_BODY_WEIGHT_KG;

    #[test]
    fn ninety_second_squat_session_burns_8_75_kcal() {
        let summary = SessionSummary::new(
            Exercise::Squat,
            10,
            Duration::from_secs(90),
            DEFAULT_BODY_WEIGHT_KG,
        );
        assert_eq!(summary.reps, 10);
        assert!((summary.calories - 8.75).abs() < 1e-9);
        assert_eq!(format!("{:.2}", summary.calories), "8.75");
        assert!(summary.to_string().contains("8.75 kcal"));
    }

    #[test]
    fn instant_quit_still_reports_one_second_of_work() {
        let calories = estimate_calories(Exercise::Situp, 0.0, 72.0);
        assert!((calories - 7.0 * 72.0 / 3600.0).abs() < 1e-12);
        assert!(calories > 0.0);
    }

    #[test]
    fn body_weight_scales_linearly() {
        let light = estimate_calories(Exercise::JumpingJack, 600.0, 50.0);
        let heavy = estimate_calories(Exercise::JumpingJack, 600.0, 100.0);
        assert!((heavy - 2.0 * light).abs() < 1e-9);
    }
}
