use crate::error::TrainerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of supported exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exercise {
    Squat,
    JumpingJack,
    Situp,
}

/// Which silhouette measurement drives the cycle detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionFamily {
    /// The centroid drops and returns (squat, sit-up).
    VerticalDisplacement,
    /// The bounding box widens and narrows (jumping jack).
    WidthExpansion,
}

impl Exercise {
    pub const ALL: [Exercise; 3] = [Exercise::Squat, Exercise::JumpingJack, Exercise::Situp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Exercise::Squat => "squat",
            Exercise::JumpingJack => "jumping_jack",
            Exercise::Situp => "situp",
        }
    }

    /// Metabolic equivalent used for the calorie estimate.
    pub fn met(&self) -> f64 {
        match self {
            Exercise::Squat => 5.0,
            Exercise::JumpingJack => 6.0,
            Exercise::Situp => 7.0,
        }
    }

    pub fn family(&self) -> MotionFamily {
        match self {
            Exercise::Squat | Exercise::Situp => MotionFamily::VerticalDisplacement,
            Exercise::JumpingJack => MotionFamily::WidthExpansion,
        }
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exercise {
    type Err = TrainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Exercise::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| TrainerError::UnknownExercise(s.to_string()))
    }
}
