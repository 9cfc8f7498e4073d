// THEORY:
// `TrainerConfig` gathers every tunable number of the engine in one place so the
// live camera loop, the offline replay and the tests all run the exact same
// pipeline. Defaults reproduce the calibrated behavior the thresholds were
// tuned for; a TOML file only needs to mention the values it overrides.

use crate::error::{Result, TrainerError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub preprocess: PreprocessConfig,
    pub silhouette: SilhouetteConfig,
    pub counter: CounterConfig,
    pub session: SessionConfig,
}

/// Parameters of the frame → foreground mask stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Side of the square Gaussian blur kernel. Must be odd.
    pub blur_kernel: u32,
    /// Number of frames the background model effectively remembers.
    pub history: u32,
    /// Squared Mahalanobis distance above which a pixel is foreground.
    pub var_threshold: f32,
    /// Variance assigned to every pixel when the model is (re)initialised.
    pub initial_variance: f32,
    pub min_variance: f32,
    pub max_variance: f32,
    /// Side of the elliptical structuring element used for open/dilate. Must be odd.
    pub morph_kernel: u32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            blur_kernel: 7,
            history: 300,
            var_threshold: 25.0,
            initial_variance: 225.0,
            min_variance: 4.0,
            max_variance: 75.0,
            morph_kernel: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SilhouetteConfig {
    /// Regions smaller than this many pixels are treated as noise.
    pub min_area: u32,
}

impl Default for SilhouetteConfig {
    fn default() -> Self {
        Self { min_area: 500 }
    }
}

/// Smoothing window and the per-family threshold pairs of the rep state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterConfig {
    #[serde(default = "default_smoothing_window")]
    pub smoothing_window: usize,
    /// Lower edge of the rest band for squats and sit-ups (relative centroid Y).
    #[serde(default = "default_vertical_low")]
    pub vertical_low: f64,
    /// Upper edge of the rest band for squats and sit-ups (relative centroid Y).
    #[serde(default = "default_vertical_high")]
    pub vertical_high: f64,
    /// How far inside the band the measure must come back before a squat or
    /// sit-up counts. Noise around either edge cannot complete a cycle.
    #[serde(default = "default_vertical_margin")]
    pub vertical_margin: f64,
    /// Relative width above which a jumping jack is "out".
    #[serde(default = "default_width_enter")]
    pub width_enter: f64,
    /// Relative width below which a jumping jack is back "in".
    #[serde(default = "default_width_exit")]
    pub width_exit: f64,
}

fn default_smoothing_window() -> usize { 6 }
fn default_vertical_low() -> f64 { 0.85 }
fn default_vertical_high() -> f64 { 1.12 }
fn default_vertical_margin() -> f64 { 0.05 }
fn default_width_enter() -> f64 { 1.15 }
fn default_width_exit() -> f64 { 1.05 }

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            smoothing_window: default_smoothing_window(),
            vertical_low: default_vertical_low(),
            vertical_high: default_vertical_high(),
            vertical_margin: default_vertical_margin(),
            width_enter: default_width_enter(),
            width_exit: default_width_exit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Body weight used by the MET calorie estimate.
    pub body_weight_kg: f64,
    pub log_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            body_weight_kg: crate::session::DEFAULT_BODY_WEIGHT_KG,
            log_path: "session_log.csv".to_string(),
        }
    }
}

impl TrainerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| TrainerError::io(path, source))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TrainerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let p = &self.preprocess;
        if p.blur_kernel == 0 || p.blur_kernel % 2 == 0 {
            return Err(TrainerError::Config(format!(
                "blur_kernel must be odd and positive, got {}",
                p.blur_kernel
            )));
        }
        if p.morph_kernel == 0 || p.morph_kernel % 2 == 0 {
            return Err(TrainerError::Config(format!(
                "morph_kernel must be odd and positive, got {}",
                p.morph_kernel
            )));
        }
        if p.history == 0 {
            return Err(TrainerError::Config("history must be at least 1 frame".into()));
        }
        if !(p.min_variance > 0.0 && p.min_variance <= p.max_variance) {
            return Err(TrainerError::Config(format!(
                "variance bounds must satisfy 0 < min <= max, got [{}, {}]",
                p.min_variance, p.max_variance
            )));
        }

        let c = &self.counter;
        if c.smoothing_window == 0 {
            return Err(TrainerError::Config("smoothing_window must be at least 1".into()));
        }
        if c.vertical_low >= c.vertical_high {
            return Err(TrainerError::Config(format!(
                "vertical rest band is empty: low {} >= high {}",
                c.vertical_low, c.vertical_high
            )));
        }
        if c.vertical_margin < 0.0 || c.vertical_low + c.vertical_margin > c.vertical_high - c.vertical_margin {
            return Err(TrainerError::Config(format!(
                "vertical_margin {} leaves no rest zone inside [{}, {}]",
                c.vertical_margin, c.vertical_low, c.vertical_high
            )));
        }
        if c.width_exit >= c.width_enter {
            return Err(TrainerError::Config(format!(
                "width thresholds leave no hysteresis: exit {} >= enter {}",
                c.width_exit, c.width_enter
            )));
        }

        if self.session.body_weight_kg <= 0.0 {
            return Err(TrainerError::Config(format!(
                "body_weight_kg must be positive, got {}",
                self.session.body_weight_kg
            )));
        }
        Ok(())
    }
}
