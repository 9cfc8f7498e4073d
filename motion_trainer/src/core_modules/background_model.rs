// THEORY:
// The `BackgroundModel` is the only piece of the engine with long-lived visual
// memory. For every pixel it learns what "typical" looks like from the stream
// of blurred intensity images and classifies each new sample as background or
// foreground against that learned expectation.
//
// Key architectural principles:
// 1.  **Per-Pixel Statistics**: Each pixel holds a running mean and variance.
//     A sample is foreground when its squared distance from the mean exceeds
//     `var_threshold` times the variance (a squared Mahalanobis test), so noisy
//     regions automatically get a wider tolerance than quiet ones.
// 2.  **Adaptive Learning**: The learning rate is `1 / min(frames_seen, history)`.
//     Early on the model converges quickly to the empty scene; once `history`
//     frames have been seen it settles into an exponential window of roughly
//     that many frames. Every sample updates the model, so a person who stands
//     perfectly still slowly fades into the background, as expected from a
//     motion detector.
// 3.  **Bounded Variance**: Variance is clamped between `min_variance` and
//     `max_variance` so a perfectly static pixel cannot become hypersensitive
//     and a flickering one cannot swallow real motion.
// 4.  **Explicit Ownership**: The model belongs to exactly one session. `reset`
//     forgets everything; it is meant to be called when a session starts, never
//     in the middle of one.

use crate::config::PreprocessConfig;
use crate::error::{Result, TrainerError};
use image::GrayImage;

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Adaptive per-pixel Gaussian background model.
#[derive(Debug, Clone)]
pub struct BackgroundModel {
    width: u32,
    height: u32,
    /// Learned mean intensity per pixel, row-major.
    mean: Vec<f32>,
    /// Learned intensity variance per pixel, row-major.
    variance: Vec<f32>,
    /// Frames absorbed since the last reset.
    frames_seen: u32,

    history: u32,
    var_threshold: f32,
    initial_variance: f32,
    min_variance: f32,
    max_variance: f32,
}

impl BackgroundModel {
    pub fn new(config: &PreprocessConfig) -> Self {
        Self {
            width: 0,
            height: 0,
            mean: Vec::new(),
            variance: Vec::new(),
            frames_seen: 0,
            history: config.history.max(1),
            var_threshold: config.var_threshold,
            initial_variance: config.initial_variance,
            min_variance: config.min_variance,
            max_variance: config.max_variance,
        }
    }

    /// Forgets all learned statistics.
    pub fn reset(&mut self) {
        self.width = 0;
        self.height = 0;
        self.mean.clear();
        self.variance.clear();
        self.frames_seen = 0;
    }

    pub fn frames_seen(&self) -> u32 {
        self.frames_seen
    }

    pub fn is_initialised(&self) -> bool {
        self.frames_seen > 0
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Classifies `image` against the model, then folds it into the model.
    /// Returns a mask with `FOREGROUND`/`BACKGROUND` values.
    pub fn apply(&mut self, image: &GrayImage) -> Result<GrayImage> {
        let (width, height) = image.dimensions();

        if !self.is_initialised() {
            self.initialise(image);
            return Ok(GrayImage::new(width, height));
        }

        if (width, height) != (self.width, self.height) {
            return Err(TrainerError::InvalidFrame(format!(
                "frame is {width}x{height} but the background model learned {}x{}",
                self.width, self.height
            )));
        }

        self.frames_seen = self.frames_seen.saturating_add(1);
        let alpha = 1.0 / self.frames_seen.min(self.history) as f32;

        let mut mask = GrayImage::new(width, height);
        for (index, (pixel, out)) in image.pixels().zip(mask.pixels_mut()).enumerate() {
            let sample = pixel.0[0] as f32;
            let mean = self.mean[index];
            let variance = self.variance[index];

            let delta = sample - mean;
            let distance_sq = delta * delta;
            out.0[0] = if distance_sq > self.var_threshold * variance {
                FOREGROUND
            } else {
                BACKGROUND
            };

            self.mean[index] = mean + alpha * delta;
            self.variance[index] = (variance + alpha * (distance_sq - variance))
                .clamp(self.min_variance, self.max_variance);
        }

        Ok(mask)
    }

    fn initialise(&mut self, image: &GrayImage) {
        let (width, height) = image.dimensions();
        self.width = width;
        self.height = height;
        self.mean = image.pixels().map(|p| p.0[0] as f32).collect();
        self.variance = vec![
            self.initial_variance.clamp(self.min_variance, self.max_variance);
            self.mean.len()
        ];
        self.frames_seen = 1;
    }
}
