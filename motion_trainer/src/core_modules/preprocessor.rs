// THEORY:
// The `FramePreprocessor` is the orchestrator of the segmentation layer. It is
// not an analyzer itself; it owns the stateful `BackgroundModel` and drives a
// raw color frame through the fixed sequence of stages that turn it into a
// clean binary `ForegroundMask`:
//
// 1.  **Intensity**: color is irrelevant to motion here, so the frame is
//     reduced to one luma channel.
// 2.  **Blur**: a small Gaussian suppresses per-pixel sensor noise before it
//     can reach the statistical model.
// 3.  **Background Subtraction**: the adaptive model classifies every pixel
//     and learns from the frame in the same pass.
// 4.  **Morphological Cleanup**: an "open" removes isolated specks that
//     survived the statistics, and a final "dilate" re-fills the remaining
//     silhouette so that limbs stay attached to the torso.
//
// The mask always has the frame's dimensions. The only failure is a malformed
// frame, including one whose size differs from what the model has learned.

use crate::config::PreprocessConfig;
use crate::core_modules::background_model::BackgroundModel;
use crate::core_modules::blur::gaussian_blur;
use crate::core_modules::frame::Frame;
use crate::core_modules::mask::ForegroundMask;
use crate::core_modules::morphology::{self, StructuringElement};
use crate::error::Result;

pub struct FramePreprocessor {
    blur_kernel: u32,
    background: BackgroundModel,
    element: StructuringElement,
}

impl FramePreprocessor {
    pub fn new(config: &PreprocessConfig) -> Self {
        Self {
            blur_kernel: config.blur_kernel,
            background: BackgroundModel::new(config),
            element: StructuringElement::ellipse(config.morph_kernel, config.morph_kernel),
        }
    }

    pub fn process(&mut self, frame: &Frame) -> Result<ForegroundMask> {
        let intensity = frame.intensity();
        let blurred = gaussian_blur(&intensity, self.blur_kernel);
        let raw = self.background.apply(&blurred)?;
        let opened = morphology::open(&raw, &self.element);
        let filled = morphology::dilate(&opened, &self.element);
        Ok(ForegroundMask::from_image(filled))
    }

    /// Drops the learned background. Only valid at a session boundary.
    pub fn reset(&mut self) {
        self.background.reset();
    }

    pub fn background(&self) -> &BackgroundModel {
        &self.background
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrainerError;
    use image::{Rgb, RgbImage};

    fn scene(width: u32, height: u32, person: Option<(u32, u32, u32, u32)>) -> Frame {
        let image = RgbImage::from_fn(width, height, |x, y| match person {
            Some((px, py, pw, ph)) if x >= px && x < px + pw && y >= py && y < py + ph => {
                Rgb([210, 200, 190])
            }
            _ => Rgb([30, 35, 40]),
        });
        Frame::from_image(image).expect("valid frame")
    }

    #[test]
    fn empty_scene_produces_an_empty_mask() {
        let mut pre = FramePreprocessor::new(&PreprocessConfig::default());
        for _ in 0..5 {
            let mask = pre.process(&scene(64, 48, None)).unwrap();
            assert_eq!((mask.width(), mask.height()), (64, 48));
            assert_eq!(mask.foreground_count(), 0);
        }
    }

    #[test]
    fn new_object_shows_up_as_one_solid_region() {
        let mut pre = FramePreprocessor::new(&PreprocessConfig::default());
        for _ in 0..10 {
            pre.process(&scene(80, 60, None)).unwrap();
        }
        let mask = pre.process(&scene(80, 60, Some((30, 15, 20, 30)))).unwrap();

        assert!(mask.is_foreground(40, 30));
        assert!(!mask.is_foreground(2, 2));
        assert!(!mask.is_foreground(77, 57));
        let count = mask.foreground_count();
        assert!(count > 20 * 30 / 2, "foreground too small: {count}");
        assert!(count < 40 * 50, "foreground too large: {count}");
    }

    #[test]
    fn resized_frame_mid_session_is_rejected_and_reset_recovers() {
        let mut pre = FramePreprocessor::new(&PreprocessConfig::default());
        pre.process(&scene(32, 32, None)).unwrap();
        assert!(matches!(
            pre.process(&scene(40, 32, None)),
            Err(TrainerError::InvalidFrame(_))
        ));
        pre.reset();
        assert!(pre.process(&scene(40, 32, None)).is_ok());
        assert_eq!(pre.background().dimensions(), (40, 32));
    }
}
