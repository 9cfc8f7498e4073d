use crate::core_modules::silhouette::Centroid;

/// Snapshot of the person at rest, taken once on the user's command. Every
/// later measurement is judged relative to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationReference {
    pub centroid_x: u32,
    pub centroid_y: u32,
    /// Never zero.
    pub width: u32,
    /// Never zero.
    pub height: u32,
}

impl CalibrationReference {
    pub fn capture(centroid: Centroid, width: u32, height: u32) -> Self {
        Self {
            centroid_x: centroid.x,
            centroid_y: centroid.y,
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Ratio of a smoothed centroid Y to the reference. A person calibrated on
    /// the very top row has no meaningful ratio and reads as "at rest".
    pub fn relative_centroid_y(&self, smoothed: f64) -> f64 {
        ratio(smoothed, self.centroid_y)
    }

    pub fn relative_width(&self, smoothed: f64) -> f64 {
        ratio(smoothed, self.width)
    }

    pub fn relative_height(&self, smoothed: f64) -> f64 {
        ratio(smoothed, self.height)
    }
}

fn ratio(value: f64, reference: u32) -> f64 {
    if reference == 0 {
        1.0
    } else {
        value / reference as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_box_is_floored_to_one_pixel() {
        let reference = CalibrationReference::capture(Centroid { x: 5, y: 7 }, 0, 0);
        assert_eq!((reference.width, reference.height), (1, 1));
        assert_eq!(reference.relative_width(3.0), 3.0);
        assert!(reference.relative_height(0.0).is_finite());
    }

    #[test]
    fn ratios_are_relative_to_the_snapshot() {
        let reference = CalibrationReference::capture(Centroid { x: 160, y: 200 }, 100, 300);
        assert_eq!(reference.relative_centroid_y(160.0), 0.8);
        assert_eq!(reference.relative_width(120.0), 1.2);
        assert_eq!(reference.relative_height(150.0), 0.5);
    }

    #[test]
    fn centroid_on_the_top_row_reads_as_rest() {
        let reference = CalibrationReference::capture(Centroid { x: 10, y: 0 }, 50, 50);
        assert_eq!(reference.relative_centroid_y(42.0), 1.0);
    }
}
