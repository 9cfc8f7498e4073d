use image::{GrayImage, Luma};

/// Binary foreground/background grid with the same dimensions as its frame.
/// Stored as a 0/255 gray image so it can be written out for inspection as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct ForegroundMask {
    image: GrayImage,
}

impl ForegroundMask {
    /// Any non-zero pixel of `image` counts as foreground.
    pub fn from_image(mut image: GrayImage) -> Self {
        for pixel in image.pixels_mut() {
            if pixel.0[0] > 0 {
                pixel.0[0] = 255;
            }
        }
        Self { image }
    }

    pub fn from_fn(width: u32, height: u32, is_foreground: impl Fn(u32, u32) -> bool) -> Self {
        let image = GrayImage::from_fn(width, height, |x, y| {
            Luma([if is_foreground(x, y) { 255 } else { 0 }])
        });
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[inline]
    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y).0[0] > 0
    }

    pub fn foreground_count(&self) -> usize {
        self.image.pixels().filter(|p| p.0[0] > 0).count()
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }
}
