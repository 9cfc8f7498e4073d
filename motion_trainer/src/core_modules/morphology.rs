// Binary morphology on 0/255 masks. Pixels outside the image never erode a
// shape and never grow one, so an object touching the frame edge is not eaten
// away just because it is cut off.

use image::{GrayImage, Luma};

/// A set of offsets around an anchor at the element's center.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    width: u32,
    height: u32,
    offsets: Vec<(i32, i32)>,
}

impl StructuringElement {
    /// Filled ellipse inscribed in a `width` x `height` box.
    ///
    /// Each row `i` spans `c ± round(c * sqrt(1 - dy²/r²))` around the center
    /// column, which for 5x5 yields the familiar "rounded plus":
    ///
    /// ```text
    /// . . # . .
    /// # # # # #
    /// # # # # #
    /// # # # # #
    /// . . # . .
    /// ```
    pub fn ellipse(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let r = (height / 2) as i32;
        let c = (width / 2) as i32;
        let inv_r2 = if r > 0 { 1.0 / (r * r) as f64 } else { 0.0 };

        let mut offsets = Vec::new();
        for i in 0..height as i32 {
            let dy = i - r;
            if dy.abs() > r {
                continue;
            }
            let dx = (c as f64 * (((r * r - dy * dy) as f64) * inv_r2).sqrt()).round() as i32;
            let j1 = (c - dx).max(0);
            let j2 = (c + dx + 1).min(width as i32);
            for j in j1..j2 {
                offsets.push((j - c, dy));
            }
        }
        Self { width, height, offsets }
    }

    /// Filled rectangle.
    pub fn rect(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let (cx, cy) = ((width / 2) as i32, (height / 2) as i32);
        let offsets = (0..height as i32)
            .flat_map(|y| (0..width as i32).map(move |x| (x - cx, y - cy)))
            .collect();
        Self { width, height, offsets }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn contains(&self, dx: i32, dy: i32) -> bool {
        self.offsets.contains(&(dx, dy))
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

#[inline]
fn is_set(mask: &GrayImage, x: i64, y: i64) -> Option<bool> {
    if x < 0 || y < 0 || x >= mask.width() as i64 || y >= mask.height() as i64 {
        return None;
    }
    Some(mask.get_pixel(x as u32, y as u32).0[0] > 0)
}

/// A pixel survives only if every in-bounds pixel under the element is set.
pub fn erode(mask: &GrayImage, element: &StructuringElement) -> GrayImage {
    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        let keep = element.offsets.iter().all(|&(dx, dy)| {
            is_set(mask, x as i64 + dx as i64, y as i64 + dy as i64).unwrap_or(true)
        });
        Luma([if keep { 255 } else { 0 }])
    })
}

/// A pixel is set if any in-bounds pixel under the element is set.
pub fn dilate(mask: &GrayImage, element: &StructuringElement) -> GrayImage {
    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        let hit = element.offsets.iter().any(|&(dx, dy)| {
            is_set(mask, x as i64 - dx as i64, y as i64 - dy as i64).unwrap_or(false)
        });
        Luma([if hit { 255 } else { 0 }])
    })
}

/// Erosion followed by dilation: removes specks smaller than the element.
pub fn open(mask: &GrayImage, element: &StructuringElement) -> GrayImage {
    dilate(&erode(mask, element), element)
}
