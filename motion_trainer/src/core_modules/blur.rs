// Separable Gaussian blur on 8-bit intensity images. Sigma follows the usual
// rule for a kernel given only by its size, and borders are mirrored without
// repeating the edge sample (reflect-101), so a flat image stays flat.

use image::{GrayImage, Luma};

/// Sigma implied by an odd kernel size when none is given explicitly.
pub fn sigma_for_kernel(size: u32) -> f32 {
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1D Gaussian weights of length `size`.
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    let size = size.max(1);
    let sigma = sigma_for_kernel(size);
    let radius = (size / 2) as i32;
    let weights: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let total: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

#[inline]
fn reflect_101(mut index: i64, len: i64) -> usize {
    if len == 1 {
        return 0;
    }
    while index < 0 || index >= len {
        if index < 0 {
            index = -index;
        }
        if index >= len {
            index = 2 * len - 2 - index;
        }
    }
    index as usize
}

pub fn gaussian_blur(image: &GrayImage, kernel_size: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || kernel_size <= 1 {
        return image.clone();
    }
    let kernel = gaussian_kernel(kernel_size);
    let radius = (kernel.len() / 2) as i64;
    let (w, h) = (width as usize, height as usize);

    // Horizontal pass keeps full precision; rounding happens once at the end.
    let mut horizontal = vec![0.0f32; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = reflect_101(x as i64 + k as i64 - radius, w as i64);
                acc += weight * image.get_pixel(sx as u32, y as u32).0[0] as f32;
            }
            horizontal[y * w + x] = acc;
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        let mut acc = 0.0f32;
        for (k, weight) in kernel.iter().enumerate() {
            let sy = reflect_101(y as i64 + k as i64 - radius, h as i64);
            acc += weight * horizontal[sy * w + x as usize];
        }
        Luma([acc.round().clamp(0.0, 255.0) as u8])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(7);
        assert_eq!(kernel.len(), 7);
        let total: f32 = kernel.iter().sum();
        assert!((total - 1.0).abs() < 1e-5);
        for i in 0..3 {
            assert!((kernel[i] - kernel[6 - i]).abs() < 1e-7);
            assert!(kernel[i] < kernel[i + 1]);
        }
        assert!((sigma_for_kernel(7) - 1.4).abs() < 1e-6);
    }

    #[test]
    fn flat_image_stays_flat() {
        let image = GrayImage::from_pixel(9, 5, Luma([77]));
        let blurred = gaussian_blur(&image, 7);
        assert!(blurred.pixels().all(|p| p.0[0] == 77));
    }

    #[test]
    fn impulse_spreads_only_within_the_kernel_radius() {
        let mut image = GrayImage::new(21, 21);
        image.put_pixel(10, 10, Luma([255]));
        let blurred = gaussian_blur(&image, 7);

        let center = blurred.get_pixel(10, 10).0[0];
        assert!(center > 0 && center < 255);
        assert!(blurred.get_pixel(12, 10).0[0] > 0);
        assert_eq!(blurred.get_pixel(14, 10).0[0], 0);
        assert_eq!(blurred.get_pixel(10, 14).0[0], 0);
    }

    #[test]
    fn reflection_stays_in_bounds_on_tiny_images() {
        assert_eq!(reflect_101(-3, 2), 1);
        assert_eq!(reflect_101(5, 2), 1);
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(-4, 1), 0);

        let image = GrayImage::from_pixel(2, 1, Luma([9]));
        assert_eq!(gaussian_blur(&image, 7).dimensions(), (2, 1));
    }
}
