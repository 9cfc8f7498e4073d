// THEORY:
// The silhouette extractor is the engine of the measurement layer. It scans a
// `ForegroundMask` for connected foreground regions and reports the largest
// one as a `Silhouette`.
//
// Algorithm:
// 1.  **Seeding**: pixels are visited in row-major order; every unvisited
//     foreground pixel seeds a new region.
// 2.  **Region Growing**: a depth-first flood over the 8 neighbors collects
//     every foreground pixel connected to the seed, marking them visited so no
//     pixel is ever counted twice.
// 3.  **Aggregation**: each region is reduced to its bounding box and pixel
//     count.
// 4.  **Selection**: the region with the largest area wins. On an exact tie
//     the region seeded first (top-most, then left-most) is kept; this is an
//     implementation detail, not a guarantee callers should rely on.
// 5.  **Noise Floor**: if even the winner is smaller than `min_area`, the frame
//     has no silhouette at all.
//
// Like the rest of the measurement layer, the extractor is stateless.

use crate::core_modules::mask::ForegroundMask;
use crate::core_modules::silhouette::{BoundingBox, Silhouette};

pub mod silhouette_extractor {
    use super::*;

    pub const DEFAULT_MIN_AREA: u32 = 500;

    const NEIGHBORS: [(i64, i64); 8] = [
        (-1, -1), (0, -1), (1, -1),
        (-1, 0),           (1, 0),
        (-1, 1),  (0, 1),  (1, 1),
    ];

    /// Largest connected region with at least `min_area` pixels, if any.
    pub fn find_largest(mask: &ForegroundMask, min_area: u32) -> Option<Silhouette> {
        let mut best: Option<Silhouette> = None;
        for region in find_regions(mask) {
            match best {
                Some(current) if region.area <= current.area => {}
                _ => best = Some(region),
            }
        }
        best.filter(|s| s.area >= min_area)
    }

    /// Every connected region in seed order, without any area filtering.
    pub fn find_regions(mask: &ForegroundMask) -> Vec<Silhouette> {
        let width = mask.width() as usize;
        let height = mask.height() as usize;
        let mut visited = vec![false; width * height];
        let mut regions = Vec::new();

        for y in 0..height {
            for x in 0..width {
                if visited[y * width + x] || !mask.is_foreground(x as u32, y as u32) {
                    continue;
                }
                regions.push(grow_region(mask, x, y, &mut visited));
            }
        }
        regions
    }

    fn grow_region(mask: &ForegroundMask, seed_x: usize, seed_y: usize, visited: &mut [bool]) -> Silhouette {
        let width = mask.width() as usize;
        let height = mask.height() as usize;

        let mut stack = vec![(seed_x, seed_y)];
        visited[seed_y * width + seed_x] = true;

        let (mut min_x, mut min_y) = (seed_x, seed_y);
        let (mut max_x, mut max_y) = (seed_x, seed_y);
        let mut area: u32 = 0;

        while let Some((x, y)) = stack.pop() {
            area += 1;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);

            for (dx, dy) in NEIGHBORS {
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                    continue;
                }
                let (nx, ny) = (nx as usize, ny as usize);
                let index = ny * width + nx;
                if !visited[index] && mask.is_foreground(nx as u32, ny as u32) {
                    visited[index] = true;
                    stack.push((nx, ny));
                }
            }
        }

        let bounding_box = BoundingBox {
            x: min_x as u32,
            y: min_y as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        };
        Silhouette::from_box(bounding_box, area)
    }
}
