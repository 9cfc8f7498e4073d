// THEORY:
// The `Silhouette` is the spatial summary of the person in a single frame. It
// reduces a whole foreground region to the three numbers the rep counter cares
// about: where the region is (bounding box), where its middle is (centroid)
// and how big it is (area).
//
// Like the mask it is derived from, a `Silhouette` is a stateless snapshot. It
// has no identity across frames beyond "the largest region right now", and it
// knows nothing about calibration or exercise cycles.

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Integer center of the box.
    pub fn center(&self) -> Centroid {
        Centroid {
            x: self.x + self.width / 2,
            y: self.y + self.height / 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Centroid {
    pub x: u32,
    pub y: u32,
}

/// The dominant foreground region of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Silhouette {
    pub bounding_box: BoundingBox,
    /// Center of `bounding_box`, not the area-weighted center. Holes in the
    /// mask move the box far less than they move a pixel-mass centroid.
    pub centroid: Centroid,
    /// Number of foreground pixels in the region.
    pub area: u32,
}

impl Silhouette {
    pub fn from_box(bounding_box: BoundingBox, area: u32) -> Self {
        Self {
            bounding_box,
            centroid: bounding_box.center(),
            area,
        }
    }
}
