//! Axis-aligned boxes and overlap measures.
//!
//! Boxes are `(x1, y1, x2, y2)` in pixels with `x2 >= x1` and `y2 >= y1`
//! assumed but not enforced. Widths are `x2 - x1` with no `+1` pixel
//! convention.

/// Sub-pixel factor of fixed-point box coordinates (1/8 pixel).
pub const BOX_FIXED_POINT_SCALE: f32 = 0.125;

/// A stored box coordinate that can be converted to pixels.
pub trait BoxCoord: Copy + Send + Sync + std::fmt::Debug + PartialEq {
    /// Returns the coordinate in pixels.
    fn to_pixels(self) -> f32;
}

impl BoxCoord for u16 {
    #[inline]
    fn to_pixels(self) -> f32 {
        self as f32 * BOX_FIXED_POINT_SCALE
    }
}

impl BoxCoord for f32 {
    #[inline]
    fn to_pixels(self) -> f32 {
        self
    }
}

/// Axis-aligned box in pixel units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Aabb {
    /// Creates a box from corner coordinates.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Decodes stored `(x1, y1, x2, y2)` coordinates.
    #[inline]
    pub fn from_coords<T: BoxCoord>(coords: [T; 4]) -> Self {
        Self {
            x1: coords[0].to_pixels(),
            y1: coords[1].to_pixels(),
            x2: coords[2].to_pixels(),
            y2: coords[3].to_pixels(),
        }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Computes intersection and union areas with `other`.
    #[inline]
    pub fn overlap(&self, other: &Aabb) -> Overlap {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);
        let intersection = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        Overlap {
            intersection,
            union: self.area() + other.area() - intersection,
        }
    }
}

/// Intersection and union areas of a box pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Overlap {
    pub intersection: f32,
    pub union: f32,
}

impl Overlap {
    /// Intersection over union in `[0, 1]`; zero when the union is empty.
    #[inline]
    pub fn iou(&self) -> f32 {
        if self.union <= 0.0 {
            return 0.0;
        }
        (self.intersection / self.union).clamp(0.0, 1.0)
    }

    /// Returns true if the IoU is strictly above `max_iou`.
    ///
    /// Evaluated as `intersection > max_iou * union`, which needs no
    /// division and never fires for an empty union.
    #[inline]
    pub fn exceeds(&self, max_iou: f32) -> bool {
        self.intersection > max_iou * self.union
    }
}

/// Intersection over union of two boxes.
pub fn iou(a: &Aabb, b: &Aabb) -> f32 {
    a.overlap(b).iou()
}
