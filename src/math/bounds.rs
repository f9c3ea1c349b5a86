use serde::{Deserialize, Serialize};

use super::{Axis, Point2, Point3, TOLERANCE};

/// An axis-aligned box in box-local millimetres.
///
/// `(x, y, z)` is the minimum corner and `(w, h, d)` the extents along
/// `X`, `Y` and `Z`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
    pub h: f64,
    pub d: f64,
}

impl Bounds3 {
    /// Creates bounds from a minimum corner and extents.
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64, w: f64, h: f64, d: f64) -> Self {
        Self { x, y, z, w, h, d }
    }

    /// Minimum coordinate along `axis`.
    #[must_use]
    pub fn min(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Extent along `axis`.
    #[must_use]
    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.w,
            Axis::Y => self.h,
            Axis::Z => self.d,
        }
    }

    /// Maximum coordinate along `axis`.
    #[must_use]
    pub fn max(&self, axis: Axis) -> f64 {
        self.min(axis) + self.extent(axis)
    }

    /// Returns a copy with the span along `axis` replaced.
    #[must_use]
    pub fn with_span(&self, axis: Axis, min: f64, extent: f64) -> Self {
        let mut out = *self;
        match axis {
            Axis::X => {
                out.x = min;
                out.w = extent;
            }
            Axis::Y => {
                out.y = min;
                out.h = extent;
            }
            Axis::Z => {
                out.z = min;
                out.d = extent;
            }
        }
        out
    }

    /// Shrinks the bounds by `amount` on every side.
    #[must_use]
    pub fn shrunk(&self, amount: f64) -> Self {
        Self::new(
            self.x + amount,
            self.y + amount,
            self.z + amount,
            self.w - 2.0 * amount,
            self.h - 2.0 * amount,
            self.d - 2.0 * amount,
        )
    }

    /// Translates the bounds by the coordinates of `offset`.
    #[must_use]
    pub fn translated(&self, offset: &Point3) -> Self {
        Self::new(
            self.x + offset.x,
            self.y + offset.y,
            self.z + offset.z,
            self.w,
            self.h,
            self.d,
        )
    }

    /// Minimum corner as a point.
    #[must_use]
    pub fn origin(&self) -> Point3 {
        Point3::new(self.x, self.y, self.z)
    }

    /// Centre of the bounds.
    #[must_use]
    pub fn center(&self) -> Point3 {
        Point3::new(
            self.x + self.w * 0.5,
            self.y + self.h * 0.5,
            self.z + self.d * 0.5,
        )
    }

    /// Returns `true` if `p` lies strictly inside the bounds (beyond tolerance).
    #[must_use]
    pub fn contains_strict(&self, p: &Point3) -> bool {
        Axis::ALL.into_iter().all(|axis| {
            let c = p[axis.index()];
            c > self.min(axis) + TOLERANCE && c < self.max(axis) - TOLERANCE
        })
    }

    /// Intersection of two bounds, or `None` unless it has positive volume.
    #[must_use]
    pub fn overlap(&self, other: &Self) -> Option<Self> {
        let mut out = *self;
        for axis in Axis::ALL {
            let lo = self.min(axis).max(other.min(axis));
            let hi = self.max(axis).min(other.max(axis));
            if hi - lo <= TOLERANCE {
                return None;
            }
            out = out.with_span(axis, lo, hi - lo);
        }
        Some(out)
    }
}

/// An axis-aligned rectangle in panel-local millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect2 {
    pub min: Point2,
    pub max: Point2,
}

impl Rect2 {
    /// Creates a rectangle from two opposite corners in any order.
    #[must_use]
    pub fn new(a: Point2, b: Point2) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Creates a rectangle of the given size centred on the origin.
    #[must_use]
    pub fn centered(width: f64, height: f64) -> Self {
        Self::new(
            Point2::new(-width * 0.5, -height * 0.5),
            Point2::new(width * 0.5, height * 0.5),
        )
    }

    /// Bounding rectangle of a point set, or `None` when it is empty.
    #[must_use]
    pub fn from_points(points: &[Point2]) -> Option<Self> {
        let first = points.first()?;
        let mut rect = Self::new(*first, *first);
        for p in &points[1..] {
            rect.min.x = rect.min.x.min(p.x);
            rect.min.y = rect.min.y.min(p.y);
            rect.max.x = rect.max.x.max(p.x);
            rect.max.y = rect.max.y.max(p.y);
        }
        Some(rect)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Returns `true` if `p` is inside or on the boundary (within tolerance).
    #[must_use]
    pub fn contains(&self, p: &Point2) -> bool {
        p.x >= self.min.x - TOLERANCE
            && p.x <= self.max.x + TOLERANCE
            && p.y >= self.min.y - TOLERANCE
            && p.y <= self.max.y + TOLERANCE
    }

    /// Returns `true` if the two rectangles share interior area.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min.x < other.max.x - TOLERANCE
            && other.min.x < self.max.x - TOLERANCE
            && self.min.y < other.max.y - TOLERANCE
            && other.min.y < self.max.y - TOLERANCE
    }

    /// Distance from `p` to the rectangle (zero when inside).
    #[must_use]
    pub fn distance_to(&self, p: &Point2) -> f64 {
        let dx = (self.min.x - p.x).max(0.0).max(p.x - self.max.x);
        let dy = (self.min.y - p.y).max(0.0).max(p.y - self.max.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// Counter-clockwise corner loop starting at the minimum corner.
    #[must_use]
    pub fn to_polygon(&self) -> Vec<Point2> {
        vec![
            self.min,
            Point2::new(self.max.x, self.min.y),
            self.max,
            Point2::new(self.min.x, self.max.y),
        ]
    }
}
