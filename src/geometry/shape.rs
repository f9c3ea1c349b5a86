use std::f64::consts::TAU;

use crate::error::{GeometryViolation, Result};
use crate::math::polygon_2d::{signed_area, to_ccw};
use crate::math::{Point2, Rect2, TOLERANCE};

/// A user-drawn shape in panel-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rectangle { min: Point2, max: Point2 },
    /// Circle approximated by a regular polygon with `segments` sides.
    Circle {
        center: Point2,
        radius: f64,
        segments: u32,
    },
    Polygon { points: Vec<Point2> },
}

impl Shape {
    /// Converts the shape into a counter-clockwise polygon.
    ///
    /// # Errors
    ///
    /// Returns `GeometryViolation::Degenerate` if the shape encloses no area.
    pub fn to_polygon(&self) -> Result<Vec<Point2>> {
        let points = match self {
            Shape::Rectangle { min, max } => Rect2::new(*min, *max).to_polygon(),
            Shape::Circle {
                center,
                radius,
                segments,
            } => {
                let n = (*segments).max(3);
                (0..n)
                    .map(|i| {
                        let angle = TAU * f64::from(i) / f64::from(n);
                        Point2::new(
                            center.x + radius * angle.cos(),
                            center.y + radius * angle.sin(),
                        )
                    })
                    .collect()
            }
            Shape::Polygon { points } => points.clone(),
        };
        if points.len() < 3 || signed_area(&points).abs() <= TOLERANCE {
            return Err(GeometryViolation::Degenerate("shape encloses no area".into()).into());
        }
        Ok(to_ccw(&points))
    }
}
