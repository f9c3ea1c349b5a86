use crate::error::Result;
use crate::math::Point2;

use super::assemble::Region;
use super::engine::boolean_execute;
use super::select::BooleanOp;

/// Computes the boolean difference (A minus B) of two polygons.
pub struct Subtract<'a> {
    polygon_a: &'a [Point2],
    polygon_b: &'a [Point2],
}

impl<'a> Subtract<'a> {
    /// Creates a new `Subtract` operation.
    #[must_use]
    pub fn new(polygon_a: &'a [Point2], polygon_b: &'a [Point2]) -> Self {
        Self {
            polygon_a,
            polygon_b,
        }
    }

    /// Executes the operation, returning the resulting regions.
    ///
    /// # Errors
    ///
    /// Returns an error if either polygon is degenerate.
    pub fn execute(&self) -> Result<Vec<Region>> {
        boolean_execute(self.polygon_a, self.polygon_b, BooleanOp::Subtract)
    }
}
