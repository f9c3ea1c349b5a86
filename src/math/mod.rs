pub mod arc_2d;
pub mod axis;
pub mod bounds;
pub mod intersect_2d;
pub mod polygon_2d;

pub use axis::Axis;
pub use bounds::{Bounds3, Rect2};

/// 2D point type (panel-local millimetres).
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type (box-local millimetres).
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons, in millimetres.
pub const TOLERANCE: f64 = 1e-6;
