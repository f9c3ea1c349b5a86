use std::f64::consts::FRAC_PI_2;

use nalgebra::Rotation3;

use crate::math::{Axis, Bounds3, Point2, Point3, Vector3};

/// Placement of a panel: its normal axis and centre.
///
/// Local `(u, v)` follow [`Axis::panel_axes`] and are measured from the
/// centre. `center` is in the owning assembly's coordinates; `origin` places
/// that assembly in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelFrame {
    pub normal: Axis,
    pub center: Point3,
    pub origin: Vector3,
}

fn unit(axis: Axis) -> Vector3 {
    match axis {
        Axis::X => Vector3::x(),
        Axis::Y => Vector3::y(),
        Axis::Z => Vector3::z(),
    }
}

impl PanelFrame {
    /// Frame centred on `slab`, a panel of the given normal axis.
    #[must_use]
    pub fn for_slab(normal: Axis, slab: &Bounds3, origin: Vector3) -> Self {
        Self {
            normal,
            center: slab.center(),
            origin,
        }
    }

    #[must_use]
    pub fn axes(&self) -> (Axis, Axis) {
        self.normal.panel_axes()
    }

    /// Projects an assembly-local point into panel-local coordinates.
    #[must_use]
    pub fn to_local(&self, p: &Point3) -> Point2 {
        let (u, v) = self.axes();
        Point2::new(
            p[u.index()] - self.center[u.index()],
            p[v.index()] - self.center[v.index()],
        )
    }

    /// World unit vectors of the local `u` and `v` axes.
    #[must_use]
    pub fn axis_vectors(&self) -> (Vector3, Vector3) {
        let (u, v) = self.axes();
        (unit(u), unit(v))
    }

    /// Unit vector of the local `w` axis (`u × v`) in world space.
    #[must_use]
    pub fn normal_vector(&self) -> Vector3 {
        let (u, v) = self.axes();
        unit(u).cross(&unit(v))
    }

    /// Maps a panel-local point at height `w` above the mid-plane to world
    /// coordinates.
    #[must_use]
    pub fn to_world(&self, p: &Point2, w: f64) -> Point3 {
        let (u, v) = self.axes();
        self.position() + unit(u) * p.x + unit(v) * p.y + self.normal_vector() * w
    }

    /// World position of the panel centre.
    #[must_use]
    pub fn position(&self) -> Point3 {
        self.center + self.origin
    }

    /// Rotation taking local `(u, v, w)` onto world axes.
    #[must_use]
    pub fn rotation(&self) -> Rotation3<f64> {
        match self.normal {
            Axis::X => Rotation3::from_euler_angles(0.0, -FRAC_PI_2, 0.0),
            Axis::Y => Rotation3::from_euler_angles(FRAC_PI_2, 0.0, 0.0),
            Axis::Z => Rotation3::identity(),
        }
    }
}
