/// 2D arc/bulge math used for corner fillets.
///
/// Bulge convention: `bulge = tan(sweep_angle / 4)`.
/// - `bulge = 0`: straight line
/// - `bulge > 0`: counter-clockwise arc
/// - `bulge < 0`: clockwise arc
/// - `|bulge| = 1`: semicircle
use std::f64::consts::PI;

use super::Point2;

/// Centre-radius-angle form of a bulge arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcParams {
    pub center: Point2,
    pub radius: f64,
    pub start_angle: f64,
    pub sweep: f64,
}

/// Converts a bulge-defined arc segment to centre-radius-angle form.
///
/// Returns a zero-radius arc for zero-length chords.
#[must_use]
pub fn arc_from_bulge(p0: &Point2, p1: &Point2, bulge: f64) -> ArcParams {
    let d = p1 - p0;
    let chord_len = d.norm();

    if chord_len < 1e-12 || bulge.abs() < 1e-12 {
        return ArcParams {
            center: *p0,
            radius: 0.0,
            start_angle: 0.0,
            sweep: 0.0,
        };
    }

    // Distance from chord midpoint to center.
    let sagitta_ratio = (1.0 - bulge * bulge) / (2.0 * bulge);
    let mid = nalgebra::center(p0, p1);

    // Normal to chord pointing toward center (for positive bulge, center is left of chord).
    let nx = -d.y / chord_len;
    let ny = d.x / chord_len;

    let center = Point2::new(
        mid.x + sagitta_ratio * (chord_len * 0.5) * nx,
        mid.y + sagitta_ratio * (chord_len * 0.5) * ny,
    );

    // r = d*(1+b²)/(4*|b|) derived from r = d/(2*sin(θ/2)) with θ=4*atan(b)
    let radius = (chord_len * 0.5) * (1.0 + bulge * bulge) / (2.0 * bulge.abs());
    let start_angle = (p0.y - center.y).atan2(p0.x - center.x);

    let sweep = 4.0 * bulge.atan();
    let sweep = if sweep > 2.0 * PI {
        sweep - 2.0 * PI
    } else if sweep < -2.0 * PI {
        sweep + 2.0 * PI
    } else {
        sweep
    };

    ArcParams {
        center,
        radius,
        start_angle,
        sweep,
    }
}

/// Bulge of an arc that turns the path direction by `sweep` radians.
#[must_use]
pub fn bulge_for_sweep(sweep: f64) -> f64 {
    (sweep / 4.0).tan()
}

/// Evaluates a point on an arc at parameter `t` in `[0, 1]`.
#[must_use]
pub fn arc_point_at(arc: &ArcParams, t: f64) -> Point2 {
    let angle = arc.start_angle + arc.sweep * t;
    Point2::new(
        arc.center.x + arc.radius * angle.cos(),
        arc.center.y + arc.radius * angle.sin(),
    )
}

/// Number of chords needed to approximate an arc within `tolerance`.
#[must_use]
pub fn arc_subdivision_count(radius: f64, abs_sweep: f64, tolerance: f64) -> u32 {
    if radius < 1e-12 || abs_sweep < 1e-12 || tolerance <= 0.0 {
        return 1;
    }
    // From the sagitta formula: sagitta = r * (1 - cos(θ/2))
    let max_angle = if tolerance >= radius {
        PI
    } else {
        2.0 * (1.0 - tolerance / radius).acos()
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = (abs_sweep / max_angle).ceil() as u32;
    n.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn quarter_arc_from_bulge() {
        let p0 = Point2::new(1.0, 0.0);
        let p1 = Point2::new(0.0, 1.0);
        let arc = arc_from_bulge(&p0, &p1, bulge_for_sweep(FRAC_PI_2));
        assert_abs_diff_eq!(arc.radius, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(arc.center.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(arc.center.y, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(arc.sweep, FRAC_PI_2, epsilon = 1e-9);

        let mid = arc_point_at(&arc, 0.5);
        assert_abs_diff_eq!(mid.x, (0.25 * PI).cos(), epsilon = 1e-9);
        assert_abs_diff_eq!(mid.y, (0.25 * PI).sin(), epsilon = 1e-9);
    }

    #[test]
    fn clockwise_bulge_is_negative() {
        assert!(bulge_for_sweep(-FRAC_PI_2) < 0.0);
    }

    #[test]
    fn subdivision_count_grows_with_radius() {
        let small = arc_subdivision_count(1.0, FRAC_PI_2, 0.01);
        let large = arc_subdivision_count(100.0, FRAC_PI_2, 0.01);
        assert!(large > small);
        assert_eq!(arc_subdivision_count(0.0, FRAC_PI_2, 0.01), 1);
    }
}
