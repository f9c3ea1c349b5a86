use crate::error::{GeometryViolation, Result};
use crate::math::{Point2, Vector2, TOLERANCE};

/// Parameters shared by every finger-jointed edge of one assembly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FingerParams {
    /// Nominal width of each finger and each gap.
    pub finger_width: f64,
    /// Material thickness of the panel the edge belongs to.
    pub thickness: f64,
    /// Corner clearance multiplier: the first finger starts
    /// `thickness * (1 + finger_gap)` from each end of the edge.
    pub finger_gap: f64,
    /// Cut width compensation.
    pub kerf: f64,
}

impl FingerParams {
    /// Distance kept free of fingers at each end of an edge.
    #[must_use]
    pub fn corner_clearance(&self) -> f64 {
        self.thickness * (1.0 + self.finger_gap)
    }
}

/// Finger positions along an edge, as offsets from the edge start.
///
/// The usable zone `[c, L - c]` is cut into an odd number of equal segments
/// no narrower than the finger width; even segments are fingers. Any
/// leftover is split equally between both ends, so the layout reads the same
/// from either end and two mating edges always agree.
#[derive(Debug, Clone, PartialEq)]
pub struct FingerLayout {
    pub length: f64,
    pub fingers: Vec<(f64, f64)>,
}

impl FingerLayout {
    /// Lays out fingers over an edge of nominal `length`.
    #[must_use]
    pub fn new(length: f64, params: &FingerParams) -> Self {
        let clearance = params.corner_clearance();
        let zone = length - 2.0 * clearance;
        if params.finger_width <= 0.0 || zone < params.finger_width {
            return Self {
                length,
                fingers: Vec::new(),
            };
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let mut segments = (zone / params.finger_width + TOLERANCE).floor() as usize;
        if segments % 2 == 0 {
            segments -= 1;
        }
        #[allow(clippy::cast_precision_loss)]
        let used = segments as f64 * params.finger_width;
        let start = clearance + (zone - used) * 0.5;

        let fingers = (0..segments)
            .step_by(2)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let a = start + i as f64 * params.finger_width;
                (a, a + params.finger_width)
            })
            .collect();
        Self { length, fingers }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fingers.is_empty()
    }

    /// Finger intervals widened by half the kerf on each side (tab edges).
    #[must_use]
    pub fn tab_intervals(&self, kerf: f64) -> Vec<(f64, f64)> {
        self.fingers
            .iter()
            .map(|&(a, b)| (a - kerf * 0.5, b + kerf * 0.5))
            .collect()
    }

    /// Finger intervals narrowed by half the kerf on each side (slot edges
    /// and slot holes).
    #[must_use]
    pub fn slot_intervals(&self, kerf: f64) -> Vec<(f64, f64)> {
        self.fingers
            .iter()
            .map(|&(a, b)| (a + kerf * 0.5, b - kerf * 0.5))
            .filter(|(a, b)| b - a > TOLERANCE)
            .collect()
    }
}

/// Generates the zig-zag path of one finger-jointed edge.
///
/// The path runs from `start` to `end` along the edge's baseline. A tab
/// edge pushes each finger outward (to the right of the travel direction,
/// which is the outside of a counter-clockwise outline) by `depth`; a slot
/// edge cuts each finger inward by `depth`.
pub struct FingerJoint {
    start: Point2,
    end: Point2,
    params: FingerParams,
    depth: f64,
    tab_out: bool,
}

impl FingerJoint {
    /// Creates a generator for the edge `start`→`end`.
    ///
    /// The joint depth defaults to the material thickness.
    #[must_use]
    pub fn new(start: Point2, end: Point2, params: &FingerParams, tab_out: bool) -> Self {
        Self {
            start,
            end,
            params: *params,
            depth: params.thickness,
            tab_out,
        }
    }

    /// Overrides the joint depth (used where the mate is a different thickness).
    #[must_use]
    pub fn with_depth(mut self, depth: f64) -> Self {
        self.depth = depth;
        self
    }

    /// Finger layout for this edge.
    #[must_use]
    pub fn layout(&self) -> FingerLayout {
        FingerLayout::new((self.end - self.start).norm(), &self.params)
    }

    /// Executes the generator.
    ///
    /// The returned path starts exactly at `start`, ends exactly at `end`
    /// and contains only segments parallel or perpendicular to the edge.
    ///
    /// # Errors
    ///
    /// Returns `GeometryViolation::Degenerate` if the edge has zero length or
    /// is not axis-aligned.
    pub fn execute(&self) -> Result<Vec<Point2>> {
        let delta = self.end - self.start;
        let length = delta.norm();
        if length < TOLERANCE {
            return Err(GeometryViolation::Degenerate("zero-length joint edge".into()).into());
        }
        if delta.x.abs() > TOLERANCE && delta.y.abs() > TOLERANCE {
            return Err(
                GeometryViolation::Degenerate("joint edge is not axis-aligned".into()).into(),
            );
        }

        let dir = delta / length;
        let outward = Vector2::new(dir.y, -dir.x);
        let (offset, intervals) = if self.tab_out {
            (self.depth, self.layout().tab_intervals(self.params.kerf))
        } else {
            (-self.depth, self.layout().slot_intervals(self.params.kerf))
        };

        let mut points = Vec::with_capacity(intervals.len() * 4 + 2);
        points.push(self.start);
        for (a, b) in intervals {
            let base_a = self.start + dir * a;
            let base_b = self.start + dir * b;
            points.push(base_a);
            points.push(base_a + outward * offset);
            points.push(base_b + outward * offset);
            points.push(base_b);
        }
        points.push(self.end);
        Ok(points)
    }
}
