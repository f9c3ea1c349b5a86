use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::Axis;

/// One of the six outer faces of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceId {
    Front,
    Back,
    Left,
    Right,
    Top,
    Bottom,
}

impl FaceId {
    pub const ALL: [FaceId; 6] = [
        FaceId::Front,
        FaceId::Back,
        FaceId::Left,
        FaceId::Right,
        FaceId::Top,
        FaceId::Bottom,
    ];

    /// Axis the face is perpendicular to.
    #[must_use]
    pub fn normal_axis(self) -> Axis {
        match self {
            FaceId::Left | FaceId::Right => Axis::X,
            FaceId::Top | FaceId::Bottom => Axis::Y,
            FaceId::Front | FaceId::Back => Axis::Z,
        }
    }

    /// `true` for the face at the maximum of its axis (right, top, front).
    #[must_use]
    pub fn is_high(self) -> bool {
        matches!(self, FaceId::Right | FaceId::Top | FaceId::Front)
    }

    /// The face at the low or high end of `axis`.
    #[must_use]
    pub fn from_axis_side(axis: Axis, high: bool) -> FaceId {
        match (axis, high) {
            (Axis::X, false) => FaceId::Left,
            (Axis::X, true) => FaceId::Right,
            (Axis::Y, false) => FaceId::Bottom,
            (Axis::Y, true) => FaceId::Top,
            (Axis::Z, false) => FaceId::Back,
            (Axis::Z, true) => FaceId::Front,
        }
    }

    /// The face across the box.
    #[must_use]
    pub fn opposite(self) -> FaceId {
        FaceId::from_axis_side(self.normal_axis(), !self.is_high())
    }

    /// Fixed precedence deciding which of two walls carries the tabs.
    #[must_use]
    pub fn wall_rank(self) -> u8 {
        match self {
            FaceId::Front | FaceId::Back => 2,
            FaceId::Left | FaceId::Right => 1,
            FaceId::Top | FaceId::Bottom => 0,
        }
    }

    fn index(self) -> usize {
        match self {
            FaceId::Front => 0,
            FaceId::Back => 1,
            FaceId::Left => 2,
            FaceId::Right => 3,
            FaceId::Top => 4,
            FaceId::Bottom => 5,
        }
    }
}

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FaceId::Front => "front",
            FaceId::Back => "back",
            FaceId::Left => "left",
            FaceId::Right => "right",
            FaceId::Top => "top",
            FaceId::Bottom => "bottom",
        };
        f.write_str(name)
    }
}

/// Solid/open state of the six faces of one box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faces {
    solid: [bool; 6],
}

impl Default for Faces {
    fn default() -> Self {
        Self::all_solid()
    }
}

impl Faces {
    /// A fully enclosed box.
    #[must_use]
    pub fn all_solid() -> Self {
        Self { solid: [true; 6] }
    }

    /// All faces solid except those listed.
    #[must_use]
    pub fn with_open(open: &[FaceId]) -> Self {
        let mut faces = Self::all_solid();
        for &face in open {
            faces.set_solid(face, false);
        }
        faces
    }

    #[must_use]
    pub fn is_solid(&self, face: FaceId) -> bool {
        self.solid[face.index()]
    }

    pub fn set_solid(&mut self, face: FaceId, solid: bool) {
        self.solid[face.index()] = solid;
    }

    /// Solid faces in [`FaceId::ALL`] order.
    pub fn solid_faces(&self) -> impl Iterator<Item = FaceId> + '_ {
        FaceId::ALL.into_iter().filter(|&f| self.is_solid(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_side_round_trip() {
        for face in FaceId::ALL {
            assert_eq!(FaceId::from_axis_side(face.normal_axis(), face.is_high()), face);
            assert_eq!(face.opposite().opposite(), face);
        }
    }

    #[test]
    fn open_faces_are_tracked() {
        let faces = Faces::with_open(&[FaceId::Top]);
        assert!(!faces.is_solid(FaceId::Top));
        assert_eq!(faces.solid_faces().count(), 5);
    }
}
