use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three box-local coordinate axes.
///
/// `X` runs along the box width, `Y` along its height and `Z` along its depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Index of the axis into `[x, y, z]` arrays.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Returns the in-plane `(u, v)` axes of a panel whose normal is `self`.
    ///
    /// Panels normal to `X` are laid out in `(Z, Y)`, normal to `Y` in
    /// `(X, Z)` and normal to `Z` in `(X, Y)`.
    #[must_use]
    pub fn panel_axes(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Z, Axis::Y),
            Axis::Y => (Axis::X, Axis::Z),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }

    /// Returns the axis that is neither `self` nor `other`.
    ///
    /// Returns `None` when both axes are the same.
    #[must_use]
    pub fn third(self, other: Axis) -> Option<Axis> {
        if self == other {
            return None;
        }
        Axis::ALL.into_iter().find(|&a| a != self && a != other)
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn third_axis() {
        assert_eq!(Axis::X.third(Axis::Z), Some(Axis::Y));
        assert_eq!(Axis::Y.third(Axis::X), Some(Axis::Z));
        assert_eq!(Axis::Z.third(Axis::Z), None);
    }

    #[test]
    fn panel_axes_exclude_normal() {
        for axis in Axis::ALL {
            let (u, v) = axis.panel_axes();
            assert_ne!(u, axis);
            assert_ne!(v, axis);
            assert_ne!(u, v);
        }
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Axis::Z).unwrap();
        assert_eq!(json, "\"z\"");
    }
}
