use serde::{Deserialize, Serialize};

use crate::error::{Result, StructuralViolation};
use crate::geometry::FingerParams;
use crate::math::Axis;

use super::face::FaceId;

/// Which of two mating panels a lid's joint puts the fingers on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TabDirection {
    /// The lid carries the tabs; walls are slotted.
    #[default]
    TabsOut,
    /// The walls carry the tabs; the lid is slotted.
    TabsIn,
}

/// One lid of the assembly (a face perpendicular to the assembly axis).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LidConfig {
    pub tab_direction: TabDirection,
    /// Distance the lid is sunk below the box edge, in mm. `0` is flush.
    pub inset: f64,
}

/// Feet added to the wall panels along the low-side lid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeetConfig {
    /// How far each foot reaches below the box.
    pub height: f64,
    /// Length of each foot along the edge.
    pub width: f64,
    /// Distance from the panel end to the foot.
    pub inset: f64,
}

impl Default for FeetConfig {
    fn default() -> Self {
        Self {
            height: 10.0,
            width: 20.0,
            inset: 0.0,
        }
    }
}

/// How the box goes together: which axis the lids sit on and how they mate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    pub axis: Axis,
    /// Lid at the high end of `axis`.
    pub positive_lid: LidConfig,
    /// Lid at the low end of `axis`.
    pub negative_lid: LidConfig,
    pub feet: Option<FeetConfig>,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            axis: Axis::Y,
            positive_lid: LidConfig::default(),
            negative_lid: LidConfig::default(),
            feet: None,
        }
    }
}

impl AssemblyConfig {
    /// Default assembly on `axis`.
    #[must_use]
    pub fn on_axis(axis: Axis) -> Self {
        Self {
            axis,
            ..Self::default()
        }
    }

    /// Returns the lid descriptor for `face`, or `None` if it is a wall.
    #[must_use]
    pub fn lid(&self, face: FaceId) -> Option<&LidConfig> {
        if face.normal_axis() != self.axis {
            return None;
        }
        if face.is_high() {
            Some(&self.positive_lid)
        } else {
            Some(&self.negative_lid)
        }
    }
}

/// Outer configuration of one box.
///
/// All lengths are millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxConfig {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub material_thickness: f64,
    pub finger_width: f64,
    pub finger_gap: f64,
    pub kerf: f64,
    pub assembly: AssemblyConfig,
}

impl Default for BoxConfig {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
            depth: 100.0,
            material_thickness: 3.0,
            finger_width: 10.0,
            finger_gap: 1.5,
            kerf: 0.0,
            assembly: AssemblyConfig::default(),
        }
    }
}

impl BoxConfig {
    /// Creates a config with the given outer dimensions and default joinery.
    #[must_use]
    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
            ..Self::default()
        }
    }

    /// Loads a config document.
    ///
    /// # Errors
    ///
    /// Returns `StructuralViolation::InvalidConfig` if the document does not
    /// parse or fails [`BoxConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| StructuralViolation::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Outer extent along `axis`.
    #[must_use]
    pub fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
            Axis::Z => self.depth,
        }
    }

    /// Sets the outer extent along `axis`.
    pub fn set_extent(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::X => self.width = value,
            Axis::Y => self.height = value,
            Axis::Z => self.depth = value,
        }
    }

    /// Finger parameters for this box's joints.
    #[must_use]
    pub fn finger_params(&self) -> FingerParams {
        FingerParams {
            finger_width: self.finger_width,
            thickness: self.material_thickness,
            finger_gap: self.finger_gap,
            kerf: self.kerf,
        }
    }

    /// Checks the configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `StructuralViolation::InvalidConfig` naming the first broken rule.
    pub fn validate(&self) -> Result<()> {
        let t = self.material_thickness;
        let invalid = |msg: String| -> Result<()> { Err(StructuralViolation::InvalidConfig(msg).into()) };
        if t.is_nan() || t <= 0.0 {
            return invalid(format!("material thickness {t} must be positive"));
        }
        if self.finger_width.is_nan() || self.finger_width <= 0.0 {
            return invalid(format!("finger width {} must be positive", self.finger_width));
        }
        if self.finger_gap < 0.0 {
            return invalid(format!("finger gap {} must not be negative", self.finger_gap));
        }
        if self.kerf < 0.0 || self.kerf >= self.finger_width {
            return invalid(format!("kerf {} out of range", self.kerf));
        }
        for axis in Axis::ALL {
            let extent = self.extent(axis);
            if extent.is_nan() || extent <= 2.0 * t {
                return invalid(format!("{axis} extent {extent} must exceed twice the thickness"));
            }
        }
        let lids = [self.assembly.positive_lid, self.assembly.negative_lid];
        if lids.iter().any(|lid| lid.inset < 0.0) {
            return invalid("lid inset must not be negative".into());
        }
        if let Some(feet) = self.assembly.feet {
            if feet.height <= 0.0 || feet.width <= 0.0 || feet.inset < 0.0 {
                return invalid("feet dimensions must be positive".into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(BoxConfig::default().validate().is_ok());
    }

    #[test]
    fn thin_box_is_rejected() {
        let config = BoxConfig::new(5.0, 100.0, 100.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn json_fills_missing_fields() {
        let config = BoxConfig::from_json(
            r#"{"width": 120, "material_thickness": 4,
                "assembly": {"axis": "z", "positive_lid": {"tab_direction": "tabs-in"}}}"#,
        )
        .unwrap();
        assert!((config.width - 120.0).abs() < f64::EPSILON);
        assert!((config.depth - 100.0).abs() < f64::EPSILON);
        assert_eq!(config.assembly.axis, Axis::Z);
        assert_eq!(config.assembly.positive_lid.tab_direction, TabDirection::TabsIn);
        assert_eq!(config.assembly.negative_lid.tab_direction, TabDirection::TabsOut);
    }

    #[test]
    fn malformed_json_is_invalid_config() {
        let err = BoxConfig::from_json("{\"width\": \"wide\"}").unwrap_err();
        assert!(matches!(
            err,
            crate::error::BoxError::Structural(StructuralViolation::InvalidConfig(_))
        ));
    }

    #[test]
    fn lid_lookup_follows_axis() {
        let assembly = AssemblyConfig::default();
        assert!(assembly.lid(FaceId::Top).is_some());
        assert!(assembly.lid(FaceId::Front).is_none());
    }
}
