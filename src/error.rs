use thiserror::Error;

use crate::math::Axis;

/// Top-level error type for the box engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoxError {
    #[error(transparent)]
    Structural(#[from] StructuralViolation),

    #[error(transparent)]
    Geometry(#[from] GeometryViolation),

    #[error(transparent)]
    State(#[from] StateViolation),
}

/// Violations of the void tree's structural rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructuralViolation {
    #[error("void not found: {0}")]
    UnknownVoid(String),

    #[error("subdivision not found: {0}")]
    UnknownSubdivision(String),

    #[error("void {0} is not a leaf")]
    NotALeaf(String),

    #[error("void {0} hosts a sub-assembly")]
    HostsSubAssembly(String),

    #[error("void {0} is reserved for a lid inset")]
    LidInset(String),

    #[error("axis {0} is blocked for subdivision")]
    AxisBlocked(Axis),

    #[error("no positions given")]
    EmptyPositions,

    #[error("position {position} is outside (0, {max}) along {axis}")]
    PositionOutOfRange { axis: Axis, position: f64, max: f64 },

    #[error("positions along {axis} are not strictly increasing")]
    PositionsNotIncreasing { axis: Axis },

    #[error("dividers at {first} and {second} along {axis} overlap")]
    DividersOverlap { axis: Axis, first: f64, second: f64 },

    #[error("grid subdivision repeats axis {0}")]
    DuplicateGridAxis(Axis),

    #[error("sub-assembly does not fit: {0}")]
    SubAssemblyDoesNotFit(String),

    #[error("invalid box configuration: {0}")]
    InvalidConfig(String),
}

/// Violations of panel geometry rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryViolation {
    #[error("panel not found: {0}")]
    UnknownPanel(String),

    #[error("corner not found: {0}")]
    UnknownCorner(String),

    #[error("edge {0} is locked by a joint")]
    EdgeLocked(String),

    #[error("extension {value} exceeds available material ({available})")]
    ExtensionExceedsMaterial { value: f64, available: f64 },

    #[error("corner {0} is not eligible for a fillet")]
    CornerNotEligible(String),

    #[error("fillet radius {radius} exceeds maximum {max}")]
    RadiusExceedsMax { radius: f64, max: f64 },

    #[error("shape reaches into joint geometry")]
    ShapeOutsideSafeArea,

    #[error("boolean result is empty")]
    EmptyResult,

    #[error("boolean result has {0} regions where one is required")]
    MultipleRegions(usize),

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Misuse of the preview protocol. These never change engine state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateViolation {
    #[error("no preview is active")]
    NoActivePreview,
}

/// Convenience type alias for results using [`BoxError`].
pub type Result<T> = std::result::Result<T, BoxError>;
