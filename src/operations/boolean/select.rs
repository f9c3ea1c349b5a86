use super::classify::FragmentClass;
use super::split::PolygonSource;

/// The type of boolean operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    Subtract,
}

/// Decision about whether to keep a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepDecision {
    Keep,
    KeepFlipped,
    Discard,
}

/// Determines whether a fragment should be kept based on its classification
/// relative to the other polygon and the boolean operation.
///
/// | Fragment | vs Other Polygon | Union   | Subtract(A-B) |
/// |----------|------------------|---------|---------------|
/// | from A   | OUTSIDE B        | keep    | keep          |
/// | from A   | INSIDE B         | discard | discard       |
/// | from A   | SHARED, same     | keep    | discard       |
/// | from A   | SHARED, opposite | discard | keep          |
/// | from B   | OUTSIDE A        | keep    | discard       |
/// | from B   | INSIDE A         | discard | keep (flip)   |
/// | from B   | SHARED           | discard | discard       |
#[allow(clippy::match_same_arms)]
#[must_use]
pub fn should_keep_fragment(
    source: PolygonSource,
    class: FragmentClass,
    op: BooleanOp,
) -> KeepDecision {
    match (source, class, op) {
        (PolygonSource::A, FragmentClass::Outside, BooleanOp::Union) => KeepDecision::Keep,
        (PolygonSource::A, FragmentClass::Outside, BooleanOp::Subtract) => KeepDecision::Keep,

        (PolygonSource::A, FragmentClass::Inside, BooleanOp::Union) => KeepDecision::Discard,
        (PolygonSource::A, FragmentClass::Inside, BooleanOp::Subtract) => KeepDecision::Discard,

        (PolygonSource::A, FragmentClass::SharedSame, BooleanOp::Union) => KeepDecision::Keep,
        (PolygonSource::A, FragmentClass::SharedSame, BooleanOp::Subtract) => {
            KeepDecision::Discard
        }

        (PolygonSource::A, FragmentClass::SharedOpposite, BooleanOp::Union) => {
            KeepDecision::Discard
        }
        (PolygonSource::A, FragmentClass::SharedOpposite, BooleanOp::Subtract) => {
            KeepDecision::Keep
        }

        (PolygonSource::B, FragmentClass::Outside, BooleanOp::Union) => KeepDecision::Keep,
        (PolygonSource::B, FragmentClass::Outside, BooleanOp::Subtract) => KeepDecision::Discard,

        (PolygonSource::B, FragmentClass::Inside, BooleanOp::Union) => KeepDecision::Discard,
        (PolygonSource::B, FragmentClass::Inside, BooleanOp::Subtract) => {
            KeepDecision::KeepFlipped
        }

        // Shared edges are represented once, by A's fragment.
        (PolygonSource::B, FragmentClass::SharedSame | FragmentClass::SharedOpposite, _) => {
            KeepDecision::Discard
        }
    }
}
