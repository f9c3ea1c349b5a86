mod assemble;
mod classify;
mod engine;
mod select;
mod split;
mod subtract;
mod union;

pub use assemble::Region;
pub use classify::FragmentClass;
pub use select::BooleanOp;
pub use split::{EdgeFragment, PolygonSource};
pub use subtract::Subtract;
pub use union::Union;
