pub mod finger_joint;
pub mod pline;
pub mod shape;

pub use finger_joint::{FingerJoint, FingerLayout, FingerParams};
pub use pline::{Pline, PlineVertex};
pub use shape::Shape;
