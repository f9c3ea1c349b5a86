pub mod assembly;
pub mod config;
pub mod face;
pub mod subdivision;
pub mod void_tree;

pub use assembly::{Assembly, CreateSubAssembly, SubAssembly};
pub use config::{AssemblyConfig, BoxConfig, FeetConfig, LidConfig, TabDirection};
pub use face::{FaceId, Faces};
pub use subdivision::{
    AxisCut, DividerSlab, GridSubdivide, Partition, SetDividerPosition, Subdivide, SubdivisionId,
};
pub use void_tree::{VoidId, VoidNode, VoidTree};
