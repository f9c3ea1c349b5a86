pub mod engine;
pub mod error;
pub mod geometry;
pub mod math;
pub mod model;
pub mod operations;
pub mod panels;
pub mod tessellation;

pub use engine::{generate_panels_from_scene, Action, DispatchOptions, Scene, SceneEngine};
pub use error::{BoxError, Result};
