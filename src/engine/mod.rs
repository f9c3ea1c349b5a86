mod action;
pub mod registry;
mod scene;

pub use action::{Action, AssemblyTarget};
pub use registry::{OperationDescriptor, SelectionType, OPERATIONS};
pub use scene::Scene;

use tracing::debug;

use crate::error::{Result, StateViolation};
use crate::model::{BoxConfig, Faces};
use crate::panels::PanelCollection;

/// Per-call dispatch options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Apply to the preview (starting one if needed) instead of the
    /// committed scene.
    pub preview: bool,
}

impl DispatchOptions {
    pub const COMMIT: Self = Self { preview: false };
    pub const PREVIEW: Self = Self { preview: true };
}

/// Owner of the committed scene and of at most one preview.
///
/// Every action is applied to a copy of its target and swapped in only on
/// success, so a rejected action never leaves a partial change behind.
#[derive(Debug, Clone)]
pub struct SceneEngine {
    committed: Scene,
    preview: Option<Scene>,
}

impl SceneEngine {
    /// Creates an engine holding a single box.
    ///
    /// # Errors
    ///
    /// Returns `StructuralViolation::InvalidConfig` if the configuration is
    /// invalid.
    pub fn new(config: BoxConfig, faces: Faces) -> Result<Self> {
        Ok(Self::from_scene(Scene::new(config, faces)?))
    }

    #[must_use]
    pub fn from_scene(scene: Scene) -> Self {
        Self {
            committed: scene,
            preview: None,
        }
    }

    /// Applies `action` to the committed scene or, with
    /// [`DispatchOptions::PREVIEW`], to the preview.
    ///
    /// A preview dispatch without an active preview starts one from the
    /// committed scene. A committed dispatch leaves an active preview as it is.
    ///
    /// # Errors
    ///
    /// Returns the violation that rejected the action; the target is
    /// unchanged.
    pub fn dispatch(&mut self, action: &Action, options: DispatchOptions) -> Result<()> {
        debug!(action = action.kind(), preview = options.preview, "dispatch");
        let base = match (&self.preview, options.preview) {
            (Some(preview), true) => preview,
            _ => &self.committed,
        };
        let mut next = base.clone();
        if let Err(err) = next.apply(action) {
            debug!(action = action.kind(), %err, "action rejected");
            return Err(err);
        }
        if options.preview {
            self.preview = Some(next);
        } else {
            self.committed = next;
        }
        Ok(())
    }

    /// Starts a preview from the committed scene, discarding any previous one.
    pub fn start_preview(&mut self) {
        if self.preview.is_some() {
            debug!("replacing active preview");
        }
        self.preview = Some(self.committed.clone());
        debug!("preview started");
    }

    /// Makes the preview the committed scene.
    ///
    /// # Errors
    ///
    /// Returns `StateViolation::NoActivePreview` if there is no preview.
    pub fn commit_preview(&mut self) -> Result<()> {
        let preview = self.preview.take().ok_or(StateViolation::NoActivePreview)?;
        self.committed = preview;
        debug!("preview committed");
        Ok(())
    }

    /// Drops the preview.
    ///
    /// # Errors
    ///
    /// Returns `StateViolation::NoActivePreview` if there is no preview.
    pub fn discard_preview(&mut self) -> Result<()> {
        self.preview.take().ok_or(StateViolation::NoActivePreview)?;
        debug!("preview discarded");
        Ok(())
    }

    #[must_use]
    pub fn has_preview(&self) -> bool {
        self.preview.is_some()
    }

    /// The preview if one is active, else the committed scene.
    #[must_use]
    pub fn snapshot(&self) -> &Scene {
        self.preview.as_ref().unwrap_or(&self.committed)
    }

    /// The committed scene, regardless of any preview.
    #[must_use]
    pub fn main_scene(&self) -> &Scene {
        &self.committed
    }

    /// Panels of [`snapshot`](Self::snapshot).
    ///
    /// # Errors
    ///
    /// Returns an error only if the void tree is inconsistent.
    pub fn generate_panels(&self) -> Result<PanelCollection> {
        generate_panels_from_scene(self.snapshot())
    }
}

/// Synthesizes the panels of any scene without touching an engine.
///
/// # Errors
///
/// Returns an error only if the void tree is inconsistent.
pub fn generate_panels_from_scene(scene: &Scene) -> Result<PanelCollection> {
    scene.panels()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::math::Axis;

    fn engine() -> SceneEngine {
        SceneEngine::new(BoxConfig::new(100.0, 80.0, 60.0), Faces::all_solid()).unwrap()
    }

    fn split(engine: &SceneEngine, at: f64) -> Action {
        Action::AddSubdivisions {
            void_id: engine.main_scene().primary.root,
            axis: Axis::X,
            positions: vec![at],
        }
    }

    #[test]
    fn preview_dispatch_starts_a_preview() {
        let mut engine = engine();
        let action = split(&engine, 50.0);
        engine.dispatch(&action, DispatchOptions::PREVIEW).unwrap();
        assert!(engine.has_preview());
        assert_eq!(engine.generate_panels().unwrap().len(), 7);
        assert_eq!(generate_panels_from_scene(engine.main_scene()).unwrap().len(), 6);
    }

    #[test]
    fn failed_preview_dispatch_creates_nothing() {
        let mut engine = engine();
        let action = split(&engine, 500.0);
        assert!(engine.dispatch(&action, DispatchOptions::PREVIEW).is_err());
        assert!(!engine.has_preview());
    }

    #[test]
    fn commit_and_discard_need_a_preview() {
        let mut engine = engine();
        let expected = BoxError::State(StateViolation::NoActivePreview);
        assert_eq!(engine.commit_preview().unwrap_err(), expected);
        assert_eq!(engine.discard_preview().unwrap_err(), expected);
    }

    #[test]
    fn committed_dispatch_leaves_preview_alone() {
        let mut engine = engine();
        engine.start_preview();
        let action = split(&engine, 50.0);
        engine.dispatch(&action, DispatchOptions::COMMIT).unwrap();
        assert!(engine.has_preview());
        assert_eq!(engine.snapshot().panels().unwrap().len(), 6);
        assert_eq!(engine.main_scene().panels().unwrap().len(), 7);
    }
}
