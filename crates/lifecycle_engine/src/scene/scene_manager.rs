//! Scene Manager - named scenes with exactly one active at a time

use std::rc::Rc;

use crate::engine::EngineError;
use crate::events::Loadable;
use crate::scene::Scene;

/// Registry of named scenes and the currently active one.
///
/// Switching unloads the active scene before loading the target, so the
/// target's entities never share a frame with the previous scene's.
#[derive(Debug, Default)]
pub struct SceneManager {
    scenes: Vec<Rc<Scene>>,
    active: Option<Rc<Scene>>,
}

impl SceneManager {
    /// Create an empty manager with no active scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `scene` under its name
    pub fn register(&mut self, scene: Rc<Scene>) -> Result<(), EngineError> {
        if self.get(scene.name()).is_some() {
            return Err(EngineError::DuplicateMember {
                container: "SceneManager",
            });
        }
        log::debug!("Registered scene '{}'", scene.name());
        self.scenes.push(scene);
        Ok(())
    }

    /// Scene registered as `name`
    pub fn get(&self, name: &str) -> Option<Rc<Scene>> {
        self.scenes.iter().find(|scene| scene.name() == name).cloned()
    }

    /// Registered scene names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.scenes.iter().map(|scene| scene.name()).collect()
    }

    /// Currently active scene
    pub fn active(&self) -> Option<&Rc<Scene>> {
        self.active.as_ref()
    }

    /// Make `name` the active scene.
    ///
    /// Unloads the current scene, then loads the target. Switching to the
    /// scene that is already active does nothing.
    pub fn switch_to(&mut self, name: &str) -> Result<Rc<Scene>, EngineError> {
        let target = self
            .get(name)
            .ok_or_else(|| EngineError::UnknownScene(name.to_string()))?;

        if let Some(current) = &self.active {
            if Rc::ptr_eq(current, &target) {
                return Ok(target);
            }
            log::info!("Leaving scene '{}'", current.name());
            current.unload()?;
        }

        log::info!("Entering scene '{}'", target.name());
        self.active = Some(Rc::clone(&target));
        target.load()?;
        Ok(target)
    }
}
