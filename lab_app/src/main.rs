//! Circuit lab demo application
//!
//! Builds the menu and lab scenes, renders text frames of each, then edits the
//! lab: moves a gate, trashes another and switches scenes back and forth.

mod components;
mod draw_system;
mod lab;
mod scenes;

use std::rc::Rc;

use lifecycle_engine::foundation::logging;
use lifecycle_engine::prelude::*;
use nalgebra::{Point2, Vector2};
use thiserror::Error;

use components::Pose;
use draw_system::{DisplayLayer, DrawSystem};
use lab::Lab;
use scenes::{gates_in, SCENE_LAB, SCENE_MENU, SCENE_NONE};

const WORLD_WIDTH: f32 = 800.0;
const WORLD_HEIGHT: f32 = 600.0;
const FRAME_COLUMNS: usize = 80;
const FRAME_ROWS: usize = 24;
const GATE_SEED: u64 = 0x1ab;

/// Demo failures
#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("nothing to pick at ({x:.0}, {y:.0})")]
    NothingToPick { x: f32, y: f32 },
    #[error("scene '{0}' has no gates")]
    NoGates(&'static str),
}

struct LabDemo {
    engine: Rc<Engine>,
    draw_system: Rc<DrawSystem>,
    /// Kept alive for the lab scene's first load
    _lab: Rc<Lab>,
    scenes: SceneManager,
}

impl LabDemo {
    fn new(engine: Rc<Engine>) -> Result<Self, AppError> {
        let draw_system = DrawSystem::new(&engine, WORLD_WIDTH, WORLD_HEIGHT)?;
        let lab = Rc::new(Lab::new(Rc::clone(&engine), Rc::clone(&draw_system)));
        let scenes = scenes::build_scenes(&engine, &lab, GATE_SEED)?;
        log::info!("Registered scenes {:?}", scenes.names());
        Ok(Self {
            engine,
            draw_system,
            _lab: lab,
            scenes,
        })
    }

    fn run(&mut self) -> Result<(), AppError> {
        self.show(SCENE_MENU)?;
        let lab_scene = self.show(SCENE_LAB)?;

        let gates = gates_in(&lab_scene);
        let (Some(moved), Some(trashed)) = (gates.first(), gates.get(1)) else {
            return Err(AppError::NoGates(SCENE_LAB));
        };

        lab::move_entity(moved, Vector2::new(40.0, -20.0))?;
        log::info!("Moved {} to {:?}", moved.kind(), moved.require_component::<Pose>()?.position());

        let target = trashed.require_component::<Pose>()?.position();
        self.trash(&lab_scene, target)?;
        self.report(&lab_scene);
        self.render(&lab_scene)?;

        self.show(SCENE_NONE)?;
        log::info!(
            "Scene '{}' active, {} drawables visible",
            SCENE_NONE,
            self.visible_drawables()
        );
        let lab_scene = self.show(SCENE_LAB)?;
        self.report(&lab_scene);
        Ok(())
    }

    /// Destroy whatever the trash tool picks at `point`
    fn trash(&self, scene: &Scene, point: Point2<f32>) -> Result<(), AppError> {
        let picked = lab::pick(&gates_in(scene), point).ok_or(AppError::NothingToPick {
            x: point.x,
            y: point.y,
        })?;
        log::info!("Trashing {} {:?}", picked.kind(), picked.id());
        picked.destroy()?;
        Ok(())
    }

    fn show(&mut self, name: &str) -> Result<Rc<Scene>, AppError> {
        let scene = self.scenes.switch_to(name)?;
        log::info!("Switched to scene '{}' ({} entities)", scene.name(), scene.len());
        self.render(&scene)?;
        Ok(scene)
    }

    fn render(&self, scene: &Scene) -> Result<(), AppError> {
        let frame = self.draw_system.render(FRAME_COLUMNS, FRAME_ROWS)?;
        println!("== {} ==", scene.name());
        print!("{frame}");
        Ok(())
    }

    fn report(&self, scene: &Scene) {
        log::info!(
            "Scene '{}': {} entities, {} gates; engine tracks {} entities and {} emitters",
            scene.name(),
            scene.len(),
            gates_in(scene).len(),
            self.engine.entities().len(),
            self.engine.emitters().len()
        );
    }

    fn visible_drawables(&self) -> usize {
        DisplayLayer::ALL
            .into_iter()
            .map(|layer| self.draw_system.visible_on(layer))
            .sum()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let engine = match std::env::args().nth(1) {
        Some(path) => Engine::from_config_file(path)?,
        None => Engine::new(EngineConfig::default()),
    };
    logging::init_with_config(&engine.config().logging);

    log::info!("Starting circuit lab demo");
    let mut app = LabDemo::new(engine)?;

    match app.run() {
        Ok(()) => {
            log::info!("Circuit lab demo finished");
            Ok(())
        }
        Err(e) => {
            log::error!("Circuit lab demo failed: {}", e);
            Err(e.into())
        }
    }
}
