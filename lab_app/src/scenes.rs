//! Scene setup for the circuit lab demo

use std::cell::RefCell;
use std::rc::Rc;

use lifecycle_engine::prelude::*;
use nalgebra::Point2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::lab::{GateKind, Lab};

/// Empty scene shown between the others
pub const SCENE_NONE: &str = "none";
/// Title menu
pub const SCENE_MENU: &str = "menu";
/// Circuit design area
pub const SCENE_LAB: &str = "lab";

/// Gates placed when the lab scene is first loaded
const STARTER_GATES: usize = 3;

/// Build the demo scenes and register them with a new manager.
///
/// The menu is populated right away. The lab scene fills itself on its first
/// load, with starter gates placed by an RNG seeded from `seed`; `lab` must
/// still be alive by then.
pub fn build_scenes(engine: &Rc<Engine>, lab: &Rc<Lab>, seed: u64) -> Result<SceneManager, EngineError> {
    let mut manager = SceneManager::default();
    manager.register(Scene::new(engine, SCENE_NONE)?)?;

    let menu = Scene::new(engine, SCENE_MENU)?;
    menu.add(&[
        lab.tool_button("CIRCUIT LAB", Point2::new(340.0, 150.0))?,
        lab.tool_button("[start]", Point2::new(360.0, 300.0))?,
        lab.tool_button("[quit]", Point2::new(360.0, 400.0))?,
    ])?;
    manager.register(menu)?;

    let lab_scene = Scene::new(engine, SCENE_LAB)?;
    let rng = RefCell::new(StdRng::seed_from_u64(seed));
    let builder = Rc::downgrade(lab);
    let populate = Listener::bind(Rc::downgrade(&lab_scene), move |scene: &Scene, _| match builder.upgrade() {
        Some(lab) => populate_lab(scene, &lab, &mut *rng.borrow_mut()),
        None => Ok(()),
    });
    lab_scene.add_event_listener(ON_INIT, lab_scene.id(), &populate)?;
    manager.register(lab_scene)?;

    Ok(manager)
}

fn populate_lab(scene: &Scene, lab: &Lab, rng: &mut impl Rng) -> Result<(), EngineError> {
    let mut entities = vec![lab.design_area(Point2::new(400.0, 300.0))?];

    for (slot, kind) in GateKind::ALL.into_iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let y = 80.0 + slot as f32 * 60.0;
        entities.push(lab.spawner_button(kind, Point2::new(20.0, y))?);
    }
    entities.push(lab.tool_button("cut", Point2::new(740.0, 80.0))?);
    entities.push(lab.tool_button("trash", Point2::new(740.0, 140.0))?);

    for _ in 0..STARTER_GATES {
        let kind = GateKind::ALL[rng.gen_range(0..GateKind::ALL.len())];
        let position = Point2::new(rng.gen_range(150.0..650.0), rng.gen_range(100.0..500.0));
        entities.push(lab.gate(kind, position)?);
    }

    log::info!("Populating scene '{}' with {} entities", scene.name(), entities.len());
    scene.add(&entities)
}

/// Gates currently in `scene`
pub fn gates_in(scene: &Scene) -> Vec<Rc<Entity>> {
    scene
        .entities()
        .into_iter()
        .filter(|entity| GateKind::ALL.iter().any(|kind| kind.entity_kind() == entity.kind()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Pose;
    use crate::draw_system::{DisplayLayer, DrawSystem};

    struct Setup {
        engine: Rc<Engine>,
        draw_system: Rc<DrawSystem>,
        _lab: Rc<Lab>,
        scenes: SceneManager,
    }

    fn setup(seed: u64) -> Setup {
        let engine = Engine::new(EngineConfig::default());
        let draw_system = DrawSystem::new(&engine, 800.0, 600.0).unwrap();
        let lab = Rc::new(Lab::new(Rc::clone(&engine), Rc::clone(&draw_system)));
        let scenes = build_scenes(&engine, &lab, seed).unwrap();
        Setup {
            engine,
            draw_system,
            _lab: lab,
            scenes,
        }
    }

    #[test]
    fn test_lab_populates_on_first_load_only() {
        let Setup {
            engine,
            draw_system,
            _lab,
            mut scenes,
        } = setup(7);
        assert_eq!(scenes.names(), vec![SCENE_NONE, SCENE_MENU, SCENE_LAB]);
        assert!(scenes.get(SCENE_LAB).unwrap().is_empty());
        // Menu buttons only
        assert_eq!(engine.entities().len(), 3);

        let lab = scenes.switch_to(SCENE_LAB).unwrap();
        assert_eq!(lab.len(), 1 + GateKind::ALL.len() + 2 + STARTER_GATES);
        assert_eq!(gates_in(&lab).len(), STARTER_GATES);
        assert_eq!(draw_system.visible_on(DisplayLayer::Background), 1);
        assert_eq!(draw_system.visible_on(DisplayLayer::GameEntities), STARTER_GATES * 4);

        scenes.switch_to(SCENE_NONE).unwrap();
        assert_eq!(draw_system.visible_on(DisplayLayer::GameEntities), 0);

        let lab = scenes.switch_to(SCENE_LAB).unwrap();
        assert_eq!(gates_in(&lab).len(), STARTER_GATES);
        assert_eq!(draw_system.visible_on(DisplayLayer::GameEntities), STARTER_GATES * 4);
    }

    #[test]
    fn test_menu_and_lab_are_exclusive() {
        let mut setup = setup(7);
        let (draw_system, scenes) = (&setup.draw_system, &mut setup.scenes);

        scenes.switch_to(SCENE_MENU).unwrap();
        assert_eq!(draw_system.visible_on(DisplayLayer::ToolIcons), 3);

        scenes.switch_to(SCENE_LAB).unwrap();
        assert!(!scenes.get(SCENE_MENU).unwrap().is_loaded());
        assert_eq!(draw_system.visible_on(DisplayLayer::ToolIcons), GateKind::ALL.len() + 2);
    }

    #[test]
    fn test_same_seed_places_same_gates() {
        let positions = |seed| {
            let mut setup = setup(seed);
            let lab = setup.scenes.switch_to(SCENE_LAB).unwrap();
            gates_in(&lab)
                .iter()
                .map(|gate| gate.require_component::<Pose>().unwrap().position())
                .collect::<Vec<_>>()
        };

        assert_eq!(positions(11), positions(11));
    }
}
