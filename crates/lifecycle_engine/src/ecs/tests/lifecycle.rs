//! Lifecycle cascades across entities, components and scenes

use std::rc::Rc;

use super::{engine, journal, only, record, Journal, Part};
use crate::ecs::Entity;
use crate::engine::EngineError;
use crate::events::{Destructible, EventCapable, Listener, Loadable, ON_DESTROY, ON_INIT, ON_LOAD, ON_UNLOAD};
use crate::scene::Scene;
use crate::Engine;

/// E with components [C1, C2] and child F with component D
struct Family {
    parent: Rc<Entity>,
    child: Rc<Entity>,
    first: Rc<Part<1>>,
    second: Rc<Part<2>>,
    nested: Rc<Part<3>>,
}

fn family(engine: &Rc<Engine>, journal: &Journal) -> Family {
    let parent = Entity::named(engine, "Parent").unwrap();
    record(&*parent, "E", journal);
    let child = Entity::named(engine, "Child").unwrap();
    record(&*child, "F", journal);

    let first = Part::<1>::recorded(engine, "C1", journal);
    let second = Part::<2>::recorded(engine, "C2", journal);
    let nested = Part::<3>::recorded(engine, "D", journal);

    parent.add_component(first.clone()).unwrap();
    parent.add_component(second.clone()).unwrap();
    child.add_component(nested.clone()).unwrap();
    parent.add_child(&child).unwrap();

    Family {
        parent,
        child,
        first,
        second,
        nested,
    }
}

#[test]
fn test_load_unload_idempotent() {
    let engine = engine();
    let journal = journal();
    let family = family(&engine, &journal);

    family.parent.load().unwrap();
    let after_first_load = journal.borrow().len();
    family.parent.load().unwrap();
    assert_eq!(journal.borrow().len(), after_first_load);

    family.parent.unload().unwrap();
    let after_first_unload = journal.borrow().len();
    family.parent.unload().unwrap();
    assert_eq!(journal.borrow().len(), after_first_unload);
}

#[test]
fn test_destroy_idempotent() {
    let engine = engine();
    let journal = journal();
    let family = family(&engine, &journal);

    family.parent.destroy().unwrap();
    let after_destroy = journal.borrow().len();
    family.parent.destroy().unwrap();
    assert_eq!(journal.borrow().len(), after_destroy);
    assert!(family.parent.is_destroyed());
}

#[test]
fn test_init_fires_once_per_object() {
    let engine = engine();
    let journal = journal();
    let family = family(&engine, &journal);

    family.parent.load().unwrap();
    family.parent.unload().unwrap();
    family.parent.reload().unwrap();
    family.parent.reload().unwrap();

    assert_eq!(only(&journal, ON_INIT), vec!["E.oninit", "C1.oninit", "C2.oninit", "F.oninit", "D.oninit"]);
}

#[test]
fn test_load_order_components_before_children() {
    let engine = engine();
    let journal = journal();
    let family = family(&engine, &journal);

    family.parent.load().unwrap();
    assert_eq!(
        *journal.borrow(),
        vec![
            "E.oninit", "C1.oninit", "C1.onload", "C2.oninit", "C2.onload", "F.oninit", "D.oninit", "D.onload",
            "F.onload", "E.onload",
        ]
    );
}

#[test]
fn test_unload_order_children_before_components() {
    let engine = engine();
    let journal = journal();
    let family = family(&engine, &journal);

    family.parent.load().unwrap();
    journal.borrow_mut().clear();
    family.parent.unload().unwrap();

    assert_eq!(
        only(&journal, ON_UNLOAD),
        vec!["D.onunload", "F.onunload", "C1.onunload", "C2.onunload", "E.onunload"]
    );
    assert!(!family.nested.is_loaded() && !family.first.is_loaded() && !family.second.is_loaded());
}

#[test]
fn test_destroy_order_children_first() {
    let engine = engine();
    let journal = journal();
    let family = family(&engine, &journal);

    family.parent.load().unwrap();
    journal.borrow_mut().clear();
    family.parent.destroy().unwrap();

    assert_eq!(
        *journal.borrow(),
        vec![
            "D.ondestroy",
            "D.onunload",
            "F.ondestroy",
            "F.onunload",
            "C1.ondestroy",
            "C1.onunload",
            "C2.ondestroy",
            "C2.onunload",
            "E.ondestroy",
            "E.onunload",
        ]
    );
    assert!(family.child.is_destroyed());
    assert!(family.nested.is_destroyed());
    assert!(!family.parent.has_child(&family.child));
}

#[test]
fn test_destroy_releases_from_repositories() {
    let engine = engine();
    let journal = journal();
    let family = family(&engine, &journal);
    assert_eq!(engine.entities().len(), 2);

    family.parent.destroy().unwrap();

    assert!(engine.entities().is_empty());
    assert!(!engine.emitters().contains(family.parent.emitter()));
    assert!(!engine.emitters().contains(family.first.emitter()));
    assert!(!engine.is_live(family.child.id()));
    assert!(!engine.is_live(family.nested.id()));
}

#[test]
fn test_destroy_purges_subscriptions_system_wide() {
    let engine = engine();
    let observed = Entity::new(&engine).unwrap();
    let watcher = Entity::new(&engine).unwrap();

    let listener = Listener::new(|_| Ok(()));
    observed.add_event_listener(ON_LOAD, watcher.id(), &listener).unwrap();
    engine
        .entities()
        .add_event_listener(crate::events::ON_STORE, watcher.id(), &listener)
        .unwrap();
    assert_eq!(observed.emitter().listener_count(ON_LOAD), 2);

    watcher.destroy().unwrap();

    // Only the observed entity's own cascade is left
    assert_eq!(observed.emitter().listener_count(ON_LOAD), 1);
    assert_eq!(engine.entities().emitter().listener_count(crate::events::ON_STORE), 0);
}

#[test]
fn test_failing_destroy_observer_still_tears_down() {
    let engine = engine();
    let journal = journal();
    let family = family(&engine, &journal);
    family.parent.load().unwrap();

    let refusing = Listener::new(|_| Err(EngineError::Handler("veto".to_string())));
    let observer = engine.register_subscriber("Observer");
    family.parent.add_event_listener(ON_DESTROY, observer, &refusing).unwrap();

    let result = family.parent.destroy();
    assert!(matches!(result, Err(EngineError::Handler(ref reason)) if reason == "veto"));

    assert!(family.parent.is_destroyed());
    assert!(!family.parent.is_loaded());
    assert!(family.child.is_destroyed() && family.nested.is_destroyed());
    assert!(!family.first.is_loaded() && !family.second.is_loaded());
    assert!(engine.entities().is_empty());
    assert!(!engine.emitters().contains(family.parent.emitter()));
    assert!(!engine.is_live(family.parent.id()));

    // Nothing left to retry
    assert!(family.parent.destroy().is_ok());
    assert!(family.parent.load().is_ok());
    assert!(!family.parent.is_loaded());
}

#[test]
fn test_end_to_end() {
    let engine = engine();
    let entity = Entity::new(&engine).unwrap();
    let component = Part::<1>::new(&engine);
    entity.add_component(component.clone()).unwrap();

    entity.load().unwrap();
    assert!(component.is_loaded());
    assert!(component.is_initialized());

    entity.destroy().unwrap();
    assert!(component.is_destroyed());
    assert!(engine.entities().find(|live| Rc::ptr_eq(live, &entity)).is_none());

    let mut enumerated = 0;
    engine.entities().for_each(|_| enumerated += 1);
    assert_eq!(enumerated, 0);
}

#[test]
fn test_scene_cascade_survives_destroy_during_load() {
    let engine = engine();
    let scene = Scene::new(&engine, "lab").unwrap();
    let first = Entity::new(&engine).unwrap();
    let second = Entity::new(&engine).unwrap();
    let third = Entity::new(&engine).unwrap();

    // Loading the first member destroys the second
    let doomed = Rc::downgrade(&second);
    let destroy_second = Listener::new(move |_| match doomed.upgrade() {
        Some(second) => second.destroy(),
        None => Ok(()),
    });
    first.add_event_listener(ON_LOAD, first.id(), &destroy_second).unwrap();

    scene.add(&[first.clone(), second.clone(), third.clone()]).unwrap();
    scene.load().unwrap();

    assert!(first.is_loaded());
    assert!(second.is_destroyed() && !second.is_loaded());
    assert!(third.is_loaded());
    assert_eq!(scene.len(), 2);
}

#[test]
fn test_scene_auto_removal_on_destroy() {
    let engine = engine();
    let scene = Scene::new(&engine, "lab").unwrap();
    let entity = Entity::new(&engine).unwrap();
    let bystander = Entity::new(&engine).unwrap();
    scene.add(&[entity.clone(), bystander]).unwrap();
    let before = scene.len();

    entity.destroy().unwrap();

    assert_eq!(scene.len(), before - 1);
    assert!(!scene.contains(&entity));
    assert!(!entity.has_event("onstore"));
    assert!(entity.has_event(ON_DESTROY));
}
