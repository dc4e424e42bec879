//! Lab components: pose, bounds and drawable

use std::cell::Cell;
use std::rc::{Rc, Weak};

use lifecycle_engine::prelude::*;
use nalgebra::{Point2, Vector2};

use crate::draw_system::{Canvas, DisplayLayer, DrawSystem};

/// Fired by [`Pose`] with a [`PositionChange`] payload
pub const ON_POSITION_CHANGE: &str = "onpositionchange";
/// Fired by [`Pose`] with the new orientation (`f32`, radians)
pub const ON_ORIENTATION_CHANGE: &str = "onorientationchange";
/// Fired by [`Drawable`] when it starts being drawn
pub const ON_SHOW: &str = "onshow";
/// Fired by [`Drawable`] when it stops being drawn
pub const ON_HIDE: &str = "onhide";

/// Payload of [`ON_POSITION_CHANGE`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionChange {
    /// Position after the move
    pub new: Point2<f32>,
    /// Position before the move
    pub old: Point2<f32>,
}

/// Position and orientation of an entity
pub struct Pose {
    core: ComponentCore,
    position: Cell<Point2<f32>>,
    orientation: Cell<f32>,
}

impl Pose {
    /// Create a pose at `position` facing `orientation`
    pub fn new(engine: &Rc<Engine>, position: Point2<f32>, orientation: f32) -> Result<Rc<Self>, EngineError> {
        let core = ComponentCore::new(engine, "Pose")?;
        core.emitter()
            .implement_events(&[ON_POSITION_CHANGE, ON_ORIENTATION_CHANGE])?;
        Ok(Rc::new(Self {
            core,
            position: Cell::new(position),
            orientation: Cell::new(orientation),
        }))
    }

    /// Current position
    pub fn position(&self) -> Point2<f32> {
        self.position.get()
    }

    /// Current orientation in radians
    pub fn orientation(&self) -> f32 {
        self.orientation.get()
    }

    /// Move to `position`
    pub fn set_position(&self, position: Point2<f32>) -> Result<(), EngineError> {
        let old = self.position.replace(position);
        if old == position {
            return Ok(());
        }
        self.emitter()
            .fire(ON_POSITION_CHANGE, &PositionChange { new: position, old })
    }

    /// Move by `offset`
    pub fn translate(&self, offset: Vector2<f32>) -> Result<(), EngineError> {
        self.set_position(self.position() + offset)
    }

    /// Turn to `orientation`
    pub fn set_orientation(&self, orientation: f32) -> Result<(), EngineError> {
        self.orientation.set(orientation);
        self.emitter().fire(ON_ORIENTATION_CHANGE, &orientation)
    }
}

impl Component for Pose {
    fn core(&self) -> &ComponentCore {
        &self.core
    }
}

fn sibling_pose(core: &ComponentCore) -> Result<Rc<Pose>, EngineError> {
    match core.entity() {
        Some(entity) => entity.require_component::<Pose>(),
        None => Err(EngineError::MissingComponent {
            entity: "unbound component",
            component: "Pose",
        }),
    }
}

/// Axis-aligned pick area that follows its sibling [`Pose`] while loaded
pub struct Bounds {
    core: ComponentCore,
    half_extents: Vector2<f32>,
    center: Cell<Point2<f32>>,
    follow: Listener,
}

impl Bounds {
    /// Create bounds of the given half extents
    pub fn new(engine: &Rc<Engine>, half_extents: Vector2<f32>) -> Result<Rc<Self>, EngineError> {
        let core = ComponentCore::new(engine, "Bounds")?;
        let bounds = Rc::new_cyclic(|this: &Weak<Self>| Self {
            core,
            half_extents,
            center: Cell::new(Point2::origin()),
            follow: Listener::bind(this.clone(), |bounds: &Self, event| {
                if let Some(change) = event.payload::<PositionChange>() {
                    bounds.center.set(change.new);
                }
                Ok(())
            }),
        });

        let id = bounds.id();
        let this = Rc::downgrade(&bounds);
        bounds.add_event_listener(ON_LOAD, id, &Listener::bind(this.clone(), Self::attach))?;
        bounds.add_event_listener(ON_UNLOAD, id, &Listener::bind(this, Self::detach))?;
        Ok(bounds)
    }

    /// Whether `point` lies inside the bounds
    pub fn contains(&self, point: Point2<f32>) -> bool {
        let offset = point - self.center.get();
        offset.x.abs() <= self.half_extents.x && offset.y.abs() <= self.half_extents.y
    }

    fn attach(&self, _: &Event<'_>) -> Result<(), EngineError> {
        let pose = sibling_pose(&self.core)?;
        self.center.set(pose.position());
        pose.add_event_listener(ON_POSITION_CHANGE, self.id(), &self.follow)
    }

    fn detach(&self, _: &Event<'_>) -> Result<(), EngineError> {
        if let Ok(pose) = sibling_pose(&self.core) {
            pose.remove_event_listener(ON_POSITION_CHANGE, self.id(), &self.follow);
        }
        Ok(())
    }
}

impl Component for Bounds {
    fn core(&self) -> &ComponentCore {
        &self.core
    }
}

/// Draws a label at its sibling [`Pose`] while loaded
pub struct Drawable {
    core: ComponentCore,
    draw_system: Weak<DrawSystem>,
    layer: DisplayLayer,
    label: &'static str,
    visible: Cell<bool>,
    draw: Listener,
}

impl Drawable {
    /// Create a drawable shown on `layer` of `draw_system`
    pub fn new(
        engine: &Rc<Engine>,
        draw_system: &Rc<DrawSystem>,
        layer: DisplayLayer,
        label: &'static str,
    ) -> Result<Rc<Self>, EngineError> {
        let core = ComponentCore::new(engine, "Drawable")?;
        core.emitter().implement_events(&[ON_SHOW, ON_HIDE])?;

        let drawable = Rc::new_cyclic(|this: &Weak<Self>| Self {
            core,
            draw_system: Rc::downgrade(draw_system),
            layer,
            label,
            visible: Cell::new(false),
            draw: Listener::bind(this.clone(), Self::draw),
        });

        let id = drawable.id();
        let this = Rc::downgrade(&drawable);
        let show = Listener::bind(this.clone(), |drawable: &Self, _| drawable.show());
        let hide = Listener::bind(this, |drawable: &Self, _| drawable.hide());
        drawable.add_event_listener(ON_LOAD, id, &show)?;
        drawable.add_event_listener(ON_UNLOAD, id, &hide)?;
        Ok(drawable)
    }

    /// Whether the drawable is currently drawn
    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    /// Start drawing on the display layer
    pub fn show(&self) -> Result<(), EngineError> {
        if self.visible.get() {
            return Ok(());
        }
        if let Some(draw_system) = self.draw_system.upgrade() {
            draw_system.add_event_listener(self.layer.event(), self.id(), &self.draw)?;
        }
        self.visible.set(true);
        self.emitter().fire(ON_SHOW, &())
    }

    /// Stop drawing
    pub fn hide(&self) -> Result<(), EngineError> {
        if !self.visible.get() {
            return Ok(());
        }
        self.visible.set(false);
        if let Some(draw_system) = self.draw_system.upgrade() {
            draw_system.remove_event_listener(self.layer.event(), self.id(), &self.draw);
        }
        self.emitter().fire(ON_HIDE, &())
    }

    fn draw(&self, event: &Event<'_>) -> Result<(), EngineError> {
        let Some(canvas) = event.payload::<Canvas>() else {
            return Ok(());
        };
        let pose = sibling_pose(&self.core)?;
        canvas.plot(pose.position(), self.label);
        Ok(())
    }
}

impl Component for Drawable {
    fn core(&self) -> &ComponentCore {
        &self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(engine: &Rc<Engine>) -> (Rc<Entity>, Rc<Pose>, Rc<Bounds>) {
        let entity = Entity::named(engine, "AndGate").unwrap();
        let pose = Pose::new(engine, Point2::new(100.0, 100.0), 0.0).unwrap();
        let bounds = Bounds::new(engine, Vector2::new(20.0, 10.0)).unwrap();
        entity.add_component(pose.clone()).unwrap();
        entity.add_component(bounds.clone()).unwrap();
        (entity, pose, bounds)
    }

    #[test]
    fn test_bounds_follow_pose_while_loaded() {
        let engine = Engine::new(EngineConfig::default());
        let (entity, pose, bounds) = gate(&engine);

        entity.load().unwrap();
        assert!(bounds.contains(Point2::new(110.0, 105.0)));

        pose.translate(Vector2::new(200.0, 0.0)).unwrap();
        assert!(bounds.contains(Point2::new(310.0, 105.0)));
        assert!(!bounds.contains(Point2::new(110.0, 105.0)));

        entity.unload().unwrap();
        pose.translate(Vector2::new(200.0, 0.0)).unwrap();
        assert!(bounds.contains(Point2::new(310.0, 105.0)));
    }

    #[test]
    fn test_bounds_without_pose_fails_to_load() {
        let engine = Engine::new(EngineConfig::default());
        let entity = Entity::named(&engine, "Wire").unwrap();
        entity
            .add_component(Bounds::new(&engine, Vector2::new(1.0, 1.0)).unwrap())
            .unwrap();

        let result = entity.load();
        assert!(matches!(result, Err(EngineError::MissingComponent { component: "Pose", .. })));
    }

    #[test]
    fn test_drawable_subscribes_to_layer_while_loaded() {
        let engine = Engine::new(EngineConfig::default());
        let draw_system = DrawSystem::new(&engine, 200.0, 200.0).unwrap();
        let (entity, _, _) = gate(&engine);
        let drawable = Drawable::new(&engine, &draw_system, DisplayLayer::GameEntities, "&").unwrap();
        entity.add_component(drawable.clone()).unwrap();

        entity.load().unwrap();
        assert!(drawable.is_visible());
        assert_eq!(draw_system.visible_on(DisplayLayer::GameEntities), 1);

        let frame = draw_system.render(10, 10).unwrap().to_string();
        assert!(frame.contains('&'));

        entity.destroy().unwrap();
        assert!(!drawable.is_visible());
        assert_eq!(draw_system.visible_on(DisplayLayer::GameEntities), 0);
    }
}
