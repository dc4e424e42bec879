//! Circuit lab entities

use std::rc::Rc;

use lifecycle_engine::prelude::*;
use nalgebra::{Point2, Vector2};

use crate::components::{Bounds, Drawable, Pose};
use crate::draw_system::{DisplayLayer, DrawSystem};

/// Logic gate kinds offered by the spawner buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    /// AND gate
    And,
    /// NAND gate
    Nand,
    /// OR gate
    Or,
    /// XOR gate
    Xor,
}

impl GateKind {
    /// Every gate kind, in spawner order
    pub const ALL: [GateKind; 4] = [Self::And, Self::Nand, Self::Or, Self::Xor];

    /// Entity kind label
    pub const fn entity_kind(self) -> &'static str {
        match self {
            Self::And => "AndGate",
            Self::Nand => "NandGate",
            Self::Or => "OrGate",
            Self::Xor => "XorGate",
        }
    }

    /// Glyphs drawn for the gate body
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::And => "[&]",
            Self::Nand => "[!&]",
            Self::Or => "[|]",
            Self::Xor => "[^]",
        }
    }
}

/// Half width and half height of a gate body
const GATE_HALF_EXTENTS: (f32, f32) = (30.0, 20.0);

/// Terminal offsets relative to the gate center: two inputs, one output
const TERMINAL_OFFSETS: [(f32, f32); 3] = [(-45.0, -10.0), (-45.0, 10.0), (45.0, 0.0)];

/// Shared construction context for lab entities
pub struct Lab {
    engine: Rc<Engine>,
    draw_system: Rc<DrawSystem>,
}

impl Lab {
    /// Create a lab drawing through `draw_system`
    pub fn new(engine: Rc<Engine>, draw_system: Rc<DrawSystem>) -> Self {
        Self { engine, draw_system }
    }

    /// Backdrop covering the design area
    pub fn design_area(&self, center: Point2<f32>) -> Result<Rc<Entity>, EngineError> {
        let area = Entity::named(&self.engine, "CircuitDesignArea")?;
        area.add_component(Pose::new(&self.engine, center, 0.0)?)?;
        area.add_component(Drawable::new(
            &self.engine,
            &self.draw_system,
            DisplayLayer::Background,
            "~ design area ~",
        )?)?;
        Ok(area)
    }

    /// Gate of `kind` at `position`, with its terminals as child entities
    pub fn gate(&self, kind: GateKind, position: Point2<f32>) -> Result<Rc<Entity>, EngineError> {
        let gate = Entity::named(&self.engine, kind.entity_kind())?;
        gate.add_component(Pose::new(&self.engine, position, 0.0)?)?;
        let (half_width, half_height) = GATE_HALF_EXTENTS;
        gate.add_component(Bounds::new(&self.engine, Vector2::new(half_width, half_height))?)?;
        gate.add_component(Drawable::new(
            &self.engine,
            &self.draw_system,
            DisplayLayer::GameEntities,
            kind.glyph(),
        )?)?;

        for (x, y) in TERMINAL_OFFSETS {
            gate.add_child(&self.terminal(position + Vector2::new(x, y))?)?;
        }
        log::debug!("Built {} at ({:.0}, {:.0})", kind.entity_kind(), position.x, position.y);
        Ok(gate)
    }

    /// Connection point of a gate
    pub fn terminal(&self, position: Point2<f32>) -> Result<Rc<Entity>, EngineError> {
        let terminal = Entity::named(&self.engine, "Terminal")?;
        terminal.add_component(Pose::new(&self.engine, position, 0.0)?)?;
        terminal.add_component(Drawable::new(
            &self.engine,
            &self.draw_system,
            DisplayLayer::GameEntities,
            "o",
        )?)?;
        Ok(terminal)
    }

    /// Button that spawns gates of `kind`
    pub fn spawner_button(&self, kind: GateKind, position: Point2<f32>) -> Result<Rc<Entity>, EngineError> {
        self.button("SpawnerButton", kind.glyph(), position)
    }

    /// Tool button labelled `label`
    pub fn tool_button(&self, label: &'static str, position: Point2<f32>) -> Result<Rc<Entity>, EngineError> {
        self.button("ToolButton", label, position)
    }

    fn button(&self, kind: &'static str, label: &'static str, position: Point2<f32>) -> Result<Rc<Entity>, EngineError> {
        let button = Entity::named(&self.engine, kind)?;
        button.add_component(Pose::new(&self.engine, position, 0.0)?)?;
        button.add_component(Bounds::new(&self.engine, Vector2::new(20.0, 15.0))?)?;
        button.add_component(Drawable::new(
            &self.engine,
            &self.draw_system,
            DisplayLayer::ToolIcons,
            label,
        )?)?;
        Ok(button)
    }
}

/// Move `entity` and all of its descendants by `offset`
pub fn move_entity(entity: &Entity, offset: Vector2<f32>) -> Result<(), EngineError> {
    if let Some(pose) = entity.get_component::<Pose>() {
        pose.translate(offset)?;
    }
    for child in entity.children() {
        move_entity(&child, offset)?;
    }
    Ok(())
}

/// First entity among `entities` whose bounds contain `point`
pub fn pick(entities: &[Rc<Entity>], point: Point2<f32>) -> Option<Rc<Entity>> {
    entities
        .iter()
        .find(|entity| {
            entity
                .get_component::<Bounds>()
                .is_some_and(|bounds| bounds.contains(point))
        })
        .cloned()
}
