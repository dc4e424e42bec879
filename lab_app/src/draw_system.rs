//! Text-mode draw system with ordered display layers

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use lifecycle_engine::events::{EventCapable, EventEmitter};
use lifecycle_engine::{Engine, EngineError};
use nalgebra::Point2;

/// Display layers, drawn back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayLayer {
    /// Design area and other backdrops
    Background,
    /// Gates, terminals and wires
    GameEntities,
    /// Spawner and tool buttons
    ToolIcons,
}

impl DisplayLayer {
    /// Draw order
    pub const ALL: [DisplayLayer; 3] = [Self::Background, Self::GameEntities, Self::ToolIcons];

    /// Event fired on the draw system when this layer is drawn
    pub const fn event(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::GameEntities => "gameentities",
            Self::ToolIcons => "toolicon",
        }
    }
}

/// World-space canvas rasterised onto a character grid
pub struct Canvas {
    world_width: f32,
    world_height: f32,
    cells: RefCell<Vec<Vec<char>>>,
}

impl Canvas {
    /// Blank canvas of `columns` x `rows` cells covering a world of the given size
    pub fn new(world_width: f32, world_height: f32, columns: usize, rows: usize) -> Self {
        Self {
            world_width,
            world_height,
            cells: RefCell::new(vec![vec![' '; columns]; rows]),
        }
    }

    /// Write `text` starting at the cell under `position`; off-canvas text is clipped
    pub fn plot(&self, position: Point2<f32>, text: &str) {
        let mut cells = self.cells.borrow_mut();
        let rows = cells.len();
        let columns = cells.first().map_or(0, Vec::len);
        if rows == 0 || columns == 0 {
            return;
        }

        let column = cell_index(position.x, self.world_width, columns);
        let row = cell_index(position.y, self.world_height, rows);
        let (Some(column), Some(row)) = (column, row) else {
            return;
        };
        for (offset, glyph) in text.chars().enumerate() {
            match cells[row].get_mut(column + offset) {
                Some(cell) => *cell = glyph,
                None => break,
            }
        }
    }

    /// Fill every cell with `glyph`
    pub fn fill(&self, glyph: char) {
        for row in self.cells.borrow_mut().iter_mut() {
            row.fill(glyph);
        }
    }
}

fn cell_index(coordinate: f32, extent: f32, cells: usize) -> Option<usize> {
    if !(0.0..extent).contains(&coordinate) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let index = (coordinate / extent * cells as f32) as usize;
    Some(index.min(cells - 1))
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.borrow().iter() {
            writeln!(f, "|{}|", row.iter().collect::<String>().trim_end())?;
        }
        Ok(())
    }
}

/// Draws visible drawables layer by layer.
///
/// Each layer is an event; drawables subscribe to their layer while shown and
/// receive the [`Canvas`] as payload.
pub struct DrawSystem {
    emitter: Rc<EventEmitter>,
    world_width: f32,
    world_height: f32,
}

impl DrawSystem {
    /// Create a draw system for a world of the given size
    pub fn new(engine: &Rc<Engine>, world_width: f32, world_height: f32) -> Result<Rc<Self>, EngineError> {
        let emitter = engine.create_emitter("DrawSystem")?;
        emitter.implement_events(&DisplayLayer::ALL.map(DisplayLayer::event))?;
        Ok(Rc::new(Self {
            emitter,
            world_width,
            world_height,
        }))
    }

    /// Number of drawables currently on `layer`
    pub fn visible_on(&self, layer: DisplayLayer) -> usize {
        self.emitter.listener_count(layer.event())
    }

    /// Draw one frame onto a `columns` x `rows` canvas
    pub fn render(&self, columns: usize, rows: usize) -> Result<Canvas, EngineError> {
        let canvas = Canvas::new(self.world_width, self.world_height, columns, rows);
        for layer in DisplayLayer::ALL {
            self.emitter.fire(layer.event(), &canvas)?;
        }
        Ok(canvas)
    }
}

impl EventCapable for DrawSystem {
    fn emitter(&self) -> &Rc<EventEmitter> {
        &self.emitter
    }
}
