#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure painter system that turns pointer activity into paint commands.

use pathgrid_core::{CellCoord, Command, GridSize, PointerEvent, PointerPosition, TileHandle};
use thiserror::Error;
use tracing::trace;

/// Reasons a painter cannot be wired to a canvas and grid.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum PainterError {
    /// The canvas extent is zero, negative or not finite.
    #[error("canvas extent must be positive and finite (received {width}x{height})")]
    InvalidCanvas {
        /// Provided canvas width.
        width: f32,
        /// Provided canvas height.
        height: f32,
    },
    /// The grid has no cells to paint.
    #[error("grid must contain at least one cell (received {columns}x{rows})")]
    EmptyGrid {
        /// Provided number of columns.
        columns: u32,
        /// Provided number of rows.
        rows: u32,
    },
}

/// Pixel dimensions of the canvas the grid is drawn on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasExtent {
    width: f32,
    height: f32,
}

impl CanvasExtent {
    /// Creates a new canvas extent.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Canvas width in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Canvas height in pixels.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Painter system that tracks drag state and emits paint commands.
#[derive(Debug, Clone)]
pub struct Painter {
    canvas: CanvasExtent,
    grid: GridSize,
    dragging: bool,
}

impl Painter {
    /// Wires a painter to the canvas and the grid it covers.
    pub fn new(canvas: CanvasExtent, grid: GridSize) -> Result<Self, PainterError> {
        if !canvas.is_valid() {
            return Err(PainterError::InvalidCanvas {
                width: canvas.width,
                height: canvas.height,
            });
        }
        if grid.columns() == 0 || grid.rows() == 0 {
            return Err(PainterError::EmptyGrid {
                columns: grid.columns(),
                rows: grid.rows(),
            });
        }

        Ok(Self {
            canvas,
            grid,
            dragging: false,
        })
    }

    /// Reports whether a drag is in progress.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Consumes pointer events and emits a paint command for each sample that
    /// lands on the canvas while the button is held.
    pub fn handle(&mut self, pointer: &[PointerEvent], active: &TileHandle, out: &mut Vec<Command>) {
        for event in pointer {
            match *event {
                PointerEvent::Pressed(position) => {
                    self.dragging = true;
                    self.paint_at(position, active, out);
                }
                PointerEvent::Moved(position) => {
                    if self.dragging {
                        self.paint_at(position, active, out);
                    }
                }
                PointerEvent::Released | PointerEvent::Left => {
                    self.dragging = false;
                }
            }
        }
    }

    /// Converts a canvas position into the cell beneath it.
    ///
    /// Positions that are negative or at or beyond the canvas extent map to no cell.
    #[must_use]
    pub fn cell_at(&self, position: PointerPosition) -> Option<CellCoord> {
        let column = axis_to_cell(position.x, self.canvas.width, self.grid.columns())?;
        let row = axis_to_cell(position.y, self.canvas.height, self.grid.rows())?;
        Some(CellCoord::new(column, row))
    }

    fn paint_at(&self, position: PointerPosition, active: &TileHandle, out: &mut Vec<Command>) {
        let Some(cell) = self.cell_at(position) else {
            trace!(x = position.x, y = position.y, "pointer outside canvas");
            return;
        };
        out.push(Command::PaintTile {
            cell,
            tile: TileHandle::clone(active),
        });
    }
}

fn axis_to_cell(value: f32, extent: f32, cells: u32) -> Option<u32> {
    if !(0.0..extent).contains(&value) {
        return None;
    }
    let scaled = (value / extent * cells as f32).floor();
    Some((scaled as u32).min(cells.saturating_sub(1)))
}
