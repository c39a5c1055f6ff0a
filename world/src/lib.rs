#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative tile grid state for the pathgrid editor.
//!
//! The [`World`] owns a fixed-size grid of tile type handles, the registry of
//! paintable tile types, the active paint type and the change stamp consumed by
//! renderers. Mutations never fail loudly: out-of-range cells, duplicate names
//! and unknown selections are reported through `bool`/`Option` results, or as
//! rejection events when driven through [`apply`].

use std::{collections::BTreeMap, rc::Rc};

use pathgrid_core::{
    CellCoord, ChangeStamp, Command, Event, GridSize, TileHandle, TileType,
};
use thiserror::Error;
use tracing::debug;

/// Reasons a grid cannot be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum WorldError {
    /// One of the dimensions was zero.
    #[error("grid dimensions must be positive (received {columns}x{rows})")]
    EmptyGrid {
        /// Requested number of columns.
        columns: u32,
        /// Requested number of rows.
        rows: u32,
    },
    /// The cell count does not fit in addressable memory.
    #[error("grid of {columns}x{rows} cells is too large")]
    TooLarge {
        /// Requested number of columns.
        columns: u32,
        /// Requested number of rows.
        rows: u32,
    },
}

/// Represents the authoritative tile grid.
#[derive(Debug)]
pub struct World {
    size: GridSize,
    cells: Vec<TileHandle>,
    registry: BTreeMap<String, TileHandle>,
    empty: TileHandle,
    active: TileHandle,
    last_change: ChangeStamp,
}

impl World {
    /// Creates a grid with every cell holding the built-in empty tile type.
    ///
    /// The empty type is registered and selected as the active paint type.
    pub fn new(columns: u32, rows: u32) -> Result<Self, WorldError> {
        if columns == 0 || rows == 0 {
            return Err(WorldError::EmptyGrid { columns, rows });
        }

        let size = GridSize::new(columns, rows);
        let area = size.area().ok_or(WorldError::TooLarge { columns, rows })?;

        let empty: TileHandle = Rc::new(TileType::empty());
        let mut registry = BTreeMap::new();
        let _ = registry.insert(empty.name().to_owned(), Rc::clone(&empty));

        Ok(Self {
            size,
            cells: vec![Rc::clone(&empty); area],
            registry,
            active: Rc::clone(&empty),
            empty,
            last_change: ChangeStamp::ORIGIN,
        })
    }

    /// Fixed dimensions of the grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.size.columns()
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.size.rows()
    }

    /// Adds a tile type to the registry keyed by its name.
    ///
    /// Returns `false` and leaves the registry untouched when the name is
    /// already registered.
    pub fn register_tile_type(&mut self, tile: TileHandle) -> bool {
        if self.registry.contains_key(tile.name()) {
            debug!(name = tile.name(), "tile type name already registered");
            return false;
        }
        let _ = self.registry.insert(tile.name().to_owned(), tile);
        true
    }

    /// Looks up a registered tile type by name.
    #[must_use]
    pub fn registered_tile_type(&self, name: &str) -> Option<&TileHandle> {
        self.registry.get(name)
    }

    /// Iterates registered tile types in name order.
    pub fn registered_tile_types(&self) -> impl Iterator<Item = &TileHandle> {
        self.registry.values()
    }

    /// Built-in empty tile type every cell starts with.
    #[must_use]
    pub fn empty_tile_type(&self) -> &TileHandle {
        &self.empty
    }

    /// Assigns a tile type to a cell and refreshes the change stamp.
    ///
    /// Returns `false` without mutating anything when the cell lies outside the
    /// grid or the change clock has no generation left. Callers are expected to pass registered tile types; membership is
    /// not checked.
    pub fn set_tile_type(&mut self, cell: CellCoord, tile: TileHandle) -> bool {
        let Some(slot) = self
            .size
            .index(cell)
            .and_then(|index| self.cells.get_mut(index))
        else {
            debug!(
                column = cell.column(),
                row = cell.row(),
                "invalid index, cell lies outside the grid"
            );
            return false;
        };
        let Some(stamp) = self.last_change.next() else {
            debug!(
                column = cell.column(),
                row = cell.row(),
                "change clock exhausted, refusing write"
            );
            return false;
        };

        *slot = tile;
        self.last_change = stamp;
        true
    }

    /// Tile type currently held by the cell, or `None` when it lies outside the grid.
    #[must_use]
    pub fn tile_type(&self, cell: CellCoord) -> Option<&TileHandle> {
        self.size
            .index(cell)
            .and_then(|index| self.cells.get(index))
    }

    /// Tile type that will be painted next.
    #[must_use]
    pub fn active_tile_type(&self) -> &TileHandle {
        &self.active
    }

    /// Replaces the active tile type without consulting the registry.
    pub fn set_active_tile_type(&mut self, tile: TileHandle) {
        self.active = tile;
    }

    /// Activates the registered tile type with the provided name.
    ///
    /// Returns `false` and keeps the current selection for unknown names.
    pub fn select_active_tile_type(&mut self, name: &str) -> bool {
        match self.registry.get(name) {
            Some(tile) => {
                self.active = Rc::clone(tile);
                true
            }
            None => {
                debug!(name, "cannot activate unregistered tile type");
                false
            }
        }
    }

    /// Stamp of the most recent successful cell mutation.
    #[must_use]
    pub const fn last_change(&self) -> ChangeStamp {
        self.last_change
    }
}

/// Applies the provided command to the world and reports the outcome as events.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::RegisterTileType { tile } => {
            let name = tile.name().to_owned();
            if world.register_tile_type(tile) {
                out_events.push(Event::TileTypeRegistered { name });
            } else {
                out_events.push(Event::TileTypeRegistrationRejected { name });
            }
        }
        Command::PaintTile { cell, tile } => {
            let name = tile.name().to_owned();
            if world.set_tile_type(cell, tile) {
                out_events.push(Event::TilePainted {
                    cell,
                    name,
                    stamp: world.last_change(),
                });
            } else {
                out_events.push(Event::PaintRejected { cell });
            }
        }
        Command::SetActiveTileType { tile } => {
            let name = tile.name().to_owned();
            world.set_active_tile_type(tile);
            out_events.push(Event::ActiveTileTypeChanged { name });
        }
        Command::SelectActiveTileType { name } => {
            if world.select_active_tile_type(&name) {
                out_events.push(Event::ActiveTileTypeChanged { name });
            } else {
                out_events.push(Event::ActiveTileTypeSelectionRejected { name });
            }
        }
    }
}

/// Query functions that derive read-only views from the world state.
pub mod query {
    use pathgrid_core::{TileColor, WeightGrid};

    use super::World;

    /// Colors of every cell in row-major storage order.
    #[must_use]
    pub fn tile_colors(world: &World) -> Vec<TileColor> {
        world.cells.iter().map(|tile| tile.color()).collect()
    }

    /// Captures the pathing weight of every cell.
    #[must_use]
    pub fn weight_grid(world: &World) -> WeightGrid {
        WeightGrid::from_fn(world.size, |cell| {
            world
                .tile_type(cell)
                .map_or(pathgrid_core::EMPTY_TILE_WEIGHT, |tile| tile.weight())
        })
    }
}
