#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure palette system that registers brushes and picks the active paint type.
//!
//! Registration is a two-step exchange with the world: the palette emits a
//! `RegisterTileType` command, and only when the matching
//! `TileTypeRegistered` event comes back does the brush appear as a palette
//! entry. Duplicate names are logged and never produce an entry.

use std::rc::Rc;

use pathgrid_core::{
    Command, Event, TileColor, TileHandle, TileType, Weight, WeightError, EMPTY_TILE_NAME,
};
use thiserror::Error;
use tracing::{info, warn};

const ROAD_WEIGHT: f64 = 7.5;
const ROAD_COLOR: TileColor = TileColor::from_rgb(0x9a, 0x9c, 0x9a);

/// Reasons a palette cannot be set up.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum PaletteError {
    /// The handle supplied as the empty brush is not the built-in empty type.
    #[error("palette requires the built-in \"Empty\" tile type, got {0:?}")]
    NotEmptyTile(String),
    /// A brush was declared with an unusable weight.
    #[error("invalid brush weight: {0}")]
    InvalidWeight(#[from] WeightError),
}

/// Selectable brush shown in the palette.
#[derive(Clone, Debug, PartialEq)]
pub struct PaletteEntry {
    tile: TileHandle,
}

impl PaletteEntry {
    /// Tile type painted by this brush.
    #[must_use]
    pub fn tile(&self) -> &TileHandle {
        &self.tile
    }

    /// Button label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.tile.name()
    }

    /// Hover text describing the brush weight.
    #[must_use]
    pub fn tooltip(&self) -> String {
        format!("Weight: {}", self.tile.weight())
    }

    /// Color of the painted tiles.
    #[must_use]
    pub fn color(&self) -> TileColor {
        self.tile.color()
    }
}

/// Palette system holding the registered brushes in creation order.
#[derive(Debug, Clone)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
    pending: Vec<TileHandle>,
}

impl Palette {
    /// Creates a palette whose first entry is the built-in empty brush.
    pub fn new(empty: TileHandle) -> Result<Self, PaletteError> {
        if !empty.is_empty() {
            return Err(PaletteError::NotEmptyTile(empty.name().to_owned()));
        }

        Ok(Self {
            entries: vec![PaletteEntry { tile: empty }],
            pending: Vec::new(),
        })
    }

    /// Requests registration of a new brush.
    pub fn register(&mut self, tile: TileType, out: &mut Vec<Command>) {
        let tile = Rc::new(tile);
        self.pending.push(Rc::clone(&tile));
        out.push(Command::RegisterTileType { tile });
    }

    /// Requests registration of the stock `Road` and `Barrier` brushes.
    pub fn register_defaults(&mut self, out: &mut Vec<Command>) -> Result<(), PaletteError> {
        self.register(
            TileType::new("Road", Weight::new(ROAD_WEIGHT)?, ROAD_COLOR),
            out,
        );
        self.register(
            TileType::new("Barrier", Weight::IMPASSABLE, TileColor::BLACK),
            out,
        );
        Ok(())
    }

    /// Consumes world events, turning confirmed registrations into entries.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TileTypeRegistered { name } => {
                    if let Some(tile) = self.take_pending(name) {
                        info!(name = name.as_str(), "created tile type");
                        self.entries.push(PaletteEntry { tile });
                    }
                }
                Event::TileTypeRegistrationRejected { name } => {
                    if self.take_pending(name).is_some() {
                        warn!(
                            name = name.as_str(),
                            "failed to create tile type, name already registered"
                        );
                    }
                }
                _ => {}
            }
        }
    }

    /// Emits the selection produced by clicking the named brush.
    ///
    /// Clicking the brush that is already active reverts to the empty brush.
    pub fn select(&self, name: &str, active: &TileHandle, out: &mut Vec<Command>) {
        let name = if active.name() == name {
            EMPTY_TILE_NAME
        } else {
            name
        };
        out.push(Command::SelectActiveTileType {
            name: name.to_owned(),
        });
    }

    /// Registered brushes in creation order.
    #[must_use]
    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    fn take_pending(&mut self, name: &str) -> Option<TileHandle> {
        let position = self.pending.iter().position(|tile| tile.name() == name)?;
        Some(self.pending.remove(position))
    }
}
