//! Editor configuration file support.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use pathgrid_core::{TileColor, TileType, Weight};
use serde::Deserialize;

/// Settings read from an editor TOML file. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct EditorConfig {
    /// Tile side length in pixels.
    pub(crate) tile_size: Option<u32>,
    /// Redraw polling frequency.
    pub(crate) redraw_hz: Option<u32>,
    /// Extra brushes registered after the stock ones.
    #[serde(default)]
    pub(crate) tiles: Vec<TileConfig>,
}

/// Brush declared in the configuration file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TileConfig {
    name: String,
    weight: Weight,
    color: TileColor,
}

impl TileConfig {
    pub(crate) fn to_tile_type(&self) -> TileType {
        TileType::new(self.name.clone(), self.weight, self.color)
    }
}

impl EditorConfig {
    /// Reads and parses the configuration file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read editor config {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse editor config {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid editor config toml contents")
    }
}
