#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the pathgrid editor.
//!
//! This crate defines the value types and the message surface that connect
//! adapters, the authoritative tile grid, and pure systems. Adapters and
//! systems submit [`Command`] values describing desired mutations, the world
//! executes those commands via its `apply` entry point, and then broadcasts
//! [`Event`] values describing what actually happened. Rejections are reported
//! as events, never as errors.

use std::{fmt, rc::Rc, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the built-in tile type every cell starts with.
pub const EMPTY_TILE_NAME: &str = "Empty";

/// Pathing weight of the built-in empty tile type.
pub const EMPTY_TILE_WEIGHT: Weight = Weight(10.0);

/// Display color of the built-in empty tile type.
pub const EMPTY_TILE_COLOR: TileColor = TileColor::WHITE;

/// Shared handle to an immutable tile type.
///
/// Every cell painted with a type holds a clone of the same handle; the type
/// itself is never copied per cell.
pub type TileHandle = Rc<TileType>;

/// Traversal cost assigned to a tile type.
///
/// Weights are non-negative. Positive infinity marks a tile as impassable.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Weight(f64);

impl Weight {
    /// Weight of a tile that can never be traversed.
    pub const IMPASSABLE: Self = Self(f64::INFINITY);

    /// Validates and wraps a raw weight value.
    pub fn new(value: f64) -> Result<Self, WeightError> {
        if value.is_nan() {
            return Err(WeightError::NotANumber);
        }
        if value < 0.0 {
            return Err(WeightError::Negative { value });
        }
        Ok(Self(value))
    }

    /// Raw weight value.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    /// Reports whether the weight marks the tile as impassable.
    #[must_use]
    pub fn is_impassable(self) -> bool {
        self.0.is_infinite()
    }
}

impl TryFrom<f64> for Weight {
    type Error = WeightError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Weight> for f64 {
    fn from(weight: Weight) -> Self {
        weight.0
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_impassable() {
            f.write_str("Infinity")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Reasons a raw value cannot be used as a [`Weight`].
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum WeightError {
    /// The value was NaN.
    #[error("tile weight must be a number")]
    NotANumber,
    /// The value was below zero.
    #[error("tile weight must not be negative (received {value})")]
    Negative {
        /// Rejected value.
        value: f64,
    },
}

/// Opaque RGB color a tile type renders as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TileColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl TileColor {
    /// Pure white.
    pub const WHITE: Self = Self::from_rgb(0xff, 0xff, 0xff);

    /// Pure black.
    pub const BLACK: Self = Self::from_rgb(0, 0, 0);

    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

// Accepts `#rrggbb` or `#rgb`, leading `#` optional.
impl FromStr for TileColor {
    type Err = ColorParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let digits = value.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        if !digits.chars().all(|digit| digit.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigit(value.to_owned()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| ColorParseError::InvalidDigit(value.to_owned()))
        };

        match digits.len() {
            6 => Ok(Self::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            3 => {
                let expand = |nibble: u8| nibble * 0x11;
                Ok(Self::from_rgb(
                    expand(channel(0..1)?),
                    expand(channel(1..2)?),
                    expand(channel(2..3)?),
                ))
            }
            _ => Err(ColorParseError::InvalidLength(value.to_owned())),
        }
    }
}

impl TryFrom<String> for TileColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TileColor> for String {
    fn from(color: TileColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for TileColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

/// Reasons a string cannot be parsed into a [`TileColor`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ColorParseError {
    /// The string does not hold three or six hex digits.
    #[error("expected #rgb or #rrggbb, got {0:?}")]
    InvalidLength(String),
    /// The string contains a character that is not a hex digit.
    #[error("invalid hex digit in color {0:?}")]
    InvalidDigit(String),
}

/// Immutable descriptor of a paintable terrain kind.
///
/// Identity is by name: two tile types with the same name compare equal.
#[derive(Clone, Debug)]
pub struct TileType {
    name: String,
    weight: Weight,
    color: TileColor,
}

impl TileType {
    /// Creates a new tile type with the given attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, weight: Weight, color: TileColor) -> Self {
        Self {
            name: name.into(),
            weight,
            color,
        }
    }

    /// Creates the built-in empty tile type.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(EMPTY_TILE_NAME, EMPTY_TILE_WEIGHT, EMPTY_TILE_COLOR)
    }

    /// Unique name of the tile type.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pathing weight of the tile type.
    #[must_use]
    pub const fn weight(&self) -> Weight {
        self.weight
    }

    /// Color the tile type renders as.
    #[must_use]
    pub const fn color(&self) -> TileColor {
        self.color
    }

    /// Reports whether this is the built-in empty tile type.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name == EMPTY_TILE_NAME
    }
}

impl PartialEq for TileType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TileType {}

impl std::hash::Hash for TileType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Cardinal directions between neighbouring cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Toward increasing column indices.
    East,
    /// Toward increasing row indices.
    South,
    /// Toward decreasing column indices.
    West,
}

impl Direction {
    /// All directions in clockwise order starting at north.
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Positions are zero-based and measured from the upper-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Converts signed coordinates, yielding `None` for negative or oversized values.
    #[must_use]
    pub fn from_signed(column: i64, row: i64) -> Option<Self> {
        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        Some(Self::new(column, row))
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Cell one step away in the provided direction, if it does not underflow.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (column, row) = match direction {
            Direction::North => (Some(self.column), self.row.checked_sub(1)),
            Direction::East => (self.column.checked_add(1), Some(self.row)),
            Direction::South => (Some(self.column), self.row.checked_add(1)),
            Direction::West => (self.column.checked_sub(1), Some(self.row)),
        };
        Some(Self::new(column?, row?))
    }
}

/// Fixed dimensions of a tile grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridSize {
    columns: u32,
    rows: u32,
}

impl GridSize {
    /// Creates a new size descriptor.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of columns (the grid width).
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows (the grid height).
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of cells, or `None` if it does not fit in memory indices.
    #[must_use]
    pub fn area(&self) -> Option<usize> {
        let columns = usize::try_from(self.columns).ok()?;
        let rows = usize::try_from(self.rows).ok()?;
        columns.checked_mul(rows)
    }

    /// Reports whether the cell lies within the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Linear storage index `column + row * columns` of an in-bounds cell.
    ///
    /// Out-of-range cells have no index.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }

    /// Iterates every cell in row-major order, matching storage order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let columns = self.columns;
        (0..self.rows)
            .flat_map(move |row| (0..columns).map(move |column| CellCoord::new(column, row)))
    }
}

/// Logical clock value stamped on the grid by every successful mutation.
///
/// Stamps only ever increase, so a consumer that remembers the last stamp it
/// observed can detect any change with a single comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChangeStamp(u64);

impl ChangeStamp {
    /// Stamp carried by a freshly constructed grid.
    pub const ORIGIN: Self = Self(0);

    /// Stamp that immediately follows this one.
    ///
    /// Returns `None` once the counter reaches `u64::MAX`; the clock never
    /// wraps or repeats a value.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Stamp carrying the provided generation number.
    #[must_use]
    pub const fn from_generation(generation: u64) -> Self {
        Self(generation)
    }

    /// Raw generation number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Read-only snapshot of per-cell pathing weights.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightGrid {
    size: GridSize,
    weights: Vec<Weight>,
}

impl WeightGrid {
    /// Captures weights by evaluating `weight_at` for every cell in storage order.
    #[must_use]
    pub fn from_fn<F>(size: GridSize, mut weight_at: F) -> Self
    where
        F: FnMut(CellCoord) -> Weight,
    {
        let weights = size.cells().map(&mut weight_at).collect();
        Self { size, weights }
    }

    /// Dimensions of the captured grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Weight of the provided cell, or `None` when it lies outside the grid.
    #[must_use]
    pub fn weight(&self, cell: CellCoord) -> Option<Weight> {
        self.size
            .index(cell)
            .and_then(|index| self.weights.get(index).copied())
    }

    /// Reports whether the cell exists and can be traversed.
    #[must_use]
    pub fn is_passable(&self, cell: CellCoord) -> bool {
        self.weight(cell)
            .map_or(false, |weight| !weight.is_impassable())
    }

    /// In-bounds orthogonal neighbours of the cell.
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| cell.step(direction))
            .filter(move |neighbor| self.size.contains(*neighbor))
    }
}

/// Pointer location expressed in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerPosition {
    /// Horizontal offset from the canvas' left edge.
    pub x: f32,
    /// Vertical offset from the canvas' top edge.
    pub y: f32,
}

impl PointerPosition {
    /// Creates a new pointer position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Pointer activity observed over the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// The primary button went down at the position.
    Pressed(PointerPosition),
    /// The pointer moved to the position.
    Moved(PointerPosition),
    /// The primary button was released.
    Released,
    /// The pointer left the canvas.
    Left,
}

/// Commands that express all permissible grid mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Adds a tile type to the registry unless its name is taken.
    RegisterTileType {
        /// Tile type to register.
        tile: TileHandle,
    },
    /// Assigns a tile type to a single cell.
    PaintTile {
        /// Cell to paint.
        cell: CellCoord,
        /// Tile type written into the cell.
        tile: TileHandle,
    },
    /// Replaces the active tile type without consulting the registry.
    SetActiveTileType {
        /// Tile type that will be painted next.
        tile: TileHandle,
    },
    /// Activates a registered tile type by name.
    SelectActiveTileType {
        /// Name of the registered tile type to activate.
        name: String,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A tile type was added to the registry.
    TileTypeRegistered {
        /// Name of the registered tile type.
        name: String,
    },
    /// A registration was refused because the name is already taken.
    TileTypeRegistrationRejected {
        /// Name that was already registered.
        name: String,
    },
    /// A cell received a new tile type.
    TilePainted {
        /// Cell that was painted.
        cell: CellCoord,
        /// Name of the tile type now held by the cell.
        name: String,
        /// Grid stamp after the mutation.
        stamp: ChangeStamp,
    },
    /// A paint request targeted a cell outside the grid, or the change clock ran out.
    PaintRejected {
        /// Cell provided in the request.
        cell: CellCoord,
    },
    /// The active tile type changed.
    ActiveTileTypeChanged {
        /// Name of the newly active tile type.
        name: String,
    },
    /// A selection named a tile type that is not registered.
    ActiveTileTypeSelectionRejected {
        /// Name provided in the request.
        name: String,
    },
}
