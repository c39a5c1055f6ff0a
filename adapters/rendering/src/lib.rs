#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for pathgrid adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use pathgrid_core::{ChangeStamp, PointerEvent, TileColor};
use std::time::Duration;
use thiserror::Error;
use tracing::trace;

/// Side length of a tile in pixels unless configured otherwise.
pub const DEFAULT_TILE_SIZE: f32 = 10.0;

/// Frequency at which the redraw scheduler polls for changes unless configured otherwise.
pub const DEFAULT_REDRAW_HZ: u32 = 30;

const MIN_POLL_INTERVAL: Duration = Duration::from_nanos(1);

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

impl From<TileColor> for Color {
    fn from(color: TileColor) -> Self {
        Self::from_rgb_u8(color.red(), color.green(), color.blue())
    }
}

/// Decides when the scene must be repopulated from the grid.
///
/// The scheduler accumulates frame time and polls once per interval. On each
/// poll it compares the grid's change stamp with the one observed at the last
/// repaint. The very first poll always requests a repaint.
#[derive(Clone, Debug)]
pub struct RedrawScheduler {
    interval: Duration,
    accumulated: Duration,
    observed: Option<ChangeStamp>,
}

impl RedrawScheduler {
    /// Creates a scheduler polling `rate_hz` times per second.
    pub fn new(rate_hz: u32) -> Result<Self, RenderingError> {
        if rate_hz == 0 {
            return Err(RenderingError::InvalidRedrawRate { rate_hz });
        }

        Ok(Self {
            interval: (Duration::from_secs(1) / rate_hz).max(MIN_POLL_INTERVAL),
            accumulated: Duration::ZERO,
            observed: None,
        })
    }

    /// Time between two polls.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Advances the scheduler clock and reports whether a full repaint is due.
    pub fn update(&mut self, dt: Duration, stamp: ChangeStamp) -> bool {
        let Some(observed) = self.observed else {
            self.accumulated = Duration::ZERO;
            self.observed = Some(stamp);
            return true;
        };

        self.accumulated = self.accumulated.saturating_add(dt);
        if self.accumulated < self.interval {
            return false;
        }

        // Only the latest poll matters after a long stall.
        let leftover = self.accumulated.as_nanos() % self.interval.as_nanos();
        self.accumulated = Duration::from_nanos(u64::try_from(leftover).unwrap_or_default());

        if stamp > observed {
            self.observed = Some(stamp);
            true
        } else {
            false
        }
    }
}

/// Describes a rectangular tile grid that can be rendered by adapters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single tile expressed in pixels.
    pub tile_size: f32,
    /// Color used when drawing grid lines.
    pub line_color: Color,
}

impl TileGridPresentation {
    /// Creates a new tile grid descriptor.
    ///
    /// Returns an error when `tile_size` is not a positive finite number.
    pub fn new(
        columns: u32,
        rows: u32,
        tile_size: f32,
        line_color: Color,
    ) -> Result<Self, RenderingError> {
        if !tile_size.is_finite() || tile_size <= 0.0 {
            return Err(RenderingError::InvalidTileSize { tile_size });
        }

        Ok(Self {
            columns,
            rows,
            tile_size,
            line_color,
        })
    }

    /// Calculates the total width of the grid.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_size
    }

    /// Calculates the total height of the grid.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_size
    }

    /// Top-left corner of a tile in pixels.
    #[must_use]
    pub fn tile_origin(&self, column: u32, row: u32) -> Vec2 {
        Vec2::new(column as f32, row as f32) * self.tile_size
    }

    /// Number of tiles in the grid.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }
}

/// Palette button shown next to the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct PaletteButton {
    /// Name of the tile type, used as the button label.
    pub label: String,
    /// Hover text.
    pub tooltip: String,
    /// Swatch color.
    pub color: Color,
    /// Whether the button's tile type is the active brush.
    pub active: bool,
}

impl PaletteButton {
    /// Creates a new palette button descriptor.
    #[must_use]
    pub fn new(label: impl Into<String>, tooltip: impl Into<String>, color: Color) -> Self {
        Self {
            label: label.into(),
            tooltip: tooltip.into(),
            color,
            active: false,
        }
    }
}

/// Scene description combining the tile grid and the palette.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Tile grid that composes the canvas.
    pub tile_grid: TileGridPresentation,
    /// One color per tile in row-major order.
    pub tiles: Vec<Color>,
    /// Palette buttons in display order.
    pub palette: Vec<PaletteButton>,
    /// Number of full repaints performed so far.
    pub repaints: u64,
}

impl Scene {
    /// Creates a scene whose tiles all show `fill` until the first repaint.
    #[must_use]
    pub fn new(tile_grid: TileGridPresentation, fill: Color, palette: Vec<PaletteButton>) -> Self {
        Self {
            tiles: vec![fill; tile_grid.tile_count()],
            tile_grid,
            palette,
            repaints: 0,
        }
    }

    /// Replaces every tile color with the provided row-major colors.
    ///
    /// Tiles beyond the end of `colors` keep their previous color.
    pub fn repaint<I>(&mut self, colors: I)
    where
        I: IntoIterator<Item = TileColor>,
    {
        for (tile, color) in self.tiles.iter_mut().zip(colors) {
            *tile = Color::from(color);
        }
        self.repaints = self.repaints.saturating_add(1);
        trace!(repaints = self.repaints, "repainted tile grid");
    }

    /// Color of the tile at the provided location.
    #[must_use]
    pub fn tile_color(&self, column: u32, row: u32) -> Option<Color> {
        if column >= self.tile_grid.columns || row >= self.tile_grid.rows {
            return None;
        }
        let index = row as usize * self.tile_grid.columns as usize + column as usize;
        self.tiles.get(index).copied()
    }

    /// Marks the button whose label matches `name` as the active brush.
    pub fn highlight_palette(&mut self, name: &str) {
        for button in &mut self.palette {
            button.active = button.label == name;
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Pointer activity over the canvas, in the order it was observed.
    pub pointer_events: Vec<PointerEvent>,
    /// Label of the palette button clicked during the frame, if any.
    pub palette_click: Option<String>,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting pathgrid scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and may mutate the scene before it is
    /// rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum RenderingError {
    /// Tiles must have a positive, finite size.
    #[error("tile size must be a positive number of pixels (received {tile_size})")]
    InvalidTileSize {
        /// Provided size that failed validation.
        tile_size: f32,
    },
    /// The redraw scheduler cannot poll zero times per second.
    #[error("redraw rate must be positive (received {rate_hz})")]
    InvalidRedrawRate {
        /// Provided rate that failed validation.
        rate_hz: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(columns: u32, rows: u32) -> TileGridPresentation {
        TileGridPresentation::new(columns, rows, DEFAULT_TILE_SIZE, Color::from_rgb_u8(0, 0, 0))
            .expect("valid grid")
    }

    #[test]
    fn tile_grid_creation_rejects_degenerate_tile_sizes() {
        for tile_size in [0.0, -4.0, f32::NAN, f32::INFINITY] {
            let error = TileGridPresentation::new(4, 4, tile_size, Color::from_rgb_u8(0, 0, 0))
                .expect_err("degenerate tile size must be rejected");
            assert!(matches!(error, RenderingError::InvalidTileSize { .. }));
        }
    }

    #[test]
    fn tile_grid_measures_in_pixels() {
        let presentation = grid(80, 60);

        assert_eq!(presentation.width(), 800.0);
        assert_eq!(presentation.height(), 600.0);
        assert_eq!(presentation.tile_origin(3, 2), Vec2::new(30.0, 20.0));
        assert_eq!(presentation.tile_count(), 4800);
    }

    #[test]
    fn scheduler_rejects_zero_rate() {
        assert_eq!(
            RedrawScheduler::new(0).err(),
            Some(RenderingError::InvalidRedrawRate { rate_hz: 0 })
        );
    }

    #[test]
    fn scheduler_repaints_on_first_poll_and_only_after_changes() {
        let mut scheduler = RedrawScheduler::new(30).expect("valid rate");
        let tick = scheduler.interval();
        let stamp = ChangeStamp::ORIGIN;

        assert!(scheduler.update(Duration::ZERO, stamp));
        assert!(!scheduler.update(tick, stamp));

        let changed = ChangeStamp::from_generation(1);
        assert!(
            !scheduler.update(tick / 2, changed),
            "changes wait for the next poll"
        );
        assert!(scheduler.update(tick - tick / 2, changed));
        assert!(!scheduler.update(tick, changed));
    }

    #[test]
    fn scheduler_collapses_many_changes_into_one_repaint() {
        let mut scheduler = RedrawScheduler::new(10).expect("valid rate");
        let mut stamp = ChangeStamp::ORIGIN;
        assert!(scheduler.update(Duration::ZERO, stamp));

        for _ in 0..25 {
            stamp = stamp.next().expect("clock has generations left");
        }

        assert!(scheduler.update(Duration::from_secs(3), stamp));
        assert!(!scheduler.update(scheduler.interval(), stamp));
    }

    #[test]
    fn scheduler_keeps_the_partial_tick_left_after_a_stall() {
        let mut scheduler = RedrawScheduler::new(10).expect("valid rate");
        assert!(scheduler.update(Duration::ZERO, ChangeStamp::ORIGIN));

        let stall = Duration::from_secs(3600) + Duration::from_millis(50);
        assert!(!scheduler.update(stall, ChangeStamp::ORIGIN));

        let changed = ChangeStamp::from_generation(1);
        assert!(!scheduler.update(Duration::from_millis(49), changed));
        assert!(scheduler.update(Duration::from_millis(1), changed));
    }

    #[test]
    fn scheduler_accepts_rates_above_the_clock_resolution() {
        let mut scheduler = RedrawScheduler::new(u32::MAX).expect("valid rate");
        assert_eq!(scheduler.interval(), Duration::from_nanos(1));

        assert!(scheduler.update(Duration::ZERO, ChangeStamp::ORIGIN));
        assert!(scheduler.update(
            Duration::from_secs(1),
            ChangeStamp::from_generation(7)
        ));
    }

    #[test]
    fn repaint_replaces_tile_colors_and_counts() {
        let mut scene = Scene::new(grid(2, 2), Color::from_rgb_u8(255, 255, 255), Vec::new());
        let colors = [
            TileColor::BLACK,
            TileColor::WHITE,
            TileColor::from_rgb(0x9a, 0x9c, 0x9a),
            TileColor::BLACK,
        ];

        scene.repaint(colors);

        assert_eq!(scene.repaints, 1);
        assert_eq!(scene.tile_color(0, 0), Some(Color::from_rgb_u8(0, 0, 0)));
        assert_eq!(
            scene.tile_color(0, 1),
            Some(Color::from_rgb_u8(0x9a, 0x9c, 0x9a))
        );
        assert_eq!(scene.tile_color(2, 0), None);
    }

    #[test]
    fn highlight_marks_a_single_button() {
        let mut scene = Scene::new(
            grid(1, 1),
            Color::from_rgb_u8(255, 255, 255),
            vec![
                PaletteButton::new("Empty", "Weight: 10", Color::from_rgb_u8(255, 255, 255)),
                PaletteButton::new("Road", "Weight: 7.5", Color::from_rgb_u8(0x9a, 0x9c, 0x9a)),
            ],
        );

        scene.highlight_palette("Road");
        let active: Vec<_> = scene.palette.iter().map(|button| button.active).collect();
        assert_eq!(active, vec![false, true]);
    }

    #[test]
    fn lighten_moves_channels_towards_white() {
        let color = Color::from_rgb_u8(0, 0, 0).lighten(0.5);
        assert!((color.red - 0.5).abs() < f32::EPSILON);
        assert_eq!(color.alpha, 1.0);
    }
}
