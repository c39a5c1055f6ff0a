#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for the pathgrid editor.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment, so the
//! dependency is declared without its default `audio` feature.
//!
//! The canvas is drawn at the window origin without scaling: one canvas pixel
//! is one window pixel, so pointer coordinates reach the painter unchanged.
//! The palette panel sits to the right of the canvas and uses Macroquad's
//! immediate-mode UI; all UI-specific calls live inside the local `ui` module.

mod ui;

use self::ui::{draw_palette_ui, PaletteUiContext};
use anyhow::Result;
use glam::Vec2;
use macroquad::input::{
    is_key_pressed, is_mouse_button_pressed, is_mouse_button_released, mouse_position, KeyCode,
    MouseButton,
};
use macroquad::math::Vec2 as MacroquadVec2;
use pathgrid_core::{PointerEvent, PointerPosition};
use pathgrid_rendering::{
    Color, FrameInput, Presentation, RenderingBackend, Scene, TileGridPresentation,
};
use std::time::Duration;
use tracing::debug;

/// Width of the palette panel drawn to the right of the canvas.
pub const PALETTE_PANEL_WIDTH: f32 = 160.0;

const MIN_WINDOW_HEIGHT: f32 = 240.0;
const GRID_LINE_THICKNESS: f32 = 1.0;

/// Raw mouse observation for a single frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    /// Cursor position in window pixels.
    pub cursor: Vec2,
    /// Whether the primary button went down this frame.
    pub pressed: bool,
    /// Whether the primary button went up this frame.
    pub released: bool,
}

/// Translates per-frame mouse observations into canvas pointer events.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerTracker {
    last_inside: Option<Vec2>,
}

impl PointerTracker {
    /// Appends the pointer events implied by `sample` for a canvas of `extent` pixels.
    pub fn observe(&mut self, sample: PointerSample, extent: Vec2, out: &mut Vec<PointerEvent>) {
        let cursor = sample.cursor;
        let inside = cursor.x >= 0.0 && cursor.y >= 0.0 && cursor.x < extent.x && cursor.y < extent.y;

        if !inside {
            if self.last_inside.take().is_some() {
                out.push(PointerEvent::Left);
            }
            if sample.released {
                out.push(PointerEvent::Released);
            }
            return;
        }

        let position = PointerPosition::new(cursor.x, cursor.y);
        if sample.pressed {
            out.push(PointerEvent::Pressed(position));
        } else if self.last_inside != Some(cursor) {
            out.push(PointerEvent::Moved(position));
        }
        if sample.released {
            out.push(PointerEvent::Released);
        }
        self.last_inside = Some(cursor);
    }
}

/// Latches palette clicks so they are delivered with the next frame's input.
#[doc(hidden)]
#[derive(Clone, Debug, Default)]
pub struct PaletteInputState {
    click_latched: Option<String>,
}

impl PaletteInputState {
    /// Returns the latched click and clears it so the selection fires only once.
    pub fn take_click(&mut self) -> Option<String> {
        self.click_latched.take()
    }

    /// Records that a palette button was clicked this frame.
    pub fn register_click(&mut self, label: String) {
        self.click_latched = Some(label);
    }
}

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the editor loop.
    quit_requested: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let (window_width, window_height) = window_size(&scene.tile_grid);
        let mut config = macroquad::window::Conf {
            window_title,
            window_width,
            window_height,
            window_resizable: false,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = self.swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }
        debug!(window_width, window_height, "opening editor window");

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let panel_background = to_macroquad_color(clear_color.lighten(0.1));
            let mut pointer = PointerTracker::default();
            let mut palette_input = PaletteInputState::default();

            loop {
                if KeyboardShortcuts::poll().quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = gather_frame_input(&scene, &mut pointer, &mut palette_input);

                update_scene(frame_dt, frame_input, &mut scene);

                let tile_grid = scene.tile_grid;
                draw_tiles(&scene);
                draw_grid_lines(&tile_grid, to_macroquad_color(tile_grid.line_color));

                let screen_height = macroquad::window::screen_height();
                let mut palette_ui = macroquad::ui::root_ui();
                let clicked = draw_palette_ui(
                    &mut palette_ui,
                    PaletteUiContext {
                        origin: MacroquadVec2::new(tile_grid.width(), 0.0),
                        size: MacroquadVec2::new(PALETTE_PANEL_WIDTH, screen_height),
                        background: panel_background,
                        buttons: &scene.palette,
                    },
                );
                if let Some(label) = clicked {
                    palette_input.register_click(label);
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn window_size(tile_grid: &TileGridPresentation) -> (i32, i32) {
    let width = tile_grid.width() + PALETTE_PANEL_WIDTH;
    let height = tile_grid.height().max(MIN_WINDOW_HEIGHT);
    (width.ceil() as i32, height.ceil() as i32)
}

fn gather_frame_input(
    scene: &Scene,
    pointer: &mut PointerTracker,
    palette_input: &mut PaletteInputState,
) -> FrameInput {
    let (cursor_x, cursor_y) = mouse_position();
    let sample = PointerSample {
        cursor: Vec2::new(cursor_x, cursor_y),
        pressed: is_mouse_button_pressed(MouseButton::Left),
        released: is_mouse_button_released(MouseButton::Left),
    };
    let extent = Vec2::new(scene.tile_grid.width(), scene.tile_grid.height());

    let mut input = FrameInput {
        palette_click: palette_input.take_click(),
        ..FrameInput::default()
    };
    pointer.observe(sample, extent, &mut input.pointer_events);
    input
}

fn draw_tiles(scene: &Scene) {
    let tile_grid = scene.tile_grid;
    for row in 0..tile_grid.rows {
        for column in 0..tile_grid.columns {
            let Some(color) = scene.tile_color(column, row) else {
                continue;
            };
            let origin = tile_grid.tile_origin(column, row);
            macroquad::shapes::draw_rectangle(
                origin.x,
                origin.y,
                tile_grid.tile_size,
                tile_grid.tile_size,
                to_macroquad_color(color),
            );
        }
    }
}

fn draw_grid_lines(tile_grid: &TileGridPresentation, grid_color: macroquad::color::Color) {
    let width = tile_grid.width();
    let height = tile_grid.height();

    for x in interior_line_offsets(tile_grid.columns, tile_grid.tile_size) {
        macroquad::shapes::draw_line(x, 0.0, x, height, GRID_LINE_THICKNESS, grid_color);
    }

    for y in interior_line_offsets(tile_grid.rows, tile_grid.tile_size) {
        macroquad::shapes::draw_line(0.0, y, width, y, GRID_LINE_THICKNESS, grid_color);
    }
}

/// Pixel offsets of the lines separating `tiles` neighbouring tiles; the canvas edges get none.
fn interior_line_offsets(tiles: u32, tile_size: f32) -> impl Iterator<Item = f32> {
    (1..tiles).map(move |index| index as f32 * tile_size)
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
