//! Composition root wiring the grid, the pure systems and the scene together.

use std::{rc::Rc, time::Duration};

use anyhow::{Context, Result};
use pathgrid_core::{Command, Event, TileType};
use pathgrid_rendering::{
    Color, FrameInput, PaletteButton, Presentation, RedrawScheduler, Scene, TileGridPresentation,
};
use pathgrid_system_painter::{CanvasExtent, Painter};
use pathgrid_system_palette::Palette;
use pathgrid_world::{self as world, query, World};
use tracing::info;

const WINDOW_TITLE: &str = "Pathgrid";
const GRID_LINE_COLOR: Color = Color::from_rgb_u8(0x80, 0x80, 0x80);
const CLEAR_COLOR: Color = Color::from_rgb_u8(0x20, 0x20, 0x20);

/// Resolved editor settings after merging flags and the config file.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct EditorSettings {
    pub(crate) canvas_width: u32,
    pub(crate) canvas_height: u32,
    pub(crate) tile_size: u32,
    pub(crate) redraw_hz: u32,
    pub(crate) extra_tiles: Vec<TileType>,
}

/// Owns the editor state and advances it one frame at a time.
#[derive(Debug)]
pub(crate) struct EditorSession {
    world: World,
    painter: Painter,
    palette: Palette,
    scheduler: RedrawScheduler,
    tile_size: u32,
}

impl EditorSession {
    /// Builds the grid from the settings and registers every brush.
    pub(crate) fn new(settings: EditorSettings) -> Result<Self> {
        anyhow::ensure!(settings.tile_size > 0, "tile size must be positive");

        let columns = settings.canvas_width / settings.tile_size;
        let rows = settings.canvas_height / settings.tile_size;
        let mut world = World::new(columns, rows).with_context(|| {
            format!(
                "canvas {}x{} holds no {}px tiles",
                settings.canvas_width, settings.canvas_height, settings.tile_size
            )
        })?;
        info!(
            canvas_width = settings.canvas_width,
            canvas_height = settings.canvas_height,
            columns,
            rows,
            tiles = columns as u64 * rows as u64,
            "created tile grid"
        );

        // Painting maps pointer pixels onto the grid area, which excludes any
        // remainder left over by the integer division.
        let canvas = CanvasExtent::new(
            (columns * settings.tile_size) as f32,
            (rows * settings.tile_size) as f32,
        );
        let painter = Painter::new(canvas, world.size()).context("failed to set up painter")?;
        let mut palette = Palette::new(Rc::clone(world.empty_tile_type()))
            .context("failed to set up palette")?;
        let scheduler =
            RedrawScheduler::new(settings.redraw_hz).context("failed to set up redraw timer")?;

        let mut commands = Vec::new();
        palette
            .register_defaults(&mut commands)
            .context("failed to declare default brushes")?;
        for tile in settings.extra_tiles {
            palette.register(tile, &mut commands);
        }
        let events = apply_all(&mut world, commands);
        palette.handle(&events);

        Ok(Self {
            world,
            painter,
            palette,
            scheduler,
            tile_size: settings.tile_size,
        })
    }

    /// Describes the window and initial scene for the rendering backend.
    pub(crate) fn presentation(&self) -> Result<Presentation> {
        let size = self.world.size();
        let tile_grid = TileGridPresentation::new(
            size.columns(),
            size.rows(),
            self.tile_size as f32,
            GRID_LINE_COLOR,
        )
        .context("failed to describe tile grid")?;
        let empty = Color::from(self.world.empty_tile_type().color());
        let mut scene = Scene::new(tile_grid, empty, self.palette_buttons());
        scene.highlight_palette(self.world.active_tile_type().name());

        Ok(Presentation::new(WINDOW_TITLE, CLEAR_COLOR, scene))
    }

    /// Applies one frame of input and refreshes the scene when the grid changed.
    pub(crate) fn frame(&mut self, dt: Duration, input: FrameInput, scene: &mut Scene) {
        let mut commands = Vec::new();
        if let Some(name) = input.palette_click {
            self.palette
                .select(&name, self.world.active_tile_type(), &mut commands);
            let events = apply_all(&mut self.world, commands);
            self.palette.handle(&events);
            scene.highlight_palette(self.world.active_tile_type().name());
            commands = Vec::new();
        }

        self.painter.handle(
            &input.pointer_events,
            self.world.active_tile_type(),
            &mut commands,
        );
        let events = apply_all(&mut self.world, commands);
        self.palette.handle(&events);

        if self.scheduler.update(dt, self.world.last_change()) {
            scene.repaint(query::tile_colors(&self.world));
        }
    }

    fn palette_buttons(&self) -> Vec<PaletteButton> {
        self.palette
            .entries()
            .iter()
            .map(|entry| {
                PaletteButton::new(entry.label(), entry.tooltip(), Color::from(entry.color()))
            })
            .collect()
    }
}

fn apply_all(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathgrid_core::{CellCoord, PointerEvent, PointerPosition, TileColor, Weight};

    fn settings() -> EditorSettings {
        EditorSettings {
            canvas_width: 100,
            canvas_height: 50,
            tile_size: 10,
            redraw_hz: 30,
            extra_tiles: vec![TileType::new(
                "Water",
                Weight::new(30.0).expect("valid weight"),
                TileColor::from_rgb(0x30, 0x60, 0xc0),
            )],
        }
    }

    fn click(label: &str) -> FrameInput {
        FrameInput {
            palette_click: Some(label.to_owned()),
            ..FrameInput::default()
        }
    }

    fn drag(points: &[(f32, f32)]) -> FrameInput {
        let mut pointer_events: Vec<_> = points
            .iter()
            .map(|&(x, y)| PointerEvent::Moved(PointerPosition::new(x, y)))
            .collect();
        if let Some(PointerEvent::Moved(first)) = pointer_events.first().copied() {
            pointer_events[0] = PointerEvent::Pressed(first);
        }
        pointer_events.push(PointerEvent::Released);
        FrameInput {
            pointer_events,
            ..FrameInput::default()
        }
    }

    #[test]
    fn grid_dimensions_follow_canvas_and_tile_size() {
        let session = EditorSession::new(EditorSettings {
            canvas_width: 805,
            canvas_height: 600,
            extra_tiles: Vec::new(),
            ..settings()
        })
        .expect("valid settings");

        assert_eq!(session.world.width(), 80);
        assert_eq!(session.world.height(), 60);
    }

    #[test]
    fn canvases_smaller_than_a_tile_are_rejected() {
        let error = EditorSession::new(EditorSettings {
            canvas_width: 5,
            ..settings()
        })
        .expect_err("no room for a tile");

        assert!(error.to_string().contains("holds no 10px tiles"));
        assert!(EditorSession::new(EditorSettings {
            tile_size: 0,
            ..settings()
        })
        .is_err());
    }

    #[test]
    fn palette_lists_stock_and_configured_brushes() {
        let session = EditorSession::new(settings()).expect("valid settings");
        let presentation = session.presentation().expect("valid presentation");

        let labels: Vec<_> = presentation
            .scene
            .palette
            .iter()
            .map(|button| button.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Empty", "Road", "Barrier", "Water"]);
        assert!(presentation.scene.palette[0].active);
        assert_eq!(presentation.scene.palette[3].tooltip, "Weight: 30");
        assert_eq!(presentation.scene.tile_grid.width(), 100.0);
    }

    #[test]
    fn selecting_and_dragging_paints_the_scene() {
        let mut session = EditorSession::new(settings()).expect("valid settings");
        let mut scene = session.presentation().expect("valid presentation").scene;

        session.frame(Duration::ZERO, click("Road"), &mut scene);
        assert_eq!(scene.repaints, 1, "the first poll always repaints");
        assert!(scene.palette[1].active);

        session.frame(
            Duration::from_millis(5),
            drag(&[(5.0, 5.0), (15.0, 5.0), (25.0, 15.0)]),
            &mut scene,
        );
        assert_eq!(scene.repaints, 1, "repaints wait for the next poll");

        session.frame(Duration::from_millis(40), FrameInput::default(), &mut scene);
        assert_eq!(scene.repaints, 2);

        let road = Color::from(TileColor::from_rgb(0x9a, 0x9c, 0x9a));
        assert_eq!(scene.tile_color(0, 0), Some(road));
        assert_eq!(scene.tile_color(1, 0), Some(road));
        assert_eq!(scene.tile_color(2, 1), Some(road));
        assert_eq!(
            session
                .world
                .tile_type(CellCoord::new(3, 3))
                .map(|tile| tile.name()),
            Some("Empty")
        );

        session.frame(Duration::from_millis(40), FrameInput::default(), &mut scene);
        assert_eq!(scene.repaints, 2, "idle polls do not repaint");
    }

    #[test]
    fn clicking_the_active_brush_reverts_to_empty() {
        let mut session = EditorSession::new(settings()).expect("valid settings");
        let mut scene = session.presentation().expect("valid presentation").scene;

        session.frame(Duration::ZERO, click("Water"), &mut scene);
        assert_eq!(session.world.active_tile_type().name(), "Water");

        session.frame(Duration::ZERO, click("Water"), &mut scene);
        assert!(session.world.active_tile_type().is_empty());
        assert!(scene.palette[0].active);
    }
}
