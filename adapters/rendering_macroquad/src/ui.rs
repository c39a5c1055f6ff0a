//! Immediate-mode UI helpers for the Macroquad rendering backend.
//!
//! This module hosts all uses of `macroquad::ui` so the rest of the adapter can
//! remain agnostic of Macroquad's UI types.

use macroquad::{
    color::{Color, WHITE},
    math::{Rect, RectOffset, Vec2},
    ui::{hash, Ui},
};
use pathgrid_rendering::PaletteButton;

const SWATCH_HEIGHT: f32 = 14.0;
const SWATCH_OUTLINE: Color = Color::new(0.55, 0.55, 0.55, 1.0);

/// Snapshot of the palette panel's layout and buttons for the current frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PaletteUiContext<'a> {
    /// Top-left corner of the panel in screen coordinates.
    pub origin: Vec2,
    /// Panel dimensions in screen space.
    pub size: Vec2,
    /// Background colour applied to the window skin.
    pub background: Color,
    /// Buttons in display order.
    pub buttons: &'a [PaletteButton],
}

/// Renders the palette panel and returns the label of the clicked button.
pub(crate) fn draw_palette_ui(ui: &mut Ui, context: PaletteUiContext<'_>) -> Option<String> {
    let mut skin = ui.default_skin();
    skin.margin = 0.0;

    let window_style = ui
        .style_builder()
        .color(context.background)
        .color_hovered(context.background)
        .color_clicked(context.background)
        .color_selected(context.background)
        .color_selected_hovered(context.background)
        .color_inactive(context.background)
        .text_color(WHITE)
        .margin(RectOffset::new(12.0, 12.0, 12.0, 12.0))
        .build();
    skin.window_style = window_style;

    let label_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(0.0, 0.0, 2.0, 8.0))
        .build();
    skin.label_style = label_style;

    let button_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .color(Color::from_rgba(70, 70, 70, 255))
        .color_hovered(Color::from_rgba(96, 96, 96, 255))
        .color_clicked(Color::from_rgba(56, 56, 56, 255))
        .margin(RectOffset::new(0.0, 0.0, 6.0, 6.0))
        .build();
    skin.button_style = button_style;

    ui.push_skin(&skin);

    let swatch_width = (context.size.x - 24.0).max(0.0);
    let mut clicked = None;
    let _ = ui.window(hash!("palette"), context.origin, context.size, |ui| {
        ui.label(None, "Tile types");
        for button in context.buttons {
            let text = if button.active {
                format!("> {}", button.label)
            } else {
                button.label.clone()
            };
            if ui.button(None, text.as_str()) {
                clicked = Some(button.label.clone());
            }

            {
                let mut canvas = ui.canvas();
                let top_left = canvas.request_space(Vec2::new(swatch_width, SWATCH_HEIGHT));
                canvas.rect(
                    Rect::new(top_left.x, top_left.y, swatch_width, SWATCH_HEIGHT),
                    SWATCH_OUTLINE,
                    swatch_color(button),
                );
            }
            ui.label(None, button.tooltip.as_str());
        }
    });

    ui.pop_skin();

    clicked
}

fn swatch_color(button: &PaletteButton) -> Color {
    Color::new(
        button.color.red,
        button.color.green,
        button.color.blue,
        button.color.alpha,
    )
}
