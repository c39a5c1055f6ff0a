#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that opens the pathgrid tile editor.

mod config;
mod session;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use pathgrid_rendering::{RenderingBackend, DEFAULT_REDRAW_HZ, DEFAULT_TILE_SIZE};
use pathgrid_rendering_macroquad::MacroquadBackend;
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

use self::{
    config::{EditorConfig, TileConfig},
    session::{EditorSession, EditorSettings},
};

/// Paint weighted terrain onto a tile grid.
#[derive(Debug, Parser)]
#[command(name = "pathgrid", version)]
struct Args {
    /// Canvas width in pixels.
    #[arg(long, default_value_t = 800)]
    canvas_width: u32,
    /// Canvas height in pixels.
    #[arg(long, default_value_t = 600)]
    canvas_height: u32,
    /// Tile side length in pixels [default: 10]
    #[arg(long)]
    tile_size: Option<u32>,
    /// Redraw polling frequency in hertz [default: 30]
    #[arg(long)]
    redraw_hz: Option<u32>,
    /// TOML file declaring settings and extra tile types.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long)]
    vsync: bool,
}

impl Args {
    fn into_settings(self, file: EditorConfig) -> EditorSettings {
        EditorSettings {
            canvas_width: self.canvas_width,
            canvas_height: self.canvas_height,
            tile_size: self
                .tile_size
                .or(file.tile_size)
                .unwrap_or(DEFAULT_TILE_SIZE as u32),
            redraw_hz: self
                .redraw_hz
                .or(file.redraw_hz)
                .unwrap_or(DEFAULT_REDRAW_HZ),
            extra_tiles: file.tiles.iter().map(TileConfig::to_tile_type).collect(),
        }
    }
}

/// Builds the log filter from `RUST_LOG`-style directives, falling back to `info`.
fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives)
}

/// Entry point for the pathgrid command-line interface.
fn main() -> Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&directives))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let file = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "loading editor config");
            EditorConfig::load(path)?
        }
        None => EditorConfig::default(),
    };
    let vsync = args.vsync;
    let settings = args.into_settings(file);

    let mut session = EditorSession::new(settings)?;
    let presentation = session.presentation()?;

    MacroquadBackend::default()
        .with_vsync(vsync)
        .run(presentation, move |dt, input, scene| {
            session.frame(dt, input, scene);
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_canvas() {
        let args = Args::parse_from(["pathgrid"]);
        let settings = args.into_settings(EditorConfig::default());

        assert_eq!(settings.canvas_width, 800);
        assert_eq!(settings.canvas_height, 600);
        assert_eq!(settings.tile_size, 10);
        assert_eq!(settings.redraw_hz, 30);
        assert!(settings.extra_tiles.is_empty());
    }

    #[test]
    fn explicit_flags_override_the_config_file() {
        let file = EditorConfig {
            tile_size: Some(20),
            redraw_hz: Some(60),
            tiles: Vec::new(),
        };

        let from_file = Args::parse_from(["pathgrid"]).into_settings(file.clone());
        assert_eq!((from_file.tile_size, from_file.redraw_hz), (20, 60));

        let overridden = Args::parse_from(["pathgrid", "--tile-size", "16", "--vsync"]);
        assert!(overridden.vsync);
        let overridden = overridden.into_settings(file);
        assert_eq!((overridden.tile_size, overridden.redraw_hz), (16, 60));
    }

    fn with_filter(directives: &str, check: impl FnOnce() -> bool) -> bool {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(log_filter(directives))
            .with_writer(std::io::sink)
            .finish();
        tracing::subscriber::with_default(subscriber, check)
    }

    #[test]
    fn verbose_log_directives_are_honoured() {
        assert!(with_filter("debug", || tracing::enabled!(tracing::Level::DEBUG)));
        assert!(with_filter("trace", || tracing::enabled!(tracing::Level::TRACE)));
        assert!(!with_filter("warn", || tracing::enabled!(tracing::Level::INFO)));
    }

    #[test]
    fn missing_log_directives_default_to_info() {
        assert!(with_filter("", || tracing::enabled!(tracing::Level::INFO)));
        assert!(!with_filter("", || tracing::enabled!(tracing::Level::DEBUG)));
    }

    #[test]
    fn crate_scoped_directives_reach_their_target() {
        assert!(with_filter("pathgrid_world=trace", || {
            tracing::enabled!(target: "pathgrid_world", tracing::Level::TRACE)
        }));
    }

    #[test]
    fn args_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
