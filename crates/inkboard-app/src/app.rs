//! Board files, settings and frame export.

use crate::error::{AppError, AppResult};
use inkboard_core::config::EngineConfig;
use inkboard_core::session::Whiteboard;
use inkboard_core::tools::ToolSettings;
use inkboard_render::{RasterRenderer, RenderContext, Renderer, load_font, parse_color};
use kurbo::Size;
use peniko::Color;
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub width: u32,
    pub height: u32,
    pub background_color: Color,
    /// Font used to draw and measure text; text is skipped in exports without one.
    pub font_path: Option<PathBuf>,
    pub tools: ToolSettings,
    pub engine: EngineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
            background_color: Color::WHITE,
            font_path: None,
            tools: ToolSettings::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load tool defaults from a JSON file.
    pub fn load_tools(&mut self, path: &Path) -> AppResult<()> {
        let json = read(path)?;
        self.tools = ToolSettings::from_json(&json).map_err(|source| AppError::Settings {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    /// Load engine thresholds from a JSON file.
    pub fn load_engine(&mut self, path: &Path) -> AppResult<()> {
        let json = read(path)?;
        self.engine = serde_json::from_str(&json).map_err(|source| AppError::Settings {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    pub fn set_background(&mut self, color: &str) -> AppResult<()> {
        self.background_color =
            parse_color(color).ok_or_else(|| AppError::InvalidColor(color.to_string()))?;
        Ok(())
    }
}

/// Headless application: a board plus the settings used to export it.
pub struct App {
    config: AppConfig,
    board: Whiteboard,
    renderer: RasterRenderer,
}

impl App {
    /// Set up the renderer and an empty board. Fails if the raster surface cannot be created.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let mut renderer = RasterRenderer::new(config.width, config.height)?;
        if let Some(path) = &config.font_path {
            let font = load_font(fs::read(path).map_err(|e| AppError::io(path, e))?)?;
            renderer = renderer.with_font(font);
            log::info!("Loaded font {}", path.display());
        }
        let mut board = Whiteboard::with_settings(config.tools.clone(), config.engine);
        if let Some(measure) = renderer.glyph_measure() {
            board = board.with_measure(Box::new(measure));
        }
        Ok(Self {
            config,
            board,
            renderer,
        })
    }

    pub fn board(&self) -> &Whiteboard {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Whiteboard {
        &mut self.board
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Replace the board with a saved snapshot. History restarts from it.
    pub fn open(&mut self, path: &Path) -> AppResult<()> {
        let json = read(path)?;
        self.board.try_import_json(&json)?;
        log::info!(
            "Opened {} ({} elements)",
            path.display(),
            self.board.store().len()
        );
        Ok(())
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        let json = self.board.export_json()?;
        fs::write(path, json).map_err(|e| AppError::io(path, e))?;
        log::info!("Saved document to: {}", path.display());
        Ok(())
    }

    /// Render the current view of the board.
    pub fn render_png(&mut self) -> AppResult<Vec<u8>> {
        let size = Size::new(f64::from(self.config.width), f64::from(self.config.height));
        let ctx = RenderContext::for_board(&self.board, size).with_background(self.config.background_color);
        self.renderer.build_scene(&ctx)?;
        Ok(self.renderer.to_png()?)
    }

    pub fn export_png(&mut self, path: &Path) -> AppResult<()> {
        let png = self.render_png()?;
        fs::write(path, &png).map_err(|e| AppError::io(path, e))?;
        log::info!("PNG export complete: {} bytes", png.len());
        Ok(())
    }
}

fn read(path: &Path) -> AppResult<String> {
    fs::read_to_string(path).map_err(|e| AppError::io(path, e))
}
