//! Renderer trait abstraction.

use inkboard_core::canvas::ElementStore;
use inkboard_core::element::DrawingElement;
use inkboard_core::interaction::TextOverlay;
use inkboard_core::selection::HANDLE_SIZE;
use inkboard_core::session::Whiteboard;
use inkboard_core::text::{ApproxTextMeasure, TextMeasure};
use kurbo::Size;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Encoding failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Colors of the selection affordances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionStyle {
    /// Stroke of selected elements and of text selection outlines.
    pub highlight: Color,
    pub handle_fill: Color,
    pub handle_stroke: Color,
}

impl Default for SelectionStyle {
    fn default() -> Self {
        Self {
            highlight: Color::from_rgba8(0x4c, 0xaf, 0x50, 255),
            handle_fill: Color::from_rgba8(0x4c, 0xaf, 0x50, 255),
            handle_stroke: Color::from_rgba8(0x2e, 0x7d, 0x32, 255),
        }
    }
}

static APPROX_MEASURE: ApproxTextMeasure = ApproxTextMeasure;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The store to render.
    pub store: &'a ElementStore,
    /// Surface size in pixels.
    pub viewport_size: Size,
    pub background_color: Color,
    pub selection: SelectionStyle,
    /// Element being drawn, not yet in the store.
    pub preview: Option<&'a DrawingElement>,
    /// Inline text editor box, in screen coordinates.
    pub text_overlay: Option<TextOverlay>,
    /// Side of the resize handles in plane units.
    pub handle_size: f64,
    pub measure: &'a dyn TextMeasure,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(store: &'a ElementStore, viewport_size: Size) -> Self {
        Self {
            store,
            viewport_size,
            background_color: Color::WHITE,
            selection: SelectionStyle::default(),
            preview: None,
            text_overlay: None,
            handle_size: HANDLE_SIZE,
            measure: &APPROX_MEASURE,
        }
    }

    /// Context for everything a board currently shows: store, drawing preview, inline editor.
    pub fn for_board(board: &'a Whiteboard, viewport_size: Size) -> Self {
        Self::new(board.store(), viewport_size)
            .with_preview(board.preview())
            .with_text_overlay(board.text_overlay())
            .with_handle_size(board.config().handle_size)
            .with_measure(board.measure())
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_selection_style(mut self, style: SelectionStyle) -> Self {
        self.selection = style;
        self
    }

    pub fn with_preview(mut self, preview: Option<&'a DrawingElement>) -> Self {
        self.preview = preview;
        self
    }

    pub fn with_text_overlay(mut self, overlay: Option<TextOverlay>) -> Self {
        self.text_overlay = overlay;
        self
    }

    pub fn with_handle_size(mut self, size: f64) -> Self {
        self.handle_size = size;
        self
    }

    pub fn with_measure(mut self, measure: &'a dyn TextMeasure) -> Self {
        self.measure = measure;
        self
    }
}

/// Trait for rendering backends.
///
/// A frame is always rebuilt from scratch out of the context; backends keep no document state.
pub trait Renderer {
    /// Draw a complete frame.
    fn build_scene(&mut self, ctx: &RenderContext) -> RenderResult<()>;

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}
