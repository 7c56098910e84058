//! Inkboard Render Library
//!
//! Turns an element store into a frame. [`Scene`] is the backend-neutral display list;
//! [`RasterRenderer`] paints it on the CPU with tiny-skia and encodes PNG snapshots.

pub mod color;
pub mod raster;
mod renderer;
pub mod scene;

pub use color::parse_color;
pub use raster::{GlyphMeasure, RasterRenderer, encode_png, load_font};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError, SelectionStyle};
pub use scene::{DrawCommand, Scene, TextRun};
