//! Text measurement.
//!
//! Geometry needs the rendered width of labels but the core has no font access, so
//! measurement is a capability handed in by the host. Renderers with real glyph metrics
//! implement [`TextMeasure`]; [`ApproxTextMeasure`] is the fallback.

use crate::element::{DrawingElement, FontWeight};

/// Font parameters relevant to measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec<'a> {
    pub size: f64,
    pub family: &'a str,
    pub weight: FontWeight,
}

impl<'a> FontSpec<'a> {
    /// Font spec for an element, using defaults for missing fields.
    pub fn of(element: &'a DrawingElement) -> Self {
        Self {
            size: element.font_size_or_default(),
            family: element.font_family.as_deref().unwrap_or("Arial"),
            weight: element.font_weight.unwrap_or_default(),
        }
    }
}

/// Measures the advance width of a single line of text.
pub trait TextMeasure {
    fn line_width(&self, line: &str, font: &FontSpec<'_>) -> f64;

    /// Width of the widest line.
    fn text_width(&self, text: &str, font: &FontSpec<'_>) -> f64 {
        text.lines()
            .map(|line| self.line_width(line, font))
            .fold(0.0, f64::max)
    }

    /// Height of a block of text, one font size per line.
    fn text_height(&self, text: &str, font: &FontSpec<'_>) -> f64 {
        line_count(text) as f64 * font.size
    }
}

/// Number of visual lines; an empty string still occupies one.
pub fn line_count(text: &str) -> usize {
    let count = text.split('\n').count();
    count.max(1)
}

/// Average glyph width heuristic, as a fraction of the font size.
const AVERAGE_CHAR_WIDTH: f64 = 0.55;
const BOLD_WIDTH_FACTOR: f64 = 1.1;

/// Estimates widths from character counts. Good enough for hit-testing without fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTextMeasure;

impl TextMeasure for ApproxTextMeasure {
    fn line_width(&self, line: &str, font: &FontSpec<'_>) -> f64 {
        let factor = match font.weight {
            FontWeight::Bold => AVERAGE_CHAR_WIDTH * BOLD_WIDTH_FACTOR,
            FontWeight::Normal => AVERAGE_CHAR_WIDTH,
        };
        line.chars().count() as f64 * font.size * factor
    }
}
