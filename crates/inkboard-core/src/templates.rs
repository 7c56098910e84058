//! Built-in element templates.

use crate::element::{DrawingElement, ElementKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const STICKY_PALETTE: [&str; 4] = ["#FFEB3B", "#FFCDD2", "#C5E1A5", "#BBDEFB"];
const STICKY_SIZE: f64 = 120.0;
const STICKY_PITCH: f64 = 140.0;
const TEMPLATE_ORIGIN_X: f64 = 50.0;
const TEMPLATE_ORIGIN_Y: f64 = 80.0;

/// Named template sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Template {
    StickyNotes,
    Flow,
}

impl Template {
    pub const ALL: [Template; 2] = [Template::StickyNotes, Template::Flow];

    pub fn name(self) -> &'static str {
        match self {
            Template::StickyNotes => "sticky-notes",
            Template::Flow => "flow",
        }
    }

    /// Fresh elements for this template, without z-indices.
    pub fn elements(self) -> Vec<DrawingElement> {
        match self {
            Template::StickyNotes => sticky_notes(),
            Template::Flow => flow(),
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Template {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::ALL
            .into_iter()
            .find(|template| template.name() == s)
            .ok_or_else(|| format!("unknown template '{s}'"))
    }
}

fn sticky_notes() -> Vec<DrawingElement> {
    STICKY_PALETTE
        .iter()
        .enumerate()
        .map(|(index, color)| {
            DrawingElement::new(
                ElementKind::Rectangle,
                TEMPLATE_ORIGIN_X + index as f64 * STICKY_PITCH,
                TEMPLATE_ORIGIN_Y,
            )
            .with_size(STICKY_SIZE, STICKY_SIZE)
            .with_colors("#444", *color)
            .with_stroke_width(2.0)
            .with_text("Nota")
            .with_font_size(16.0)
        })
        .collect()
}

fn flow() -> Vec<DrawingElement> {
    let start = DrawingElement::new(ElementKind::Rectangle, 50.0, 80.0)
        .with_size(160.0, 90.0)
        .with_colors("#1976d2", "#E3F2FD")
        .with_stroke_width(2.0)
        .with_text("Início")
        .with_font_size(16.0);
    let decision = DrawingElement::new(ElementKind::Ellipse, 270.0, 80.0)
        .with_size(140.0, 90.0)
        .with_colors("#388e3c", "#E8F5E9")
        .with_stroke_width(2.0)
        .with_text("Decisão")
        .with_font_size(16.0);
    let link = DrawingElement::new(ElementKind::Arrow, 210.0, 125.0)
        .with_size(60.0, 0.0)
        .with_colors("#444", "#444")
        .with_stroke_width(3.0);
    vec![start, decision, link]
}
