//! Free text to flow diagram.
//!
//! A thin heuristic: the text is split into ordered step labels, each step becomes a box or
//! an oval laid out left to right, and successive steps are joined by arrows.

use inkboard_core::element::{DrawingElement, ElementId, ElementKind, FontStyle, FontWeight};
use inkboard_core::session::Whiteboard;

const SEPARATORS: [&str; 8] = ["->", "⇒", "➜", "→", "=>", "\r", "\n", ","];
const OVAL_KEYWORDS: [&str; 8] = [
    "início", "inicio", "start", "fim", "end", "decisão", "decision", "if",
];

const BASE_X: f64 = 80.0;
const BASE_Y: f64 = 140.0;
const PITCH_X: f64 = 220.0;
const NODE_WIDTH: f64 = 160.0;
const NODE_HEIGHT: f64 = 80.0;

/// One step of the diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramNode {
    pub label: String,
    pub kind: ElementKind,
}

/// Split `text` into labelled steps, dropping empty pieces.
pub fn parse_nodes(text: &str) -> Vec<DiagramNode> {
    let mut pieces = vec![text.to_string()];
    for separator in SEPARATORS {
        pieces = pieces
            .iter()
            .flat_map(|piece| piece.split(separator))
            .map(str::to_string)
            .collect();
    }
    pieces
        .iter()
        .map(|piece| piece.trim())
        .filter(|label| !label.is_empty())
        .map(|label| DiagramNode {
            label: label.to_string(),
            kind: classify(label),
        })
        .collect()
}

/// Terminal and decision steps are ovals; everything else is a box.
fn classify(label: &str) -> ElementKind {
    let lower = label.to_lowercase();
    if OVAL_KEYWORDS.iter().any(|keyword| lower.contains(keyword)) {
        ElementKind::Ellipse
    } else {
        ElementKind::Rectangle
    }
}

/// Lay the steps out horizontally with an arrow between each pair.
pub fn layout(nodes: &[DiagramNode]) -> Vec<DrawingElement> {
    let mut elements = Vec::with_capacity(nodes.len() * 2);
    for (index, node) in nodes.iter().enumerate() {
        let x = BASE_X + index as f64 * PITCH_X;
        let mut element = DrawingElement::new(node.kind, x, BASE_Y)
            .with_size(NODE_WIDTH, NODE_HEIGHT)
            .with_colors("#111", "#fefefe")
            .with_stroke_width(3.0)
            .with_text(node.label.as_str())
            .with_font_size(16.0);
        element.font_family = Some("Segoe UI".to_string());
        element.font_weight = Some(FontWeight::Bold);
        element.font_style = Some(FontStyle::Normal);
        elements.push(element);

        if index + 1 < nodes.len() {
            let next_x = BASE_X + (index + 1) as f64 * PITCH_X;
            let arrow = DrawingElement::new(ElementKind::Arrow, x + NODE_WIDTH, BASE_Y + NODE_HEIGHT / 2.0)
                .with_size(next_x - (x + NODE_WIDTH), 0.0)
                .with_colors("#444", "#444")
                .with_stroke_width(3.0);
            elements.push(arrow);
        }
    }
    elements
}

/// Add a diagram for `text` to the board as one undoable step. Returns the new ids.
pub fn generate(board: &mut Whiteboard, text: &str) -> Vec<ElementId> {
    let nodes = parse_nodes(text);
    if nodes.is_empty() {
        log::warn!("No diagram steps found in prompt");
        return Vec::new();
    }
    log::info!("Generating diagram with {} steps", nodes.len());
    board.add_elements(layout(&nodes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_all_separators() {
        let nodes = parse_nodes("Início -> coletar dados ⇒ validar➜ salvar → revisar => publicar\nfim, extra");
        let labels: Vec<&str> = nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Início",
                "coletar dados",
                "validar",
                "salvar",
                "revisar",
                "publicar",
                "fim",
                "extra"
            ]
        );
    }

    #[test]
    fn test_classification() {
        let nodes = parse_nodes("Start -> load -> if valid -> Decisão final -> save -> END");
        let kinds: Vec<ElementKind> = nodes.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ElementKind::Ellipse,
                ElementKind::Rectangle,
                ElementKind::Ellipse,
                ElementKind::Ellipse,
                ElementKind::Rectangle,
                ElementKind::Ellipse,
            ]
        );
    }

    #[test]
    fn test_empty_pieces_are_dropped() {
        assert!(parse_nodes(" , -> \n ").is_empty());
    }

    #[test]
    fn test_layout_geometry() {
        let elements = layout(&parse_nodes("a -> b -> c"));
        assert_eq!(elements.len(), 5);
        assert!((elements[2].x - 300.0).abs() < f64::EPSILON);
        assert!((elements[4].x - 520.0).abs() < f64::EPSILON);
        let arrow = &elements[1];
        assert_eq!(arrow.kind, ElementKind::Arrow);
        assert!((arrow.x - 240.0).abs() < f64::EPSILON);
        assert!((arrow.y - 180.0).abs() < f64::EPSILON);
        assert_eq!(arrow.width, Some(60.0));
        assert_eq!(elements[0].font_weight, Some(FontWeight::Bold));
    }

    #[test]
    fn test_generate_commits_once() {
        let mut board = Whiteboard::new();
        let ids = generate(&mut board, "start -> work -> end");
        assert_eq!(ids.len(), 5);
        assert_eq!(board.history().len(), 2);
        assert!(generate(&mut board, "  ").is_empty());
        assert_eq!(board.history().len(), 2);
    }
}
