//! Backend-neutral display list.
//!
//! [`Scene::build`] turns a render context into a flat list of fill, stroke and text
//! commands in paint order. It is a pure function of the store snapshot, the view transform
//! and the transient overlays, so backends only need to know how to paint three primitives.

use crate::color::{color_or, is_invisible};
use crate::renderer::RenderContext;
use inkboard_core::element::{DrawingElement, ElementKind, FontStyle, FontWeight};
use inkboard_core::geometry::{bounds_of, rotation_transform};
use inkboard_core::interaction::TextOverlay;
use inkboard_core::selection::resize_handles;
use inkboard_core::shapes::outline_of;
use inkboard_core::text::{FontSpec, TextMeasure};
use kurbo::{Affine, BezPath, Point, Rect, Shape, Size};
use peniko::Color;

const GRID_LINE_WIDTH: f64 = 0.5;
const HANDLE_STROKE_WIDTH: f64 = 1.0;
/// Extra stroke width of selected elements.
const SELECTED_STROKE_BONUS: f64 = 2.0;
/// Padding of the outline around a selected text element.
const TEXT_OUTLINE_PADDING: f64 = 2.0;
/// Baseline of a label line, as a fraction of the font size below the line top.
const LABEL_BASELINE: f64 = 0.8;
const OVERLAY_TEXT_INSET: f64 = 4.0;
const CARET_WIDTH: f64 = 1.0;

fn grid_color() -> Color {
    Color::from_rgba8(200, 200, 200, 100)
}

/// One line of text to paint. `origin` is the left end of the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub origin: Point,
    pub size: f64,
    pub family: String,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub color: Color,
    pub transform: Affine,
}

/// A single paint operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Fill {
        path: BezPath,
        transform: Affine,
        color: Color,
    },
    Stroke {
        path: BezPath,
        transform: Affine,
        color: Color,
        width: f64,
    },
    Text(TextRun),
}

/// A complete frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    size: Size,
    background: Color,
    commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Build the display list for a frame.
    pub fn build(ctx: &RenderContext) -> Self {
        let mut builder = SceneBuilder {
            ctx,
            view: ctx.store.camera().transform(),
            commands: Vec::new(),
        };
        builder.grid();
        let editing = ctx.text_overlay.as_ref().map(|overlay| overlay.element_id.as_str());
        for element in ctx.store.ordered() {
            let skip_text = editing == Some(element.id.as_str());
            builder.element(element, element.is_selected, skip_text);
        }
        if let Some(preview) = ctx.preview {
            builder.element(preview, false, false);
        }
        builder.handles();
        if let Some(overlay) = &ctx.text_overlay {
            builder.overlay(overlay);
        }
        Self {
            size: ctx.viewport_size,
            background: ctx.background_color,
            commands: builder.commands,
        }
    }
}

struct SceneBuilder<'a, 'b> {
    ctx: &'b RenderContext<'a>,
    view: Affine,
    commands: Vec<DrawCommand>,
}

impl SceneBuilder<'_, '_> {
    fn fill(&mut self, path: BezPath, transform: Affine, color: Color) {
        if !is_invisible(color) {
            self.commands.push(DrawCommand::Fill {
                path,
                transform,
                color,
            });
        }
    }

    fn stroke(&mut self, path: BezPath, transform: Affine, color: Color, width: f64) {
        if !is_invisible(color) && width > 0.0 {
            self.commands.push(DrawCommand::Stroke {
                path,
                transform,
                color,
                width,
            });
        }
    }

    /// Grid lines over the visible plane area while snapping is on.
    fn grid(&mut self) {
        let store = self.ctx.store;
        if !store.snap_to_grid() {
            return;
        }
        let grid_size = store.grid_size();
        let size = self.ctx.viewport_size;
        let inv = self.view.inverse();
        let top_left = inv * Point::ZERO;
        let bottom_right = inv * Point::new(size.width, size.height);
        let start_x = (top_left.x / grid_size).floor() * grid_size;
        let start_y = (top_left.y / grid_size).floor() * grid_size;
        let end_x = (bottom_right.x / grid_size).ceil() * grid_size;
        let end_y = (bottom_right.y / grid_size).ceil() * grid_size;

        let mut path = BezPath::new();
        let mut x = start_x;
        while x <= end_x {
            path.move_to((x, start_y));
            path.line_to((x, end_y));
            x += grid_size;
        }
        let mut y = start_y;
        while y <= end_y {
            path.move_to((start_x, y));
            path.line_to((end_x, y));
            y += grid_size;
        }
        self.stroke(path, self.view, grid_color(), GRID_LINE_WIDTH);
    }

    fn element(&mut self, element: &DrawingElement, selected: bool, skip_text: bool) {
        let transform = self.view * rotation_transform(element);
        let highlight = self.ctx.selection.highlight;
        let (stroke_color, stroke_width) = if selected {
            (highlight, element.stroke_width + SELECTED_STROKE_BONUS)
        } else {
            (color_or(&element.stroke_color, Color::BLACK), element.stroke_width)
        };

        if element.kind == ElementKind::Text {
            if !skip_text {
                self.text_lines(element, transform, false);
            }
            if selected {
                let bounds = bounds_of(element, self.ctx.measure);
                let outline = Rect::new(
                    element.x - TEXT_OUTLINE_PADDING,
                    element.y,
                    element.x + bounds.width + TEXT_OUTLINE_PADDING,
                    element.y + bounds.height + 2.0 * TEXT_OUTLINE_PADDING,
                );
                self.stroke(outline.to_path(0.1), transform, highlight, stroke_width);
            }
            return;
        }

        if let Some(outline) = outline_of(element) {
            if outline.closed {
                let fill = color_or(&element.fill_color, Color::TRANSPARENT);
                self.fill(outline.path.clone(), transform, fill);
            }
            self.stroke(outline.path, transform, stroke_color, stroke_width);
        }
        if !skip_text {
            self.text_lines(element, transform, true);
        }
    }

    /// Text of an element: top-left aligned for text elements, centered in the box for
    /// labelled shapes.
    fn text_lines(&mut self, element: &DrawingElement, transform: Affine, centered: bool) {
        let Some(text) = element.text.as_deref().filter(|text| !text.is_empty()) else {
            return;
        };
        let font = FontSpec::of(element);
        let size = font.size;
        let color = color_or(&element.stroke_color, Color::BLACK);
        let line_total = text.split('\n').count() as f64;
        let center = Point::new(
            element.x + element.width_or_zero() / 2.0,
            element.y + element.height_or_zero() / 2.0,
        );
        for (index, line) in text.split('\n').enumerate() {
            if line.is_empty() {
                continue;
            }
            let origin = if centered {
                let width = self.ctx.measure.line_width(line, &font);
                let top = center.y - line_total * size / 2.0;
                Point::new(
                    center.x - width / 2.0,
                    top + size * (index as f64 + LABEL_BASELINE),
                )
            } else {
                Point::new(element.x, element.y + size * (index as f64 + 1.0))
            };
            self.commands.push(DrawCommand::Text(TextRun {
                text: line.to_string(),
                origin,
                size,
                family: font.family.to_string(),
                weight: font.weight,
                style: element.font_style.unwrap_or_default(),
                color,
                transform,
            }));
        }
    }

    /// Resize handles of the primary selection, unrotated.
    fn handles(&mut self) {
        let Some(primary) = self.ctx.store.primary_selection() else {
            return;
        };
        let bounds = bounds_of(primary, self.ctx.measure);
        let style = self.ctx.selection;
        for handle in resize_handles(&bounds, self.ctx.handle_size) {
            let path = handle.rect().to_path(0.1);
            self.fill(path.clone(), self.view, style.handle_fill);
            self.stroke(path, self.view, style.handle_stroke, HANDLE_STROKE_WIDTH);
        }
    }

    /// Inline editor box with its text and caret, in screen space.
    fn overlay(&mut self, overlay: &TextOverlay) {
        let rect = overlay.rect;
        let path = rect.to_path(0.1);
        self.fill(path.clone(), Affine::IDENTITY, Color::WHITE);
        self.stroke(
            path,
            Affine::IDENTITY,
            self.ctx.selection.highlight,
            HANDLE_STROKE_WIDTH,
        );

        let size = overlay.font_size;
        let color = color_or(&overlay.color, Color::BLACK);
        let font = FontSpec {
            size,
            family: inkboard_core::tools::DEFAULT_FONT_FAMILY,
            weight: FontWeight::Normal,
        };
        let left = rect.x0 + OVERLAY_TEXT_INSET;
        for (index, line) in overlay.text.split('\n').enumerate() {
            if line.is_empty() {
                continue;
            }
            self.commands.push(DrawCommand::Text(TextRun {
                text: line.to_string(),
                origin: Point::new(left, rect.y0 + size * (index as f64 + 1.0)),
                size,
                family: font.family.to_string(),
                weight: font.weight,
                style: FontStyle::Normal,
                color,
                transform: Affine::IDENTITY,
            }));
        }

        let (line, column) = overlay.caret;
        let prefix: String = overlay
            .text
            .split('\n')
            .nth(line)
            .unwrap_or_default()
            .chars()
            .take(column)
            .collect();
        let caret_x = left + self.ctx.measure.line_width(&prefix, &font);
        let caret_top = rect.y0 + size * line as f64 + OVERLAY_TEXT_INSET / 2.0;
        let caret = Rect::new(caret_x, caret_top, caret_x + CARET_WIDTH, caret_top + size);
        self.fill(caret.to_path(0.1), Affine::IDENTITY, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkboard_core::canvas::ElementStore;
    use inkboard_core::element::ElementPatch;
    use inkboard_core::session::Whiteboard;

    fn viewport() -> Size {
        Size::new(400.0, 300.0)
    }

    fn rect(x: f64) -> DrawingElement {
        DrawingElement::new(ElementKind::Rectangle, x, 10.0).with_size(50.0, 40.0)
    }

    fn strokes(scene: &Scene) -> Vec<(Color, f64)> {
        scene
            .commands()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Stroke { color, width, .. } => Some((*color, *width)),
                _ => None,
            })
            .collect()
    }

    fn text_runs(scene: &Scene) -> Vec<&TextRun> {
        scene
            .commands()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text(run) => Some(run),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_empty_store_has_no_commands() {
        let store = ElementStore::new();
        let scene = Scene::build(&RenderContext::new(&store, viewport()));
        assert!(scene.is_empty());
        assert_eq!(scene.size(), viewport());
    }

    #[test]
    fn test_grid_only_when_snapping() {
        let mut store = ElementStore::new();
        store.set_snap_to_grid(true);
        let scene = Scene::build(&RenderContext::new(&store, viewport()));
        assert_eq!(scene.commands().len(), 1);
        assert!(matches!(scene.commands()[0], DrawCommand::Stroke { .. }));
    }

    #[test]
    fn test_elements_paint_in_z_order() {
        let mut store = ElementStore::new();
        let mut low = rect(0.0).with_colors("#ff0000", "transparent");
        low.z_index = Some(5);
        let mut high = rect(100.0).with_colors("#0000ff", "transparent");
        high.z_index = Some(1);
        store.add(low);
        store.add(high);
        let scene = Scene::build(&RenderContext::new(&store, viewport()));
        let colors: Vec<[u8; 4]> = strokes(&scene)
            .iter()
            .map(|(color, _)| {
                let c = color.to_rgba8();
                [c.r, c.g, c.b, c.a]
            })
            .collect();
        assert_eq!(colors, vec![[0, 0, 255, 255], [255, 0, 0, 255]]);
    }

    #[test]
    fn test_transparent_fill_is_skipped() {
        let mut store = ElementStore::new();
        store.add(rect(0.0).with_colors("#000000", "transparent"));
        let scene = Scene::build(&RenderContext::new(&store, viewport()));
        assert_eq!(scene.commands().len(), 1);

        let mut store = ElementStore::new();
        store.add(rect(0.0));
        let scene = Scene::build(&RenderContext::new(&store, viewport()));
        assert!(matches!(scene.commands()[0], DrawCommand::Fill { .. }));
        assert_eq!(scene.commands().len(), 2);
    }

    #[test]
    fn test_selected_element_gets_highlight_and_handles() {
        let mut store = ElementStore::new();
        let id = store.add(rect(0.0).with_stroke_width(3.0));
        store.select(&id, false);
        let ctx = RenderContext::new(&store, viewport());
        let scene = Scene::build(&ctx);

        let strokes = strokes(&scene);
        assert_eq!(strokes[0].0, ctx.selection.highlight);
        assert!((strokes[0].1 - 5.0).abs() < f64::EPSILON);
        // element fill + stroke, then fill + stroke for each of 8 handles
        assert_eq!(scene.commands().len(), 2 + 16);
        let handle_strokes = strokes.iter().filter(|(c, _)| *c == ctx.selection.handle_stroke);
        assert_eq!(handle_strokes.count(), 8);
    }

    #[test]
    fn test_handles_follow_handle_size() {
        let mut store = ElementStore::new();
        let id = store.add(rect(0.0));
        store.select(&id, false);
        let scene = Scene::build(&RenderContext::new(&store, viewport()).with_handle_size(20.0));
        let DrawCommand::Fill { path, .. } = &scene.commands()[2] else {
            panic!("expected handle fill");
        };
        let bbox = path.bounding_box();
        assert!((bbox.width() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_text_baseline_and_selection_outline() {
        let mut store = ElementStore::new();
        let text = DrawingElement::new(ElementKind::Text, 10.0, 20.0)
            .with_text("one\ntwo")
            .with_font_size(20.0)
            .with_colors("#123456", "#ffffff");
        let id = store.add(text);
        store.select(&id, false);
        let scene = Scene::build(&RenderContext::new(&store, viewport()));

        let runs = text_runs(&scene);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].origin, Point::new(10.0, 40.0));
        assert_eq!(runs[1].origin, Point::new(10.0, 60.0));
        assert_eq!(runs[0].color.to_rgba8().r, 0x12);

        let outline = scene.commands().iter().find_map(|command| match command {
            DrawCommand::Stroke { path, .. } => Some(path.bounding_box()),
            _ => None,
        });
        let outline = outline.unwrap();
        assert!((outline.x0 - 8.0).abs() < 1e-9);
        assert!((outline.y0 - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_labels_are_centered() {
        let mut store = ElementStore::new();
        store.add(rect(0.0).with_text("ab").with_font_size(10.0));
        let scene = Scene::build(&RenderContext::new(&store, viewport()));
        let runs = text_runs(&scene);
        assert_eq!(runs.len(), 1);
        // box center x is 25; approx width of "ab" at size 10 is 11
        assert!((runs[0].origin.x - 19.5).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_and_view_compose() {
        let mut store = ElementStore::new();
        let id = store.add(rect(0.0));
        store.update(
            &id,
            &ElementPatch {
                rotation: Some(90.0),
                ..Default::default()
            },
        );
        store.set_zoom(2.0);
        let scene = Scene::build(&RenderContext::new(&store, viewport()));
        let DrawCommand::Fill { transform, .. } = &scene.commands()[0] else {
            panic!("expected fill");
        };
        let element = store.get(&id).unwrap();
        let expected = store.camera().transform() * rotation_transform(element);
        assert_eq!(*transform, expected);
        // the box center is a fixed point of the rotation
        let center = *transform * Point::new(25.0, 30.0);
        assert!((center.x - 50.0).abs() < 1e-9 && (center.y - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_star_outline_ignores_later_tool_changes() {
        let mut board = Whiteboard::new();
        let star = board
            .tools()
            .create_element(ElementKind::Star, Point::new(20.0, 20.0))
            .with_size(80.0, 80.0);
        board.add_elements(vec![star]);

        let fills = |board: &Whiteboard| -> Vec<BezPath> {
            Scene::build(&RenderContext::for_board(board, viewport()))
                .commands()
                .iter()
                .filter_map(|command| match command {
                    DrawCommand::Fill { path, .. } => Some(path.clone()),
                    _ => None,
                })
                .collect()
        };
        let before = fills(&board);
        board.tools_mut().star_spikes = 8;
        assert_eq!(fills(&board), before);
        assert_eq!(before[0].elements().len(), 2 * 5 + 1);
    }

    #[test]
    fn test_preview_is_drawn_last() {
        let store = ElementStore::new();
        let preview = DrawingElement::new(ElementKind::Line, 0.0, 0.0).with_size(30.0, 30.0);
        let scene = Scene::build(&RenderContext::new(&store, viewport()).with_preview(Some(&preview)));
        assert_eq!(scene.commands().len(), 1);
    }

    #[test]
    fn test_overlay_hides_element_text() {
        let mut store = ElementStore::new();
        let id = store.add(
            DrawingElement::new(ElementKind::Text, 0.0, 0.0)
                .with_text("old")
                .with_font_size(16.0),
        );
        let overlay = TextOverlay {
            element_id: id,
            rect: Rect::new(0.0, 0.0, 100.0, 24.0),
            text: "new".to_string(),
            caret: (0, 3),
            font_size: 16.0,
            color: "#000000".to_string(),
        };
        let scene = Scene::build(&RenderContext::new(&store, viewport()).with_text_overlay(Some(overlay)));
        let runs = text_runs(&scene);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "new");
        assert_eq!(runs[0].transform, Affine::IDENTITY);
        // box fill, box stroke, text, caret
        assert_eq!(scene.commands().len(), 4);
    }
}
