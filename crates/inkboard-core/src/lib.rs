//! Inkboard Core Library
//!
//! Platform-agnostic document model and interaction engine for the inkboard whiteboard:
//! geometry, the element store, undo history, and the pointer/keyboard state machine.
//! Rendering lives in `inkboard-render`.

pub mod arrange;
pub mod camera;
pub mod canvas;
pub mod config;
pub mod element;
pub mod error;
pub mod geometry;
pub mod history;
pub mod input;
pub mod interaction;
pub mod selection;
pub mod session;
pub mod shapes;
pub mod snap;
pub mod sync;
pub mod templates;
pub mod text;
pub mod text_edit;
pub mod tools;

pub use arrange::{AlignDirection, DistributeAxis};
pub use camera::Camera;
pub use canvas::{CanvasState, ChangeKind, ChangeOrigin, ElementStore, StoreChange, SubscriptionId, TextStyle};
pub use config::EngineConfig;
pub use element::{DrawingElement, ElementId, ElementKind, ElementPatch, FontStyle, FontWeight};
pub use error::{CanvasError, CanvasResult};
pub use geometry::{Bounds, bounds_of, point_in_element};
pub use history::History;
pub use input::{ClickTracker, Key, KeyEvent, Modifiers, MouseButton, PointerEvent, Shortcut};
pub use interaction::{InteractionContext, InteractionMachine, InteractionState, TextOverlay};
pub use selection::{Handle, ResizeHandle};
pub use session::Whiteboard;
pub use shapes::{ShapeOutline, outline_of};
pub use snap::{GRID_SIZE, GridSettings, snap_to_grid};
pub use sync::{BroadcastEndpoint, BroadcastHub, SyncChannel, SyncMessage};
pub use templates::Template;
pub use text::{ApproxTextMeasure, FontSpec, TextMeasure};
pub use text_edit::{TextEditResult, TextEditState};
pub use tools::{ToolKind, ToolSettings};
