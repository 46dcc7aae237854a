//! Shapeboard Core Library
//!
//! Undo/redo engine, selection-driven editing and anchor-preserving resize
//! for the Shapeboard drawing editor.

pub mod canvas;
pub mod command;
pub mod config;
pub mod editor;
pub mod events;
pub mod geometry;
pub mod history;
pub mod selection;
pub mod shapes;

pub use canvas::{Canvas, CanvasEvent, CanvasHandle};
pub use command::{
    Command, CommandState, CreateShapeCommand, DeleteShapesCommand, MoveShapesCommand,
    ResizeShapesCommand, SetBackgroundCommand, SetStyleCommand,
};
pub use config::{ConfigError, DEFAULT_DRAG_THRESHOLD, DEFAULT_HISTORY_LIMIT, EditorConfig};
pub use editor::{EditError, EditResult, Editor};
pub use events::Observers;
pub use geometry::{Corner, MIN_EXTENT, Scale, ShapeRect, compute_anchored_resize, handle_scale};
pub use history::{History, HistoryHandle};
pub use selection::{
    EditableEntity, EditableShape, EntityHandle, Gesture, SelectionManager, SelectionSummary,
};
pub use shapes::{
    EntityId, SerializableColor, Shape, ShapeEvent, ShapeHandle, ShapeKind, ShapeStyle,
};
