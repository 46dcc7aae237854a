//! The editing facade: wires the canvas, history and selection together.

use crate::canvas::{Canvas, CanvasEvent, CanvasHandle};
use crate::command::{Command, CreateShapeCommand, DeleteShapesCommand, SetBackgroundCommand};
use crate::config::EditorConfig;
use crate::events;
use crate::history::{History, HistoryHandle};
use crate::selection::{EditableShape, EntityHandle, SelectionHandle, SelectionManager};
use crate::shapes::{EntityId, SerializableColor, ShapeKind, ShapeStyle};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use thiserror::Error;

/// Editing errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Background images can only be set on rectangles")]
    BackgroundImageRequiresRectangle,
    #[error("Setting a background image requires exactly one selected shape")]
    BackgroundImageRequiresSingleSelection,
    #[error("Unknown shape: {0}")]
    UnknownShape(EntityId),
    #[error("Shape creation command did not run")]
    ShapeNotCreated,
}

/// Result type for editing operations.
pub type EditResult<T> = Result<T, EditError>;

type EntityCache = Rc<RefCell<BTreeMap<EntityId, EntityHandle>>>;

/// A canvas being edited, with undo/redo.
///
/// Every mutation goes through a command pushed to the history, so each
/// public operation here is one undoable step. Observers of the canvas, its
/// shapes and the selection run once the operation has returned, with no
/// borrow on the editor's state held.
pub struct Editor {
    config: EditorConfig,
    canvas: CanvasHandle,
    history: HistoryHandle,
    selection: SelectionManager,
    entities: EntityCache,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let canvas = Canvas::with_config(&config).into_handle();
        let history = History::from_config(&config).into_handle();
        let selection = SelectionManager::new(history.clone(), &config);
        let entities: EntityCache = Rc::default();

        let cache = entities.clone();
        canvas.borrow().subscribe(move |event| {
            if let CanvasEvent::ShapesRemoved(ids) = event {
                let mut cache = cache.borrow_mut();
                for id in ids {
                    cache.remove(id);
                }
            }
        });

        log::debug!("Editor opened for canvas {}", canvas.borrow().id);
        Self {
            config,
            canvas,
            history,
            selection,
            entities,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn canvas(&self) -> CanvasHandle {
        self.canvas.clone()
    }

    pub fn history(&self) -> HistoryHandle {
        self.history.clone()
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    /// Gestures (drag, resize) are driven through the selection manager.
    pub fn selection_mut(&mut self) -> &mut SelectionManager {
        &mut self.selection
    }

    /// Editable handle for a shape, shared with every command that touches it.
    pub fn entity(&self, id: EntityId) -> EditResult<EntityHandle> {
        if let Some(entity) = self.entities.borrow().get(&id) {
            return Ok(entity.clone());
        }
        let shape = self
            .canvas
            .borrow()
            .shape(id)
            .ok_or(EditError::UnknownShape(id))?;
        let entity = EditableShape::handle(shape);
        self.entities.borrow_mut().insert(id, entity.clone());
        Ok(entity)
    }

    /// Select a visible shape. Without `additive` the previous selection is
    /// replaced.
    pub fn select(&mut self, id: EntityId, additive: bool) -> EditResult<()> {
        let hidden = self
            .canvas
            .borrow()
            .shape(id)
            .is_none_or(|shape| shape.borrow().is_deleted());
        if hidden {
            return Err(EditError::UnknownShape(id));
        }
        let entity = self.entity(id)?;
        self.selection.append_to_selection(entity, additive);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear_selection();
    }

    /// Create a shape at the configured default rect.
    pub fn new_shape(&mut self, kind: ShapeKind, style: ShapeStyle) -> EditResult<EntityId> {
        Canvas::validate_style(kind, &style)?;

        let created = Rc::new(Cell::new(None));
        let canvas = self.canvas.clone();
        let record = created.clone();
        let rect = self.canvas.borrow().default_rect();
        let factory = move || {
            let id = canvas.borrow_mut().insert_shape(kind, rect, style.clone());
            record.set(Some(id));
            id
        };

        let command = CreateShapeCommand::new(
            factory,
            self.mark_deleted_fn(),
            self.restore_fn(),
            self.delete_fn(),
        );
        self.push(Box::new(command));
        created.get().ok_or(EditError::ShapeNotCreated)
    }

    /// Delete the selected shapes as one undoable step.
    /// Returns false if nothing was selected.
    pub fn delete_selected(&mut self) -> bool {
        let ids = self.selection.selected_ids();
        if ids.is_empty() {
            return false;
        }
        let command = DeleteShapesCommand::new(
            ids,
            self.mark_deleted_fn(),
            self.restore_fn(),
            self.delete_fn(),
        );
        self.push(Box::new(command));
        true
    }

    /// Apply a style patch to the selection.
    ///
    /// With nothing selected, a fill color restyles the canvas background
    /// instead. A background image can only go on a single selected
    /// rectangle. Returns whether a command was pushed.
    pub fn set_style(&mut self, patch: ShapeStyle) -> EditResult<bool> {
        if self.selection.is_empty() {
            return Ok(match patch.fill {
                Some(color) => self.set_background(color),
                None => false,
            });
        }

        if patch.background_image.is_some() {
            let snapshot = self.selection.snapshot();
            let mut selected = snapshot.values();
            let entity = match (selected.next(), selected.next()) {
                (Some(entity), None) => entity,
                _ => return Err(EditError::BackgroundImageRequiresSingleSelection),
            };
            Canvas::validate_style(entity.kind(), &patch)?;
        }

        Ok(self.selection.set_style(&patch))
    }

    /// Change the canvas background as one undoable step.
    /// Returns false if the color is already the background.
    pub fn set_background(&mut self, color: impl Into<SerializableColor>) -> bool {
        let color = color.into();
        let prior = self.canvas.borrow().background();
        if prior == color {
            return false;
        }
        let canvas = self.canvas.clone();
        let command = SetBackgroundCommand::new(color, prior, move |color| {
            canvas.borrow_mut().set_background(color);
        });
        self.push(Box::new(command));
        true
    }

    pub fn undo(&mut self) -> bool {
        events::batch(|| self.history.borrow_mut().undo())
    }

    pub fn redo(&mut self) -> bool {
        events::batch(|| self.history.borrow_mut().redo())
    }

    pub fn can_undo(&self) -> bool {
        self.history.borrow().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.borrow().can_redo()
    }

    /// Tear the editor down.
    ///
    /// The history is dropped without disposing its commands, so shapes that
    /// are merely hidden stay in the canvas store.
    pub fn close(&mut self) {
        self.selection.clear_selection();
        self.history.borrow_mut().clear();
        log::debug!("Editor closed for canvas {}", self.canvas.borrow().id);
    }

    /// Run a fresh command; its notifications go out once the history is
    /// released.
    fn push(&self, command: Box<dyn Command>) {
        events::batch(|| self.history.borrow_mut().append_and_execute(command));
    }

    /// Hides shapes and drops them from the selection.
    fn mark_deleted_fn(&self) -> impl FnMut(&[EntityId]) + 'static {
        let canvas = self.canvas.clone();
        let selection: SelectionHandle = self.selection.selection();
        move |ids: &[EntityId]| {
            canvas.borrow().mark_deleted(ids);
            selection.borrow_mut().remove(ids);
        }
    }

    /// Unhides shapes and reselects what was selected when the command was
    /// built.
    fn restore_fn(&self) -> impl FnMut(&[EntityId]) + 'static {
        let canvas = self.canvas.clone();
        let selection = self.selection.selection();
        let snapshot = self.selection.snapshot();
        move |ids: &[EntityId]| {
            canvas.borrow().restore(ids);
            selection.borrow_mut().replace(&snapshot);
        }
    }

    fn delete_fn(&self) -> impl FnMut(&[EntityId]) + 'static {
        let canvas = self.canvas.clone();
        move |ids: &[EntityId]| canvas.borrow_mut().delete_shapes(ids)
    }
}
