//! Canvas store: owns the shapes and the background.

use crate::config::EditorConfig;
use crate::editor::EditError;
use crate::events::Observers;
use crate::geometry::ShapeRect;
use crate::shapes::{EntityId, SerializableColor, Shape, ShapeHandle, ShapeKind, ShapeStyle};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Structural change notification emitted by the [`Canvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    ShapeAdded(EntityId),
    /// Shapes permanently removed from the store.
    ShapesRemoved(Vec<EntityId>),
    BackgroundChanged(SerializableColor),
}

/// Shared handle to the canvas.
pub type CanvasHandle = Rc<RefCell<Canvas>>;

/// The document being edited.
///
/// Deleting a shape through the editor only hides it (so the deletion can
/// be undone); [`Canvas::delete_shapes`] is the permanent removal.
pub struct Canvas {
    /// Unique document identifier.
    pub id: String,
    /// Document name.
    pub name: String,
    shapes: HashMap<EntityId, ShapeHandle>,
    /// Z-order of shapes (back to front).
    z_order: Vec<EntityId>,
    next_id: u64,
    background: SerializableColor,
    default_rect: ShapeRect,
    min_extent: f64,
    observers: Observers<CanvasEvent>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Create a new empty canvas with the default configuration.
    pub fn new() -> Self {
        Self::with_config(&EditorConfig::default())
    }

    pub fn with_config(config: &EditorConfig) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            shapes: HashMap::new(),
            z_order: Vec::new(),
            next_id: 1,
            background: config.background,
            default_rect: ShapeRect::new(config.default_shape_position, config.default_shape_size),
            min_extent: config.min_extent,
            observers: Observers::default(),
        }
    }

    pub fn into_handle(self) -> CanvasHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn subscribe(&self, observer: impl FnMut(&CanvasEvent) + 'static) {
        self.observers.subscribe(observer);
    }

    /// Check that `style` can be applied to a shape of `kind`.
    pub fn validate_style(kind: ShapeKind, style: &ShapeStyle) -> Result<(), EditError> {
        if style.background_image.is_some() && !kind.supports_background_image() {
            return Err(EditError::BackgroundImageRequiresRectangle);
        }
        Ok(())
    }

    /// Rect new shapes are created at.
    pub fn default_rect(&self) -> ShapeRect {
        self.default_rect
    }

    /// Insert a shape without validating its style. An image on a shape that
    /// cannot carry one is dropped.
    pub fn insert_shape(
        &mut self,
        kind: ShapeKind,
        rect: ShapeRect,
        style: ShapeStyle,
    ) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;

        let shape = Shape::new(id, kind, rect, style).with_min_extent(self.min_extent);
        self.shapes.insert(id, Rc::new(RefCell::new(shape)));
        self.z_order.push(id);
        log::debug!("Created {} {}", kind.name(), id);
        self.notify(CanvasEvent::ShapeAdded(id));
        id
    }

    pub fn shape(&self, id: EntityId) -> Option<ShapeHandle> {
        self.shapes.get(&id).cloned()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.shapes.contains_key(&id)
    }

    /// Hide shapes without removing them.
    pub fn mark_deleted(&self, ids: &[EntityId]) {
        self.set_deleted(ids, true);
    }

    /// Unhide previously hidden shapes.
    pub fn restore(&self, ids: &[EntityId]) {
        self.set_deleted(ids, false);
    }

    /// Only the shapes' own cells are borrowed mutably, one at a time.
    fn set_deleted(&self, ids: &[EntityId], deleted: bool) {
        for id in ids {
            match self.shape(*id) {
                Some(shape) => {
                    shape.borrow_mut().set_deleted(deleted);
                }
                None => log::warn!("Cannot change deleted flag of unknown shape {id}"),
            }
        }
    }

    /// Permanently remove shapes from the store.
    pub fn delete_shapes(&mut self, ids: &[EntityId]) {
        let removed: Vec<EntityId> = ids
            .iter()
            .copied()
            .filter(|id| self.shapes.remove(id).is_some())
            .collect();
        if removed.is_empty() {
            return;
        }
        self.z_order.retain(|id| !removed.contains(id));
        log::debug!("Permanently deleted {} shape(s): {:?}", removed.len(), removed);
        self.notify(CanvasEvent::ShapesRemoved(removed));
    }

    /// Ids of shapes that are not hidden, back to front.
    pub fn visible_ids(&self) -> Vec<EntityId> {
        self.z_order
            .iter()
            .copied()
            .filter(|id| {
                self.shapes
                    .get(id)
                    .is_some_and(|shape| !shape.borrow().is_deleted())
            })
            .collect()
    }

    /// Visible shapes, back to front.
    pub fn visible_shapes(&self) -> Vec<ShapeHandle> {
        self.visible_ids()
            .into_iter()
            .filter_map(|id| self.shape(id))
            .collect()
    }

    pub fn background(&self) -> SerializableColor {
        self.background
    }

    pub fn set_background(&mut self, color: SerializableColor) -> bool {
        if color == self.background {
            return false;
        }
        self.background = color;
        self.notify(CanvasEvent::BackgroundChanged(color));
        true
    }

    /// Number of stored shapes, hidden ones included.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    fn notify(&self, event: CanvasEvent) {
        self.observers.notify(event);
    }
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("z_order", &self.z_order)
            .field("background", &self.background)
            .finish_non_exhaustive()
    }
}
