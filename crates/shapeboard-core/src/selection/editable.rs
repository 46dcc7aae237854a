//! Selectable handles over canvas shapes.

use crate::events;
use crate::geometry::{MIN_EXTENT, Scale, ShapeRect, resize_rect};
use crate::shapes::{EntityId, ShapeHandle, ShapeKind, ShapeStyle};
use kurbo::Vec2;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to an editable entity.
pub type EntityHandle = Rc<dyn EditableEntity>;

/// What the selection manager needs from an entity.
///
/// Methods take `&self`: entities are shared between the live selection and
/// every command snapshot that mentions them.
///
/// Previews are transient. They are what the user sees during a gesture and
/// never touch the underlying model; only commands do.
pub trait EditableEntity {
    fn id(&self) -> EntityId;
    fn kind(&self) -> ShapeKind;

    fn rect(&self) -> ShapeRect;
    fn set_rect(&self, rect: ShapeRect);
    /// Smallest width or height the entity accepts.
    fn min_extent(&self) -> f64 {
        MIN_EXTENT
    }
    fn translate(&self, delta: Vec2);

    fn style(&self) -> ShapeStyle;
    fn set_style(&self, style: ShapeStyle);

    /// Cache the current rect as the drag origin.
    fn start_dragging(&self);
    fn stop_dragging(&self);
    /// Cache the current rect as the resize origin.
    fn start_resizing(&self);
    fn stop_resizing(&self);

    /// Rect cached by the gesture in progress, if any.
    fn gesture_origin(&self) -> Option<ShapeRect>;

    /// Show the entity moved by `delta` from its gesture origin.
    fn preview_translate(&self, delta: Vec2);
    /// Show the entity resized from its gesture origin.
    fn preview_resize(&self, delta: Vec2, scale: Scale);

    /// The rect to draw: the preview if one is active, else the model rect.
    fn display_rect(&self) -> ShapeRect;

    /// Called when the entity leaves the selection.
    fn on_deselected(&self) {}
}

/// [`EditableEntity`] over a canvas [`Shape`](crate::shapes::Shape).
pub struct EditableShape {
    shape: ShapeHandle,
    origin: Cell<Option<ShapeRect>>,
    preview: Cell<Option<ShapeRect>>,
}

impl EditableShape {
    pub fn new(shape: ShapeHandle) -> Self {
        Self {
            shape,
            origin: Cell::new(None),
            preview: Cell::new(None),
        }
    }

    pub fn handle(shape: ShapeHandle) -> EntityHandle {
        Rc::new(Self::new(shape))
    }

    pub fn shape(&self) -> &ShapeHandle {
        &self.shape
    }

    fn begin_gesture(&self) {
        self.origin.set(Some(self.rect()));
        self.preview.set(None);
    }

    fn end_gesture(&self) {
        self.origin.set(None);
        self.preview.set(None);
    }

    fn origin_or_current(&self) -> ShapeRect {
        self.origin.get().unwrap_or_else(|| self.rect())
    }
}

impl EditableEntity for EditableShape {
    fn id(&self) -> EntityId {
        self.shape.borrow().id()
    }

    fn kind(&self) -> ShapeKind {
        self.shape.borrow().kind()
    }

    fn rect(&self) -> ShapeRect {
        self.shape.borrow().rect()
    }

    fn set_rect(&self, rect: ShapeRect) {
        events::batch(|| self.shape.borrow_mut().set_rect(rect));
    }

    fn min_extent(&self) -> f64 {
        self.shape.borrow().min_extent()
    }

    fn translate(&self, delta: Vec2) {
        events::batch(|| self.shape.borrow_mut().translate(delta));
    }

    fn style(&self) -> ShapeStyle {
        self.shape.borrow().style().clone()
    }

    fn set_style(&self, style: ShapeStyle) {
        events::batch(|| self.shape.borrow_mut().set_style(style));
    }

    fn start_dragging(&self) {
        self.begin_gesture();
    }

    fn stop_dragging(&self) {
        self.end_gesture();
    }

    fn start_resizing(&self) {
        self.begin_gesture();
    }

    fn stop_resizing(&self) {
        self.end_gesture();
    }

    fn gesture_origin(&self) -> Option<ShapeRect> {
        self.origin.get()
    }

    fn preview_translate(&self, delta: Vec2) {
        self.preview.set(Some(self.origin_or_current().translated(delta)));
    }

    fn preview_resize(&self, delta: Vec2, scale: Scale) {
        let origin = self.origin_or_current();
        let preview = resize_rect(delta, scale, origin, self.min_extent());
        self.preview.set(Some(preview));
    }

    fn display_rect(&self) -> ShapeRect {
        self.preview.get().unwrap_or_else(|| self.rect())
    }

    fn on_deselected(&self) {
        self.end_gesture();
    }
}

impl fmt::Debug for EditableShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditableShape")
            .field("shape", &self.shape.borrow())
            .field("origin", &self.origin.get())
            .field("preview", &self.preview.get())
            .finish()
    }
}
