//! The shape entity and its change notifications.

use super::{EntityId, ShapeKind, ShapeStyle};
use crate::events::Observers;
use crate::geometry::{MIN_EXTENT, ShapeRect};
use kurbo::{Point, Size, Vec2};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Change notification emitted by a [`Shape`].
///
/// Events carry the new value so observers never need to borrow the shape
/// back while it is being mutated.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeEvent {
    RectChanged { id: EntityId, rect: ShapeRect },
    StyleChanged { id: EntityId, style: ShapeStyle },
    DeletedChanged { id: EntityId, deleted: bool },
}

impl ShapeEvent {
    pub fn id(&self) -> EntityId {
        match self {
            ShapeEvent::RectChanged { id, .. }
            | ShapeEvent::StyleChanged { id, .. }
            | ShapeEvent::DeletedChanged { id, .. } => *id,
        }
    }
}

/// Shared handle to a shape owned by the canvas.
pub type ShapeHandle = Rc<RefCell<Shape>>;

/// A shape on the canvas.
pub struct Shape {
    id: EntityId,
    kind: ShapeKind,
    position: Point,
    size: Size,
    style: ShapeStyle,
    deleted: bool,
    min_extent: f64,
    observers: Observers<ShapeEvent>,
}

impl Shape {
    pub fn new(id: EntityId, kind: ShapeKind, rect: ShapeRect, style: ShapeStyle) -> Self {
        let mut shape = Self {
            id,
            kind,
            position: Point::ZERO,
            size: Size::new(MIN_EXTENT, MIN_EXTENT),
            style: ShapeStyle::default(),
            deleted: false,
            min_extent: MIN_EXTENT,
            observers: Observers::default(),
        };
        let rect = rect.clamped(shape.min_extent);
        shape.position = rect.position;
        shape.size = rect.size;
        shape.style = shape.sanitize(style);
        shape
    }

    /// Use a larger minimum extent than [`MIN_EXTENT`].
    pub fn with_min_extent(mut self, min_extent: f64) -> Self {
        self.min_extent = min_extent.max(MIN_EXTENT);
        let rect = self.rect().clamped(self.min_extent);
        self.size = rect.size;
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn rect(&self) -> ShapeRect {
        ShapeRect::new(self.position, self.size)
    }

    pub fn style(&self) -> &ShapeStyle {
        &self.style
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Smallest width or height this shape accepts.
    pub fn min_extent(&self) -> f64 {
        self.min_extent
    }

    /// Register an observer for rect, style and deleted-flag changes.
    ///
    /// Inside an [`events::batch`](crate::events::batch) the observer runs
    /// once the batch is over, not while the shape is borrowed.
    pub fn subscribe(&self, observer: impl FnMut(&ShapeEvent) + 'static) {
        self.observers.subscribe(observer);
    }

    /// Move and resize the shape. Extents are clamped to the minimum.
    ///
    /// Returns `false` (and notifies nobody) if nothing changed.
    pub fn set_rect(&mut self, rect: ShapeRect) -> bool {
        let rect = rect.clamped(self.min_extent);
        if rect == self.rect() {
            return false;
        }
        self.position = rect.position;
        self.size = rect.size;
        self.notify(ShapeEvent::RectChanged { id: self.id, rect });
        true
    }

    pub fn translate(&mut self, delta: Vec2) -> bool {
        if delta == Vec2::ZERO {
            return false;
        }
        self.set_rect(self.rect().translated(delta))
    }

    /// Replace the whole style.
    ///
    /// A background image on a shape that cannot carry one is dropped.
    pub fn set_style(&mut self, style: ShapeStyle) -> bool {
        let style = self.sanitize(style);
        if style == self.style {
            return false;
        }
        self.style = style.clone();
        self.notify(ShapeEvent::StyleChanged { id: self.id, style });
        true
    }

    pub fn set_deleted(&mut self, deleted: bool) -> bool {
        if deleted == self.deleted {
            return false;
        }
        self.deleted = deleted;
        self.notify(ShapeEvent::DeletedChanged { id: self.id, deleted });
        true
    }

    fn sanitize(&self, mut style: ShapeStyle) -> ShapeStyle {
        if style.background_image.is_some() && !self.kind.supports_background_image() {
            log::warn!(
                "Dropping background image on {} {}: only rectangles take images",
                self.kind.name(),
                self.id
            );
            style.background_image = None;
        }
        style
    }

    fn notify(&self, event: ShapeEvent) {
        self.observers.notify(event);
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("position", &self.position)
            .field("size", &self.size)
            .field("style", &self.style)
            .field("deleted", &self.deleted)
            .field("observers", &self.observers.len())
            .finish()
    }
}
