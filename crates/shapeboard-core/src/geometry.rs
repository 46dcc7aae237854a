//! Anchor-preserving resize math.
//!
//! A shape is resized by dragging one of its four corner handles. The corner
//! diagonally opposite the active handle stays where it was when the gesture
//! began; everything here is computed from that gesture-start rectangle so
//! that repeated pointer events never accumulate rounding drift.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest width or height a shape may end up with after a resize.
pub const MIN_EXTENT: f64 = 1.0;

/// Extent a side snaps to when a handle is dragged past the opposite edge.
pub const COLLAPSED_EXTENT: f64 = 20.0;

/// Per-axis scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub x: f64,
    pub y: f64,
}

impl Scale {
    pub const IDENTITY: Self = Self { x: 1.0, y: 1.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn uniform(factor: f64) -> Self {
        Self::new(factor, factor)
    }

    /// The scale that takes `from` to `to`.
    ///
    /// An axis with a non-positive source extent has no meaningful ratio and
    /// is reported as `1.0`.
    pub fn between(from: Size, to: Size) -> Self {
        let ratio = |from: f64, to: f64| if from > 0.0 { to / from } else { 1.0 };
        Self::new(ratio(from.width, to.width), ratio(from.height, to.height))
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Top-left position and bounds of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeRect {
    pub position: Point,
    pub size: Size,
}

impl ShapeRect {
    pub fn new(position: Point, size: Size) -> Self {
        Self { position, size }
    }

    pub fn right(&self) -> f64 {
        self.position.x + self.size.width
    }

    pub fn bottom(&self) -> f64 {
        self.position.y + self.size.height
    }

    /// Position of the given corner.
    pub fn corner(&self, corner: Corner) -> Point {
        match corner {
            Corner::TopLeft => self.position,
            Corner::TopRight => Point::new(self.right(), self.position.y),
            Corner::BottomLeft => Point::new(self.position.x, self.bottom()),
            Corner::BottomRight => Point::new(self.right(), self.bottom()),
        }
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self::new(self.position + delta, self.size)
    }

    /// Grow any extent below `min_extent` up to it, keeping the position.
    pub fn clamped(self, min_extent: f64) -> Self {
        Self::new(
            self.position,
            Size::new(
                self.size.width.max(min_extent),
                self.size.height.max(min_extent),
            ),
        )
    }
}

impl From<Rect> for ShapeRect {
    fn from(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(rect.origin(), rect.size())
    }
}

/// Corner positions of a shape's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// The diagonally opposite corner.
    pub fn opposite(self) -> Self {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }
}

/// Which corner stays fixed for a resize whose top-left corner moved by `delta`.
///
/// An axis on which the top-left corner did not move keeps its leading edge
/// (left or top); an axis on which it moved keeps the trailing edge.
pub fn anchor_for_delta(delta: Vec2) -> Corner {
    match (delta.x == 0.0, delta.y == 0.0) {
        (true, true) => Corner::TopLeft,
        (false, true) => Corner::TopRight,
        (true, false) => Corner::BottomLeft,
        (false, false) => Corner::BottomRight,
    }
}

/// Scale a rectangle around the corner implied by `delta`.
///
/// `start_position` and `start_bounds` describe the rectangle when the resize
/// gesture began and `delta` is how far its top-left corner has been dragged.
/// The returned bounds are `start_bounds * scale`, clamped to [`MIN_EXTENT`],
/// and the returned position keeps the anchor corner where it was.
pub fn compute_anchored_resize(
    delta: Vec2,
    scale: Scale,
    start_position: Point,
    start_bounds: Size,
) -> (Point, Size) {
    let start = ShapeRect::new(start_position, start_bounds);
    let resized = resize_rect(delta, scale, start, MIN_EXTENT);
    (resized.position, resized.size)
}

/// [`compute_anchored_resize`] over a [`ShapeRect`] for a shape whose
/// extents may not drop below `min_extent`.
///
/// The clamp happens before the anchor is placed, so a shape that refuses to
/// shrink further still keeps its anchor corner fixed.
pub fn resize_rect(delta: Vec2, scale: Scale, start: ShapeRect, min_extent: f64) -> ShapeRect {
    let min_extent = min_extent.max(MIN_EXTENT);
    let bounds = Size::new(
        (start.size.width * scale.x).max(min_extent),
        (start.size.height * scale.y).max(min_extent),
    );

    let anchor = anchor_for_delta(delta);
    let fixed = start.corner(anchor);

    let position = match anchor {
        Corner::TopLeft => fixed,
        Corner::TopRight => Point::new(fixed.x - bounds.width, fixed.y),
        Corner::BottomLeft => Point::new(fixed.x, fixed.y - bounds.height),
        Corner::BottomRight => Point::new(fixed.x - bounds.width, fixed.y - bounds.height),
    };

    ShapeRect::new(position, bounds)
}

/// Turn a pointer drag on a corner handle into the `(scale, top_left_delta)`
/// pair consumed by [`compute_anchored_resize`].
///
/// The dragged corner follows the pointer while the other edges stay put. A
/// side pushed past its opposite edge collapses to [`COLLAPSED_EXTENT`]
/// instead of inverting.
pub fn handle_scale(handle: Corner, pointer_delta: Vec2, start: ShapeRect) -> (Scale, Vec2) {
    let mut left = start.position.x;
    let mut top = start.position.y;
    let mut right = start.right();
    let mut bottom = start.bottom();

    match handle {
        Corner::TopLeft => {
            left += pointer_delta.x;
            top += pointer_delta.y;
        }
        Corner::TopRight => {
            right += pointer_delta.x;
            top += pointer_delta.y;
        }
        Corner::BottomLeft => {
            left += pointer_delta.x;
            bottom += pointer_delta.y;
        }
        Corner::BottomRight => {
            right += pointer_delta.x;
            bottom += pointer_delta.y;
        }
    }

    if right - left < MIN_EXTENT {
        right = left + COLLAPSED_EXTENT;
    }
    if bottom - top < MIN_EXTENT {
        bottom = top + COLLAPSED_EXTENT;
    }

    let scale = Scale::between(start.size, Size::new(right - left, bottom - top));
    let top_left_delta = Vec2::new(left - start.position.x, top - start.position.y);
    (scale, top_left_delta)
}
