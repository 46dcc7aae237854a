//! Shape definitions for the board.

mod shape;

pub use shape::{Shape, ShapeEvent, ShapeHandle};

use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a shape, assigned by the canvas store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The closed set of shape kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Ellipse,
    Triangle,
}

impl ShapeKind {
    /// Only rectangles can be filled with a background image.
    pub fn supports_background_image(self) -> bool {
        matches!(self, ShapeKind::Rectangle)
    }

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Triangle => "triangle",
        }
    }
}

/// An RGBA8 color as stored in styles and documents.
///
/// Colors coming from the renderer side are [`peniko::Color`] values and
/// convert with `into()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

/// Visual style of a shape.
///
/// Each field is independently optional. On a shape, `None` means the field
/// is unset and the renderer falls back to its default. On a style patch,
/// `None` means "leave this field alone".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShapeStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<SerializableColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<SerializableColor>,
    /// Reference to an image asset drawn inside the shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
}

impl ShapeStyle {
    pub fn with_fill(mut self, color: impl Into<SerializableColor>) -> Self {
        self.fill = Some(color.into());
        self
    }

    pub fn with_stroke(mut self, color: impl Into<SerializableColor>) -> Self {
        self.stroke = Some(color.into());
        self
    }

    pub fn with_background_image(mut self, reference: impl Into<String>) -> Self {
        self.background_image = Some(reference.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fill.is_none() && self.stroke.is_none() && self.background_image.is_none()
    }

    /// Apply `patch` on top of this style, overriding only the fields it sets.
    pub fn merged_with(&self, patch: &ShapeStyle) -> ShapeStyle {
        ShapeStyle {
            fill: patch.fill.or(self.fill),
            stroke: patch.stroke.or(self.stroke),
            background_image: patch
                .background_image
                .clone()
                .or_else(|| self.background_image.clone()),
        }
    }

    /// Keep only the fields on which both styles agree.
    pub fn common_with(&self, other: &ShapeStyle) -> ShapeStyle {
        fn agree<T: PartialEq + Clone>(a: &Option<T>, b: &Option<T>) -> Option<T> {
            if a == b { a.clone() } else { None }
        }
        ShapeStyle {
            fill: agree(&self.fill, &other.fill),
            stroke: agree(&self.stroke, &other.stroke),
            background_image: agree(&self.background_image, &other.background_image),
        }
    }
}
