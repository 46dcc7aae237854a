//! Editor tuning knobs.

use crate::shapes::SerializableColor;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of undoable steps kept by default.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Per-axis pointer travel a drag must exceed before it counts as a move.
pub const DEFAULT_DRAG_THRESHOLD: f64 = 5.0;

/// Configuration errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Editor configuration.
///
/// Every field has a default, so a partial JSON document only overrides the
/// keys it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo history capacity. `0` keeps every step.
    pub history_limit: usize,
    /// Minimum per-axis drag distance, in world units.
    pub drag_threshold: f64,
    /// Smallest width or height a shape may have.
    pub min_extent: f64,
    /// Where newly created shapes are placed.
    pub default_shape_position: Point,
    /// Bounds of newly created shapes.
    pub default_shape_size: Size,
    /// Initial canvas background.
    pub background: SerializableColor,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            min_extent: crate::geometry::MIN_EXTENT,
            default_shape_position: Point::new(100.0, 100.0),
            default_shape_size: Size::new(60.0, 120.0),
            background: SerializableColor::WHITE,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.drag_threshold.is_nan() || self.drag_threshold < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "drag_threshold must be non-negative, got {}",
                self.drag_threshold
            )));
        }
        if self.min_extent.is_nan() || self.min_extent <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "min_extent must be positive, got {}",
                self.min_extent
            )));
        }
        let size = self.default_shape_size;
        if size.is_nan() || size.width <= 0.0 || size.height <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "default_shape_size must be positive, got {}x{}",
                size.width, size.height
            )));
        }
        Ok(())
    }

    /// Whether a drag of `delta` is too small to count as a move.
    pub fn below_drag_threshold(&self, delta: kurbo::Vec2) -> bool {
        delta.x.abs() < self.drag_threshold && delta.y.abs() < self.drag_threshold
    }
}
