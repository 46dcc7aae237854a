//! Reversible edits.
//!
//! A command captures everything it needs to apply and reverse one edit at
//! construction time, then talks to the canvas only through the closures it
//! was built with. Commands never look at the live selection.
//!
//! Lifecycle: `Unapplied -> Applied <-> Unapplied -> Disposed`. Calls made
//! out of that order are ignored.

mod lifecycle;
mod mutation;

pub use lifecycle::{CreateShapeCommand, DeleteShapesCommand};
pub use mutation::{MoveShapesCommand, ResizeShapesCommand, SetBackgroundCommand, SetStyleCommand};

use crate::geometry::ShapeRect;
use crate::shapes::{EntityId, SerializableColor, ShapeStyle};
use kurbo::Vec2;
use std::collections::BTreeMap;

/// Materializes a new shape and returns its id.
pub type CreateShapeFn = Box<dyn FnMut() -> EntityId>;
/// Hides a batch of shapes.
pub type MarkDeletedFn = Box<dyn FnMut(&[EntityId])>;
/// Unhides a batch of shapes.
pub type RestoreFn = Box<dyn FnMut(&[EntityId])>;
/// Permanently removes a batch of shapes.
pub type DeleteFn = Box<dyn FnMut(&[EntityId])>;
/// Translates the command's shapes.
pub type MoveFn = Box<dyn FnMut(Vec2)>;
/// Applies per-shape rects.
pub type ResizeFn = Box<dyn FnMut(&RectMap)>;
/// Applies per-shape styles.
pub type SetStyleFn = Box<dyn FnMut(&StyleMap)>;
/// Sets the canvas background.
pub type SetBackgroundFn = Box<dyn FnMut(SerializableColor)>;

pub type RectMap = BTreeMap<EntityId, ShapeRect>;
pub type StyleMap = BTreeMap<EntityId, ShapeStyle>;

/// Where a command is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandState {
    #[default]
    Unapplied,
    Applied,
    Disposed,
}

impl CommandState {
    /// Whether `execute` may run. Logs the refusal otherwise.
    fn may_execute(self, name: &str) -> bool {
        match self {
            CommandState::Unapplied => true,
            CommandState::Applied => {
                log::warn!("Ignoring execute of already applied command '{name}'");
                false
            }
            CommandState::Disposed => {
                log::warn!("Ignoring execute of disposed command '{name}'");
                false
            }
        }
    }

    /// Whether `unexecute` may run.
    fn may_unexecute(self, name: &str) -> bool {
        if self == CommandState::Applied {
            true
        } else {
            log::trace!("Ignoring unexecute of {self:?} command '{name}'");
            false
        }
    }
}

/// A reversible edit owned by the history.
pub trait Command {
    /// Apply the edit. Ignored unless the command is unapplied.
    fn execute(&mut self);

    /// Reverse the edit. Ignored unless the command is applied.
    fn unexecute(&mut self);

    /// Release anything the command still holds on to.
    ///
    /// Called exactly once by the history when the command is truncated or
    /// evicted.
    fn dispose(&mut self) {}

    fn state(&self) -> CommandState;

    /// Human-readable label, e.g. for an "Undo Move" menu entry.
    fn name(&self) -> &str;
}
