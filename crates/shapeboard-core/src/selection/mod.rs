//! Selection tracking and gesture-to-command translation.

mod editable;

pub use editable::{EditableEntity, EditableShape, EntityHandle};

use crate::command::{MoveShapesCommand, RectMap, ResizeShapesCommand, SetStyleCommand, StyleMap};
use crate::config::EditorConfig;
use crate::events::{self, Observers};
use crate::geometry::{Scale, resize_rect};
use crate::history::HistoryHandle;
use crate::shapes::{EntityId, ShapeStyle};
use kurbo::Vec2;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// The selected entities, keyed by id.
pub type SelectionMap = BTreeMap<EntityId, EntityHandle>;

/// What toolbars need to know about the selection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionSummary {
    pub count: usize,
    /// Fill and stroke shared by every selected entity. A field the
    /// entities disagree on is `None`.
    pub common_style: ShapeStyle,
}

/// The live selection plus its observers.
///
/// Shared between the [`SelectionManager`] and the commands it builds, which
/// reselect their snapshot whenever they run.
#[derive(Default)]
pub struct Selection {
    members: SelectionMap,
    observers: Observers<SelectionSummary>,
}

/// Shared handle to the live selection.
pub type SelectionHandle = Rc<RefCell<Selection>>;

impl Selection {
    pub fn contains(&self, id: EntityId) -> bool {
        self.members.contains_key(&id)
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.members.keys().copied().collect()
    }

    pub fn get(&self, id: EntityId) -> Option<EntityHandle> {
        self.members.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Copy of the member map. Entities are shared, not cloned.
    pub fn snapshot(&self) -> SelectionMap {
        self.members.clone()
    }

    pub fn summary(&self) -> SelectionSummary {
        let mut styles = self.members.values().map(|entity| entity.style());
        let common_style = match styles.next() {
            Some(first) => {
                let common = styles.fold(first, |common, style| common.common_with(&style));
                ShapeStyle {
                    fill: common.fill,
                    stroke: common.stroke,
                    background_image: None,
                }
            }
            None => ShapeStyle::default(),
        };
        SelectionSummary {
            count: self.members.len(),
            common_style,
        }
    }

    pub fn subscribe(&self, observer: impl FnMut(&SelectionSummary) + 'static) {
        self.observers.subscribe(observer);
    }

    pub(crate) fn insert(&mut self, entity: EntityHandle) {
        self.members.insert(entity.id(), entity);
        self.notify();
    }

    pub(crate) fn remove(&mut self, ids: &[EntityId]) {
        let mut changed = false;
        for id in ids {
            if let Some(entity) = self.members.remove(id) {
                entity.on_deselected();
                changed = true;
            }
        }
        if changed {
            self.notify();
        }
    }

    pub(crate) fn clear(&mut self) {
        for entity in std::mem::take(&mut self.members).into_values() {
            entity.on_deselected();
        }
        self.notify();
    }

    /// Make `snapshot` the selection again.
    pub(crate) fn replace(&mut self, snapshot: &SelectionMap) {
        for (id, entity) in &self.members {
            if !snapshot.contains_key(id) {
                entity.on_deselected();
            }
        }
        self.members = snapshot.clone();
        self.notify();
    }

    fn notify(&self) {
        self.observers.notify(self.summary());
    }
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("members", &self.ids())
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Gesture in progress on the selection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        /// Last delta previewed, relative to the drag origin.
        last_delta: Vec2,
    },
    Resizing {
        last_delta: Vec2,
        last_scale: Scale,
    },
}

/// Turns gestures on the selection into commands.
///
/// During a gesture every selected entity shows a preview; nothing in the
/// model changes. When the gesture ends the manager snapshots the selection
/// and pushes exactly one command covering all of it.
pub struct SelectionManager {
    history: HistoryHandle,
    selection: SelectionHandle,
    gesture: Gesture,
    config: EditorConfig,
}

impl SelectionManager {
    pub fn new(history: HistoryHandle, config: &EditorConfig) -> Self {
        Self {
            history,
            selection: Rc::new(RefCell::new(Selection::default())),
            gesture: Gesture::Idle,
            config: config.clone(),
        }
    }

    /// Handle to the live selection, for wiring commands built elsewhere.
    pub fn selection(&self) -> SelectionHandle {
        self.selection.clone()
    }

    /// Register a summary observer.
    ///
    /// Observers run after the operation that changed the selection has
    /// finished, so they may read the selection and the history.
    pub fn subscribe(&self, observer: impl FnMut(&SelectionSummary) + 'static) {
        self.selection.borrow().subscribe(observer);
    }

    /// Add `entity` to the selection. Without `additive` the previous
    /// selection is cleared first.
    pub fn append_to_selection(&mut self, entity: EntityHandle, additive: bool) {
        events::batch(|| {
            if !additive {
                self.clear_selection();
            }
            self.selection.borrow_mut().insert(entity);
        });
    }

    pub fn deselect(&mut self, id: EntityId) {
        events::batch(|| self.selection.borrow_mut().remove(&[id]));
    }

    /// Empty the selection. Deselected entities are notified.
    pub fn clear_selection(&mut self) {
        if self.gesture != Gesture::Idle {
            log::debug!("Selection cleared mid-gesture; dropping {:?}", self.gesture);
            self.gesture = Gesture::Idle;
        }
        events::batch(|| self.selection.borrow_mut().clear());
    }

    pub fn is_selected(&self, id: EntityId) -> bool {
        self.selection.borrow().contains(id)
    }

    pub fn selected_ids(&self) -> Vec<EntityId> {
        self.selection.borrow().ids()
    }

    pub fn len(&self) -> usize {
        self.selection.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.selection.borrow().is_empty()
    }

    pub fn snapshot(&self) -> SelectionMap {
        self.selection.borrow().snapshot()
    }

    pub fn summary(&self) -> SelectionSummary {
        self.selection.borrow().summary()
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn start_dragging(&mut self) {
        for entity in self.snapshot().values() {
            entity.start_dragging();
        }
        self.gesture = Gesture::Dragging {
            last_delta: Vec2::ZERO,
        };
    }

    pub fn stop_dragging(&mut self) {
        for entity in self.snapshot().values() {
            entity.stop_dragging();
        }
        if matches!(self.gesture, Gesture::Dragging { .. }) {
            self.gesture = Gesture::Idle;
        }
    }

    pub fn start_resizing(&mut self) {
        for entity in self.snapshot().values() {
            entity.start_resizing();
        }
        self.gesture = Gesture::Resizing {
            last_delta: Vec2::ZERO,
            last_scale: Scale::IDENTITY,
        };
    }

    pub fn stop_resizing(&mut self) {
        for entity in self.snapshot().values() {
            entity.stop_resizing();
        }
        if matches!(self.gesture, Gesture::Resizing { .. }) {
            self.gesture = Gesture::Idle;
        }
    }

    /// Drag the selection by `delta` (relative to where the drag began).
    ///
    /// While `is_dragging` the selection only previews the move, and moves
    /// smaller than the drag threshold on both axes preview as no move at
    /// all. With `is_dragging == false` the gesture ends and one move command
    /// is pushed. Returns `true` if a command was pushed.
    pub fn drag(&mut self, delta: Vec2, is_dragging: bool) -> bool {
        events::batch(|| self.drag_step(delta, is_dragging))
    }

    fn drag_step(&mut self, delta: Vec2, is_dragging: bool) -> bool {
        if !matches!(self.gesture, Gesture::Dragging { .. }) && is_dragging {
            self.start_dragging();
        }

        let delta = if self.config.below_drag_threshold(delta) {
            Vec2::ZERO
        } else {
            delta
        };

        if is_dragging {
            for entity in self.snapshot().values() {
                entity.preview_translate(delta);
            }
            self.gesture = Gesture::Dragging { last_delta: delta };
            return false;
        }

        self.stop_dragging();
        self.gesture = Gesture::Idle;
        if delta == Vec2::ZERO || self.is_empty() {
            return false;
        }

        let snapshot = self.snapshot();
        let selection = self.selection.clone();
        let command = MoveShapesCommand::new(delta, move |delta| {
            for entity in snapshot.values() {
                entity.translate(delta);
            }
            selection.borrow_mut().replace(&snapshot);
        });
        self.history.borrow_mut().append_and_execute(Box::new(command));
        true
    }

    /// Resize the selection.
    ///
    /// `delta` is how far the top-left corner moved and `scale` the scale
    /// factor, both relative to the gesture start. While `is_resizing` the
    /// entities only preview the result. With `is_resizing == false` the
    /// gesture ends and one resize command covering the whole selection is
    /// pushed. Returns `true` if a command was pushed.
    ///
    /// Each entity is clamped to its own minimum extent before its anchor
    /// corner is placed.
    pub fn resize(&mut self, delta: Vec2, scale: Scale, is_resizing: bool) -> bool {
        events::batch(|| self.resize_step(delta, scale, is_resizing))
    }

    fn resize_step(&mut self, delta: Vec2, scale: Scale, is_resizing: bool) -> bool {
        if !matches!(self.gesture, Gesture::Resizing { .. }) && is_resizing {
            self.start_resizing();
        }

        if is_resizing {
            for entity in self.snapshot().values() {
                entity.preview_resize(delta, scale);
            }
            self.gesture = Gesture::Resizing {
                last_delta: delta,
                last_scale: scale,
            };
            return false;
        }

        self.stop_resizing();
        self.gesture = Gesture::Idle;
        let snapshot = self.snapshot();

        let mut new_rects = RectMap::new();
        let mut prior_rects = RectMap::new();
        for (id, entity) in &snapshot {
            let prior = entity.rect();
            new_rects.insert(*id, resize_rect(delta, scale, prior, entity.min_extent()));
            prior_rects.insert(*id, prior);
        }
        if new_rects == prior_rects {
            return false;
        }

        let selection = self.selection.clone();
        let command = ResizeShapesCommand::new(new_rects, prior_rects, move |rects| {
            for (id, entity) in &snapshot {
                debug_assert!(rects.contains_key(id), "resize mapping is missing {id}");
                match rects.get(id) {
                    Some(rect) => entity.set_rect(*rect),
                    None => log::warn!("Resize mapping is missing {id}; leaving it unchanged"),
                }
            }
            selection.borrow_mut().replace(&snapshot);
        });
        self.history.borrow_mut().append_and_execute(Box::new(command));
        true
    }

    /// Apply `patch` to every selected entity as one command.
    ///
    /// Each entity's resulting style is resolved now, so undo restores
    /// exactly the fields the patch overrode. Returns `true` if a command
    /// was pushed.
    pub fn set_style(&mut self, patch: &ShapeStyle) -> bool {
        events::batch(|| self.push_style(patch))
    }

    fn push_style(&mut self, patch: &ShapeStyle) -> bool {
        let snapshot = self.snapshot();
        if snapshot.is_empty() || patch.is_empty() {
            return false;
        }

        let mut new_styles = StyleMap::new();
        let mut prior_styles = StyleMap::new();
        for (id, entity) in &snapshot {
            let prior = entity.style();
            new_styles.insert(*id, prior.merged_with(patch));
            prior_styles.insert(*id, prior);
        }

        let selection = self.selection.clone();
        let command = SetStyleCommand::new(new_styles, prior_styles, move |styles| {
            for (id, style) in styles {
                match snapshot.get(id) {
                    Some(entity) => entity.set_style(style.clone()),
                    None => log::warn!("Skipping style for {id}: not part of the command's shapes"),
                }
            }
            selection.borrow_mut().replace(&snapshot);
        });
        self.history.borrow_mut().append_and_execute(Box::new(command));
        true
    }

    /// End the gesture in progress as if the pointer had been released at
    /// the last previewed position. Returns `true` if a command was pushed.
    pub fn abandon_gesture(&mut self) -> bool {
        match self.gesture {
            Gesture::Idle => false,
            Gesture::Dragging { last_delta } => self.drag(last_delta, false),
            Gesture::Resizing {
                last_delta,
                last_scale,
            } => self.resize(last_delta, last_scale, false),
        }
    }
}

impl fmt::Debug for SelectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionManager")
            .field("selection", &self.selection.borrow())
            .field("gesture", &self.gesture)
            .field("drag_threshold", &self.config.drag_threshold)
            .finish()
    }
}
