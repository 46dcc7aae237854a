//! Commands that mutate existing shapes or the canvas.

use super::{
    Command, CommandState, MoveFn, RectMap, ResizeFn, SetBackgroundFn, SetStyleFn, StyleMap,
};
use crate::shapes::SerializableColor;
use kurbo::Vec2;

/// Translates a fixed set of shapes by a fixed delta.
pub struct MoveShapesCommand {
    delta: Vec2,
    apply: MoveFn,
    state: CommandState,
}

impl MoveShapesCommand {
    pub fn new(delta: Vec2, apply: impl FnMut(Vec2) + 'static) -> Self {
        Self {
            delta,
            apply: Box::new(apply),
            state: CommandState::Unapplied,
        }
    }

    pub fn delta(&self) -> Vec2 {
        self.delta
    }
}

impl Command for MoveShapesCommand {
    fn execute(&mut self) {
        if !self.state.may_execute(self.name()) {
            return;
        }
        (self.apply)(self.delta);
        self.state = CommandState::Applied;
    }

    fn unexecute(&mut self) {
        if !self.state.may_unexecute(self.name()) {
            return;
        }
        (self.apply)(-self.delta);
        self.state = CommandState::Unapplied;
    }

    fn dispose(&mut self) {
        self.state = CommandState::Disposed;
    }

    fn state(&self) -> CommandState {
        self.state
    }

    fn name(&self) -> &str {
        "Move"
    }
}

/// Applies per-shape rects, remembering the rects they replace.
pub struct ResizeShapesCommand {
    new_rects: RectMap,
    prior_rects: RectMap,
    apply: ResizeFn,
    state: CommandState,
}

impl ResizeShapesCommand {
    /// Both maps must cover the same shapes.
    pub fn new(
        new_rects: RectMap,
        prior_rects: RectMap,
        apply: impl FnMut(&RectMap) + 'static,
    ) -> Self {
        debug_assert!(
            new_rects.keys().eq(prior_rects.keys()),
            "resize maps cover different shapes"
        );
        Self {
            new_rects,
            prior_rects,
            apply: Box::new(apply),
            state: CommandState::Unapplied,
        }
    }

    pub fn new_rects(&self) -> &RectMap {
        &self.new_rects
    }

    pub fn prior_rects(&self) -> &RectMap {
        &self.prior_rects
    }
}

impl Command for ResizeShapesCommand {
    fn execute(&mut self) {
        if !self.state.may_execute(self.name()) {
            return;
        }
        (self.apply)(&self.new_rects);
        self.state = CommandState::Applied;
    }

    fn unexecute(&mut self) {
        if !self.state.may_unexecute(self.name()) {
            return;
        }
        (self.apply)(&self.prior_rects);
        self.state = CommandState::Unapplied;
    }

    fn dispose(&mut self) {
        self.state = CommandState::Disposed;
    }

    fn state(&self) -> CommandState {
        self.state
    }

    fn name(&self) -> &str {
        "Resize"
    }
}

/// Applies per-shape styles, remembering the styles they replace.
///
/// The maps may cover any subset of the shapes the closure can reach; shapes
/// missing from them are left alone in both directions.
pub struct SetStyleCommand {
    new_styles: StyleMap,
    prior_styles: StyleMap,
    apply: SetStyleFn,
    state: CommandState,
}

impl SetStyleCommand {
    pub fn new(
        new_styles: StyleMap,
        prior_styles: StyleMap,
        apply: impl FnMut(&StyleMap) + 'static,
    ) -> Self {
        Self {
            new_styles,
            prior_styles,
            apply: Box::new(apply),
            state: CommandState::Unapplied,
        }
    }
}

impl Command for SetStyleCommand {
    fn execute(&mut self) {
        if !self.state.may_execute(self.name()) {
            return;
        }
        (self.apply)(&self.new_styles);
        self.state = CommandState::Applied;
    }

    fn unexecute(&mut self) {
        if !self.state.may_unexecute(self.name()) {
            return;
        }
        (self.apply)(&self.prior_styles);
        self.state = CommandState::Unapplied;
    }

    fn dispose(&mut self) {
        self.state = CommandState::Disposed;
    }

    fn state(&self) -> CommandState {
        self.state
    }

    fn name(&self) -> &str {
        "Change style"
    }
}

/// Changes the canvas background color.
pub struct SetBackgroundCommand {
    color: SerializableColor,
    prior: SerializableColor,
    apply: SetBackgroundFn,
    state: CommandState,
}

impl SetBackgroundCommand {
    pub fn new(
        color: SerializableColor,
        prior: SerializableColor,
        apply: impl FnMut(SerializableColor) + 'static,
    ) -> Self {
        Self {
            color,
            prior,
            apply: Box::new(apply),
            state: CommandState::Unapplied,
        }
    }
}

impl Command for SetBackgroundCommand {
    fn execute(&mut self) {
        if !self.state.may_execute(self.name()) {
            return;
        }
        (self.apply)(self.color);
        self.state = CommandState::Applied;
    }

    fn unexecute(&mut self) {
        if !self.state.may_unexecute(self.name()) {
            return;
        }
        (self.apply)(self.prior);
        self.state = CommandState::Unapplied;
    }

    fn dispose(&mut self) {
        self.state = CommandState::Disposed;
    }

    fn state(&self) -> CommandState {
        self.state
    }

    fn name(&self) -> &str {
        "Change background"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ShapeRect;
    use crate::shapes::{EntityId, ShapeStyle};
    use kurbo::{Point, Size};
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    type Store<T> = Rc<RefCell<BTreeMap<EntityId, T>>>;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> ShapeRect {
        ShapeRect::new(Point::new(x, y), Size::new(w, h))
    }

    fn apply_into<T: Clone + 'static>(
        store: &Store<T>,
    ) -> impl FnMut(&BTreeMap<EntityId, T>) + 'static {
        let store = store.clone();
        move |values: &BTreeMap<EntityId, T>| {
            let mut store = store.borrow_mut();
            for (id, value) in values {
                store.insert(*id, value.clone());
            }
        }
    }

    fn red() -> SerializableColor {
        SerializableColor::new(255, 0, 0, 255)
    }

    fn green() -> SerializableColor {
        SerializableColor::new(0, 255, 0, 255)
    }

    #[test]
    fn test_move_roundtrip() {
        let total = Rc::new(RefCell::new(Vec2::ZERO));
        let sink = total.clone();
        let mut cmd = MoveShapesCommand::new(Vec2::new(10.0, -5.0), move |d| {
            *sink.borrow_mut() += d;
        });

        cmd.execute();
        assert_eq!(*total.borrow(), Vec2::new(10.0, -5.0));
        cmd.unexecute();
        assert_eq!(*total.borrow(), Vec2::ZERO);
    }

    #[test]
    fn test_move_redo_after_undo() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = calls.clone();
        let mut cmd =
            MoveShapesCommand::new(Vec2::new(1.0, 2.0), move |d| sink.borrow_mut().push(d));

        cmd.execute();
        cmd.unexecute();
        cmd.execute();
        cmd.unexecute();

        assert_eq!(calls.borrow().len(), 4);
        assert_eq!(cmd.state(), CommandState::Unapplied);
    }

    #[test]
    fn test_move_unexecute_before_execute() {
        let calls = Rc::new(RefCell::new(0));
        let sink = calls.clone();
        let mut cmd = MoveShapesCommand::new(Vec2::new(1.0, 1.0), move |_| *sink.borrow_mut() += 1);

        cmd.unexecute();
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_resize_roundtrip() {
        let store: Store<ShapeRect> = Rc::default();
        let before = rect(0.0, 0.0, 10.0, 10.0);
        let after = rect(-10.0, -10.0, 20.0, 20.0);
        store.borrow_mut().insert(EntityId(1), before);

        let mut cmd = ResizeShapesCommand::new(
            BTreeMap::from([(EntityId(1), after)]),
            BTreeMap::from([(EntityId(1), before)]),
            apply_into(&store),
        );

        cmd.execute();
        assert_eq!(store.borrow()[&EntityId(1)], after);
        cmd.unexecute();
        assert_eq!(store.borrow()[&EntityId(1)], before);
    }

    #[test]
    #[should_panic(expected = "resize maps cover different shapes")]
    #[cfg(debug_assertions)]
    fn test_resize_with_mismatched_maps_panics_in_debug() {
        let _ = ResizeShapesCommand::new(
            BTreeMap::from([(EntityId(1), rect(0.0, 0.0, 1.0, 1.0))]),
            BTreeMap::new(),
            |_| {},
        );
    }

    #[test]
    fn test_partial_style_update() {
        let store: Store<ShapeStyle> = Rc::default();
        let a = ShapeStyle::default().with_fill(red());
        let b = ShapeStyle::default().with_stroke(red());
        let c = ShapeStyle::default();
        store.borrow_mut().extend([
            (EntityId(1), a.clone()),
            (EntityId(2), b.clone()),
            (EntityId(3), c.clone()),
        ]);

        let new_a = a.merged_with(&ShapeStyle::default().with_fill(green()));
        let new_c = c.merged_with(&ShapeStyle::default().with_fill(green()));
        let mut cmd = SetStyleCommand::new(
            BTreeMap::from([(EntityId(1), new_a.clone()), (EntityId(3), new_c.clone())]),
            BTreeMap::from([(EntityId(1), a.clone()), (EntityId(3), c.clone())]),
            apply_into(&store),
        );

        cmd.execute();
        assert_eq!(store.borrow()[&EntityId(1)], new_a);
        assert_eq!(store.borrow()[&EntityId(2)], b);
        assert_eq!(store.borrow()[&EntityId(3)], new_c);

        store.borrow_mut().insert(EntityId(2), ShapeStyle::default().with_fill(red()));
        cmd.unexecute();
        assert_eq!(store.borrow()[&EntityId(1)], a);
        assert_eq!(store.borrow()[&EntityId(2)], ShapeStyle::default().with_fill(red()));
        assert_eq!(store.borrow()[&EntityId(3)], c);
    }

    #[test]
    fn test_set_background_roundtrip() {
        let background = Rc::new(RefCell::new(SerializableColor::WHITE));
        let sink = background.clone();
        let mut cmd = SetBackgroundCommand::new(green(), SerializableColor::WHITE, move |color| {
            *sink.borrow_mut() = color;
        });

        cmd.execute();
        assert_eq!(*background.borrow(), green());
        cmd.unexecute();
        assert_eq!(*background.borrow(), SerializableColor::WHITE);
    }

    #[test]
    fn test_disposed_command_is_inert() {
        let calls = Rc::new(RefCell::new(0));
        let sink = calls.clone();
        let mut cmd = SetBackgroundCommand::new(green(), red(), move |_| *sink.borrow_mut() += 1);

        cmd.dispose();
        cmd.execute();
        cmd.unexecute();

        assert_eq!(*calls.borrow(), 0);
        assert_eq!(cmd.state(), CommandState::Disposed);
    }

    fn any_rect() -> impl Strategy<Value = ShapeRect> {
        (-1e3..1e3f64, -1e3..1e3f64, 1.0..1e3f64, 1.0..1e3f64)
            .prop_map(|(x, y, w, h)| rect(x, y, w, h))
    }

    proptest! {
        #[test]
        fn resize_execute_then_unexecute_restores(
            rects in prop::collection::vec((any_rect(), any_rect()), 1..8),
        ) {
            let store: Store<ShapeRect> = Rc::default();
            let mut new_rects = RectMap::new();
            let mut prior_rects = RectMap::new();
            for (i, (before, after)) in rects.iter().enumerate() {
                let id = EntityId(i as u64 + 1);
                store.borrow_mut().insert(id, *before);
                prior_rects.insert(id, *before);
                new_rects.insert(id, *after);
            }
            let original = store.borrow().clone();

            let mut cmd =
                ResizeShapesCommand::new(new_rects.clone(), prior_rects, apply_into(&store));
            cmd.execute();
            prop_assert_eq!(&*store.borrow(), &new_rects);
            cmd.unexecute();
            prop_assert_eq!(&*store.borrow(), &original);
        }

        #[test]
        fn move_roundtrip_is_exact(dx in -1e6..1e6f64, dy in -1e6..1e6f64) {
            let position = Rc::new(RefCell::new(Point::new(3.0, 4.0)));
            let sink = position.clone();
            let mut cmd = MoveShapesCommand::new(Vec2::new(dx, dy), move |d| {
                let mut p = sink.borrow_mut();
                *p += d;
            });
            cmd.execute();
            cmd.unexecute();
            let p = *position.borrow();
            prop_assert!((p.x - 3.0).abs() < 1e-6);
            prop_assert!((p.y - 4.0).abs() < 1e-6);
        }
    }
}
