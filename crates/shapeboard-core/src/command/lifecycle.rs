//! Commands that create and delete shapes.

use super::{Command, CommandState, CreateShapeFn, DeleteFn, MarkDeletedFn, RestoreFn};
use crate::shapes::EntityId;

/// Creates one shape.
///
/// The first execute materializes the shape through the factory and records
/// its id. Every later execute restores that same id, so redo brings back the
/// original shape instead of a fresh one. Undo only hides the shape; it is
/// permanently removed if the command is disposed while undone.
pub struct CreateShapeCommand {
    create: CreateShapeFn,
    mark_deleted: MarkDeletedFn,
    restore: RestoreFn,
    delete: DeleteFn,
    id: Option<EntityId>,
    state: CommandState,
}

impl CreateShapeCommand {
    pub fn new(
        create: impl FnMut() -> EntityId + 'static,
        mark_deleted: impl FnMut(&[EntityId]) + 'static,
        restore: impl FnMut(&[EntityId]) + 'static,
        delete: impl FnMut(&[EntityId]) + 'static,
    ) -> Self {
        Self {
            create: Box::new(create),
            mark_deleted: Box::new(mark_deleted),
            restore: Box::new(restore),
            delete: Box::new(delete),
            id: None,
            state: CommandState::Unapplied,
        }
    }

    /// Id of the created shape, once the command has run.
    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn materialize(&mut self) {
        let id = (self.create)();
        log::debug!("Materialized shape {id}");
        self.id = Some(id);
    }

    fn bring_back(&mut self, id: EntityId) {
        (self.restore)(&[id]);
    }
}

impl Command for CreateShapeCommand {
    fn execute(&mut self) {
        if !self.state.may_execute(self.name()) {
            return;
        }
        match self.id {
            None => self.materialize(),
            Some(id) => self.bring_back(id),
        }
        self.state = CommandState::Applied;
    }

    fn unexecute(&mut self) {
        if !self.state.may_unexecute(self.name()) {
            return;
        }
        if let Some(id) = self.id {
            (self.mark_deleted)(&[id]);
        }
        self.state = CommandState::Unapplied;
    }

    fn dispose(&mut self) {
        if let (CommandState::Unapplied, Some(id)) = (self.state, self.id) {
            (self.delete)(&[id]);
        }
        self.state = CommandState::Disposed;
    }

    fn state(&self) -> CommandState {
        self.state
    }

    fn name(&self) -> &str {
        "Create shape"
    }
}

/// Deletes a fixed batch of shapes.
///
/// Execute hides the batch and undo restores it. Disposing the command while
/// it is applied makes the deletion permanent.
pub struct DeleteShapesCommand {
    ids: Vec<EntityId>,
    mark_deleted: MarkDeletedFn,
    restore: RestoreFn,
    delete: DeleteFn,
    state: CommandState,
}

impl DeleteShapesCommand {
    pub fn new(
        ids: Vec<EntityId>,
        mark_deleted: impl FnMut(&[EntityId]) + 'static,
        restore: impl FnMut(&[EntityId]) + 'static,
        delete: impl FnMut(&[EntityId]) + 'static,
    ) -> Self {
        Self {
            ids,
            mark_deleted: Box::new(mark_deleted),
            restore: Box::new(restore),
            delete: Box::new(delete),
            state: CommandState::Unapplied,
        }
    }

    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }
}

impl Command for DeleteShapesCommand {
    fn execute(&mut self) {
        if !self.state.may_execute(self.name()) {
            return;
        }
        (self.mark_deleted)(&self.ids);
        self.state = CommandState::Applied;
    }

    fn unexecute(&mut self) {
        if !self.state.may_unexecute(self.name()) {
            return;
        }
        (self.restore)(&self.ids);
        self.state = CommandState::Unapplied;
    }

    fn dispose(&mut self) {
        if self.state == CommandState::Applied {
            (self.delete)(&self.ids);
        }
        self.state = CommandState::Disposed;
    }

    fn state(&self) -> CommandState {
        self.state
    }

    fn name(&self) -> &str {
        "Delete shapes"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::test_support::CallLog;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Create command whose factory hands out increasing ids.
    fn create_command(log: &CallLog) -> CreateShapeCommand {
        let next = Rc::new(Cell::new(1));
        let (c, m, r, d) = (log.clone(), log.clone(), log.clone(), log.clone());
        CreateShapeCommand::new(
            move || {
                let id = EntityId(next.get());
                next.set(next.get() + 1);
                c.push(format!("create {id}"));
                id
            },
            move |ids| m.push(format!("hide {:?}", ids)),
            move |ids| r.push(format!("restore {:?}", ids)),
            move |ids| d.push(format!("delete {:?}", ids)),
        )
    }

    fn delete_command(log: &CallLog, ids: Vec<EntityId>) -> DeleteShapesCommand {
        let (m, r, d) = (log.clone(), log.clone(), log.clone());
        DeleteShapesCommand::new(
            ids,
            move |ids| m.push(format!("hide {:?}", ids)),
            move |ids| r.push(format!("restore {:?}", ids)),
            move |ids| d.push(format!("delete {:?}", ids)),
        )
    }

    #[test]
    fn test_create_executes_factory_once() {
        let log = CallLog::default();
        let mut cmd = create_command(&log);

        cmd.execute();
        cmd.unexecute();
        cmd.execute();

        assert_eq!(cmd.id(), Some(EntityId(1)));
        assert_eq!(
            log.entries(),
            vec![
                "create #1",
                "hide [EntityId(1)]",
                "restore [EntityId(1)]",
            ]
        );
    }

    #[test]
    fn test_create_double_execute_is_ignored() {
        let log = CallLog::default();
        let mut cmd = create_command(&log);

        cmd.execute();
        cmd.execute();

        assert_eq!(log.entries(), vec!["create #1"]);
        assert_eq!(cmd.state(), CommandState::Applied);
    }

    #[test]
    fn test_create_unexecute_before_execute() {
        let log = CallLog::default();
        let mut cmd = create_command(&log);

        cmd.unexecute();
        assert!(log.entries().is_empty());
        assert_eq!(cmd.state(), CommandState::Unapplied);
    }

    #[test]
    fn test_create_dispose_before_execute() {
        let log = CallLog::default();
        let mut cmd = create_command(&log);

        cmd.dispose();
        cmd.execute();

        assert!(log.entries().is_empty());
        assert_eq!(cmd.state(), CommandState::Disposed);
    }

    #[test]
    fn test_create_undo_then_dispose_deletes_once() {
        let log = CallLog::default();
        let mut cmd = create_command(&log);

        cmd.execute();
        cmd.unexecute();
        cmd.dispose();
        cmd.dispose();

        assert_eq!(log.count("delete [EntityId(1)]"), 1);
    }

    #[test]
    fn test_create_dispose_while_applied_keeps_shape() {
        let log = CallLog::default();
        let mut cmd = create_command(&log);

        cmd.execute();
        cmd.dispose();

        assert_eq!(log.entries(), vec!["create #1"]);
    }

    #[test]
    fn test_delete_roundtrip() {
        let log = CallLog::default();
        let mut cmd = delete_command(&log, vec![EntityId(1), EntityId(3)]);

        cmd.execute();
        cmd.unexecute();

        assert_eq!(
            log.entries(),
            vec![
                "hide [EntityId(1), EntityId(3)]",
                "restore [EntityId(1), EntityId(3)]",
            ]
        );
    }

    #[test]
    fn test_delete_dispose_only_when_applied() {
        let log = CallLog::default();
        let mut undone = delete_command(&log, vec![EntityId(2)]);
        undone.execute();
        undone.unexecute();
        undone.dispose();
        assert_eq!(log.count("delete [EntityId(2)]"), 0);

        let mut applied = delete_command(&log, vec![EntityId(5)]);
        applied.execute();
        applied.dispose();
        applied.dispose();
        assert_eq!(log.count("delete [EntityId(5)]"), 1);
    }

    #[test]
    fn test_delete_unexecute_before_execute() {
        let log = CallLog::default();
        let mut cmd = delete_command(&log, vec![EntityId(1)]);

        cmd.unexecute();
        cmd.dispose();
        assert!(log.entries().is_empty());
    }
}
