//! Cursor-addressed undo/redo history.

use crate::command::Command;
use crate::config::{DEFAULT_HISTORY_LIMIT, EditorConfig};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to the history.
pub type HistoryHandle = Rc<RefCell<History>>;

/// Ordered list of commands plus a cursor.
///
/// Commands before the cursor are applied; commands at or after it were
/// undone and are discarded by the next append.
///
/// Behind a [`HistoryHandle`], call these inside
/// [`events::batch`](crate::events::batch) so that observers triggered by a
/// command run after the handle is released.
pub struct History {
    commands: Vec<Box<dyn Command>>,
    cursor: usize,
    /// Maximum number of commands kept. `0` means unbounded.
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// Create an unbounded history.
    pub fn new() -> Self {
        Self::with_limit(0)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            commands: Vec::new(),
            cursor: 0,
            limit,
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::with_limit(config.history_limit)
    }

    pub fn into_handle(self) -> HistoryHandle {
        Rc::new(RefCell::new(self))
    }

    /// Execute `command` and record it.
    ///
    /// Undone commands are disposed and dropped first. If the history then
    /// exceeds its limit the oldest command is disposed and dropped.
    pub fn append_and_execute(&mut self, mut command: Box<dyn Command>) {
        let truncated = self.commands.len() - self.cursor;
        for mut undone in self.commands.drain(self.cursor..) {
            undone.dispose();
        }
        if truncated > 0 {
            log::debug!("Discarded {truncated} undone command(s)");
        }

        command.execute();
        log::debug!("Applied '{}'", command.name());
        self.commands.push(command);
        self.cursor += 1;

        if self.limit > 0 && self.commands.len() > self.limit {
            let mut oldest = self.commands.remove(0);
            oldest.dispose();
            self.cursor -= 1;
            log::debug!("Evicted '{}' from history", oldest.name());
        }
    }

    /// Undo the last applied command.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let command = &mut self.commands[self.cursor];
        command.unexecute();
        log::debug!("Undid '{}'", command.name());
        true
    }

    /// Redo the last undone command.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(command) = self.commands.get_mut(self.cursor) else {
            return false;
        };
        command.execute();
        log::debug!("Redid '{}'", command.name());
        self.cursor += 1;
        true
    }

    /// Drop every command without disposing it.
    ///
    /// Meant for teardown only: shapes hidden by a delete (or by an undone
    /// create) are not permanently removed.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.cursor = 0;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.commands.len()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Name of the command `undo` would reverse.
    pub fn undo_name(&self) -> Option<&str> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.commands.get(i))
            .map(|c| c.name())
    }

    /// Name of the command `redo` would apply.
    pub fn redo_name(&self) -> Option<&str> {
        self.commands.get(self.cursor).map(|c| c.name())
    }
}

impl fmt::Debug for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field(
                "commands",
                &self.commands.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field("cursor", &self.cursor)
            .field("limit", &self.limit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::test_support::CallLog;
    use crate::command::CommandState;
    use proptest::prelude::*;

    /// Command that records every lifecycle call under its label.
    struct Recorder {
        label: String,
        log: CallLog,
        state: CommandState,
    }

    impl Recorder {
        fn boxed(label: &str, log: &CallLog) -> Box<dyn Command> {
            Box::new(Self {
                label: label.to_string(),
                log: log.clone(),
                state: CommandState::Unapplied,
            })
        }
    }

    impl Command for Recorder {
        fn execute(&mut self) {
            if self.state == CommandState::Unapplied {
                self.log.push(format!("exec {}", self.label));
                self.state = CommandState::Applied;
            }
        }

        fn unexecute(&mut self) {
            if self.state == CommandState::Applied {
                self.log.push(format!("undo {}", self.label));
                self.state = CommandState::Unapplied;
            }
        }

        fn dispose(&mut self) {
            self.log.push(format!("dispose {}", self.label));
            self.state = CommandState::Disposed;
        }

        fn state(&self) -> CommandState {
            self.state
        }

        fn name(&self) -> &str {
            &self.label
        }
    }

    /// Labels of commands currently applied, in order.
    fn applied(log: &CallLog) -> Vec<String> {
        let mut applied = Vec::new();
        for entry in log.entries() {
            if let Some(label) = entry.strip_prefix("exec ") {
                applied.push(label.to_string());
            } else if let Some(label) = entry.strip_prefix("undo ") {
                applied.retain(|l| l != label);
            }
        }
        applied
    }

    #[test]
    fn test_empty_history() {
        let mut history = History::new();
        assert!(!history.undo());
        assert!(!history.redo());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo_name(), None);
    }

    #[test]
    fn test_undo_redo_order() {
        let log = CallLog::default();
        let mut history = History::new();
        for label in ["c1", "c2", "c3"] {
            history.append_and_execute(Recorder::boxed(label, &log));
        }

        assert!(history.undo());
        assert!(history.undo());
        assert!(history.undo());
        assert!(!history.undo());
        assert!(history.redo());

        assert_eq!(applied(&log), vec!["c1"]);
        assert_eq!(history.cursor(), 1);
        assert_eq!(history.undo_name(), Some("c1"));
        assert_eq!(history.redo_name(), Some("c2"));
    }

    #[test]
    fn test_append_truncates_redo_branch() {
        let log = CallLog::default();
        let mut history = History::new();
        for label in ["c1", "c2", "c3"] {
            history.append_and_execute(Recorder::boxed(label, &log));
        }
        history.undo();
        history.undo();
        history.append_and_execute(Recorder::boxed("c4", &log));

        assert_eq!(log.count("dispose c2"), 1);
        assert_eq!(log.count("dispose c3"), 1);
        assert_eq!(log.count("dispose c1"), 0);
        assert_eq!(history.len(), 2);
        assert!(!history.redo());
        assert_eq!(applied(&log), vec!["c1", "c4"]);
    }

    #[test]
    fn test_limit_evicts_oldest() {
        let log = CallLog::default();
        let mut history = History::with_limit(3);
        for label in ["c1", "c2", "c3", "c4"] {
            history.append_and_execute(Recorder::boxed(label, &log));
        }

        assert_eq!(log.count("dispose c1"), 1);
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 3);

        let mut undos = 0;
        while history.undo() {
            undos += 1;
        }
        assert_eq!(undos, 3);
        assert_eq!(applied(&log), vec!["c1"]);
    }

    #[test]
    fn test_zero_limit_is_unbounded() {
        let log = CallLog::default();
        let mut history = History::with_limit(0);
        for i in 0..200 {
            history.append_and_execute(Recorder::boxed(&format!("c{i}"), &log));
        }
        assert_eq!(history.len(), 200);
        assert!(!log.entries().iter().any(|e| e.starts_with("dispose")));
    }

    #[test]
    fn test_clear_does_not_dispose() {
        let log = CallLog::default();
        let mut history = History::new();
        history.append_and_execute(Recorder::boxed("c1", &log));
        history.append_and_execute(Recorder::boxed("c2", &log));
        history.undo();

        history.clear();

        assert!(history.is_empty());
        assert_eq!(history.cursor(), 0);
        assert!(!log.entries().iter().any(|e| e.starts_with("dispose")));
    }

    #[test]
    fn test_default_limit_matches_config() {
        assert_eq!(History::default().limit(), DEFAULT_HISTORY_LIMIT);
        let config = EditorConfig {
            history_limit: 7,
            ..EditorConfig::default()
        };
        assert_eq!(History::from_config(&config).limit(), 7);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Append,
        Undo,
        Redo,
    }

    fn any_op() -> impl Strategy<Value = Op> {
        prop_oneof![Just(Op::Append), Just(Op::Undo), Just(Op::Redo)]
    }

    proptest! {
        #[test]
        fn cursor_stays_in_range_and_disposes_once(
            ops in prop::collection::vec(any_op(), 0..64),
            limit in 0usize..6,
        ) {
            let log = CallLog::default();
            let mut history = History::with_limit(limit);
            let mut appended = 0;

            for op in ops {
                match op {
                    Op::Append => {
                        history.append_and_execute(Recorder::boxed(&format!("c{appended}"), &log));
                        appended += 1;
                    }
                    Op::Undo => {
                        history.undo();
                    }
                    Op::Redo => {
                        history.redo();
                    }
                }
                prop_assert!(history.cursor() <= history.len());
                if limit > 0 {
                    prop_assert!(history.len() <= limit);
                }
            }

            for i in 0..appended {
                let key = format!("dispose c{i}");
                prop_assert!(log.count(&key) <= 1);
            }
            // Evicted commands stay applied but leave the history.
            let live = applied(&log)
                .into_iter()
                .filter(|label| log.count(&format!("dispose {label}")) == 0)
                .count();
            prop_assert_eq!(live, history.cursor());
        }
    }
}
