use std::fmt;

use chrono::{DateTime, Local};

use super::Rule;

pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Edit,
    Delete,
    Disable,
    Rename,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Edit => write!(f, "edit"),
            ChangeKind::Delete => write!(f, "delete"),
            ChangeKind::Disable => write!(f, "disable"),
            ChangeKind::Rename => write!(f, "rename"),
        }
    }
}

/// A recorded mutation of one rule. The snapshots are owned copies and
/// never alias a live rule.
#[derive(Debug, Clone)]
pub struct ChangeRecord {
    pub kind: ChangeKind,
    pub index: usize,
    pub before: Rule,
    pub after: Rule,
    pub description: String,
    pub timestamp: DateTime<Local>,
}

/// What the caller has to apply to its ruleset after an undo or redo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStep {
    pub kind: ChangeKind,
    pub index: usize,
    pub rule: Rule,
}

/// Bounded, linear undo/redo log.
///
/// Records below `cursor` can be undone, records at or above it redone.
/// Recording while redo entries exist discards them.
#[derive(Debug)]
pub struct HistoryStack {
    records: Vec<ChangeRecord>,
    cursor: usize,
    capacity: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryStack {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            cursor: 0,
            capacity,
        }
    }

    pub fn record(
        &mut self,
        kind: ChangeKind,
        index: usize,
        before: &Rule,
        after: &Rule,
        description: impl Into<String>,
    ) {
        self.records.truncate(self.cursor);
        if self.capacity == 0 {
            return;
        }
        if self.records.len() == self.capacity {
            self.records.remove(0);
        }

        self.records.push(ChangeRecord {
            kind,
            index,
            before: before.clone(),
            after: after.clone(),
            description: description.into(),
            timestamp: Local::now(),
        });
        self.cursor = self.records.len();
    }

    /// Step back one record, returning its "before" snapshot.
    pub fn undo(&mut self) -> Option<HistoryStep> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;

        let record = &self.records[self.cursor];
        Some(HistoryStep {
            kind: record.kind,
            index: record.index,
            rule: record.before.clone(),
        })
    }

    /// Step forward one record. Deletes hand back the "before" snapshot
    /// (the rule that has to exist to be deleted again); everything else
    /// hands back "after".
    pub fn redo(&mut self) -> Option<HistoryStep> {
        let record = self.records.get(self.cursor)?;
        let rule = match record.kind {
            ChangeKind::Delete => record.before.clone(),
            ChangeKind::Edit | ChangeKind::Disable | ChangeKind::Rename => record.after.clone(),
        };
        let step = HistoryStep {
            kind: record.kind,
            index: record.index,
            rule,
        };
        self.cursor += 1;
        Some(step)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.records.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }
}
