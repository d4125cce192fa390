//! Optimistic edit ledger.
//!
//! Every repository request carries a sequence number from one monotonic
//! counter. Local edits are applied to the snapshot right away and recorded
//! here, so that a snapshot requested before an edit reached the server cannot
//! silently revert it. An entry is re-applied to each incoming snapshot while
//! it is in flight, or while it settled after that snapshot was requested.

use crate::io::client::TaskPatch;
use crate::model::Task;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Patch(TaskPatch),
    Delete,
}

#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub id: String,
    pub seq: u64,
    /// Task as it was before the local change, for rollback
    pub before: Option<Task>,
    pub change: Change,
    /// Server copy after a successful update
    pub confirmed: Option<Task>,
    /// Sequence stamp taken when the result arrived
    pub settled_at: Option<u64>,
}

impl LedgerEntry {
    fn reapply(&self, tasks: &mut Vec<Task>) {
        match (&self.change, &self.confirmed) {
            (Change::Delete, _) => tasks.retain(|t| t.id != self.id),
            (Change::Patch(_), Some(server)) => {
                if let Some(task) = tasks.iter_mut().find(|t| t.id == self.id) {
                    *task = server.clone();
                }
            }
            (Change::Patch(patch), None) => {
                if let Some(task) = tasks.iter_mut().find(|t| t.id == self.id) {
                    patch.apply(task);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EditLedger {
    entries: Vec<LedgerEntry>,
}

impl EditLedger {
    pub fn record(&mut self, id: &str, seq: u64, before: Option<Task>, change: Change) {
        self.entries.push(LedgerEntry {
            id: id.to_string(),
            seq,
            before,
            change,
            confirmed: None,
            settled_at: None,
        });
    }

    /// Number of edits still waiting for the server
    pub fn in_flight(&self) -> usize {
        self.entries.iter().filter(|e| e.settled_at.is_none()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply every entry the snapshot requested at `snapshot_seq` may not
    /// reflect, then drop entries the server is known to have included.
    pub fn rebase(&mut self, tasks: &mut Vec<Task>, snapshot_seq: u64) {
        for entry in &self.entries {
            if entry.settled_at.is_none_or(|settled| settled > snapshot_seq) {
                entry.reapply(tasks);
            }
        }
        self.entries
            .retain(|e| e.settled_at.is_none_or(|settled| settled > snapshot_seq));
    }

    /// Record a successful update and put the server copy into `tasks`.
    /// Later in-flight edits of the same task are re-applied on top of it.
    /// Returns false for an unknown sequence, leaving `tasks` untouched.
    pub fn confirm_update(
        &mut self,
        seq: u64,
        server: Task,
        settled_at: u64,
        tasks: &mut Vec<Task>,
    ) -> bool {
        let Some(pos) = self.entries.iter().position(|e| e.seq == seq) else {
            return false;
        };
        if let Some(task) = tasks.iter_mut().find(|t| t.id == server.id) {
            *task = server.clone();
        }
        let entry = &mut self.entries[pos];
        entry.confirmed = Some(server);
        entry.settled_at = Some(settled_at);
        let id = entry.id.clone();
        for later in self.entries[pos + 1..]
            .iter()
            .filter(|e| e.id == id && e.settled_at.is_none())
        {
            later.reapply(tasks);
        }
        true
    }

    pub fn confirm_delete(&mut self, seq: u64, settled_at: u64) -> bool {
        match self.entries.iter_mut().find(|e| e.seq == seq) {
            Some(entry) => {
                entry.settled_at = Some(settled_at);
                true
            }
            None => false,
        }
    }

    /// Remove a failed entry and undo its local effect on `tasks`.
    /// Later in-flight edits are re-applied on top of the restored task.
    pub fn roll_back(&mut self, seq: u64, tasks: &mut Vec<Task>) -> Option<LedgerEntry> {
        let pos = self.entries.iter().position(|e| e.seq == seq)?;
        let entry = self.entries.remove(pos);
        if let Some(before) = &entry.before {
            match tasks.iter_mut().find(|t| t.id == entry.id) {
                Some(task) => *task = before.clone(),
                None if entry.change == Change::Delete => tasks.push(before.clone()),
                None => {}
            }
        }
        for later in self.entries.iter().filter(|e| e.id == entry.id && e.settled_at.is_none()) {
            later.reapply(tasks);
        }
        Some(entry)
    }

    /// Forget a settled-or-failed entry without touching tasks
    pub fn forget(&mut self, seq: u64) {
        self.entries.retain(|e| e.seq != seq);
    }
}
