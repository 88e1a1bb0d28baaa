use std::time::Duration;

/// Handle for cancelling a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug)]
struct Entry<T> {
    id: TaskId,
    due: Duration,
    task: T,
}

/// Cancellable delayed tasks on a virtual clock.
///
/// The clock only moves when the owner advances it, so the same sequence of
/// inputs and advances always fires the same tasks. Tasks due at the same
/// instant fire in the order they were scheduled.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Scheduler {
            now: Duration::ZERO,
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn schedule(&mut self, delay: Duration, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            due: self.now + delay,
            task,
        });
        id
    }

    /// Returns `false` if the task already fired or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Drop every pending task. Returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    /// Time from now until the earliest pending task.
    pub fn until_next(&self) -> Option<Duration> {
        self.entries
            .iter()
            .map(|e| e.due.saturating_sub(self.now))
            .min()
    }

    /// Remove and return the earliest task due at or before `deadline`,
    /// moving the clock to that task's due time.
    ///
    /// Callers pop one task at a time so that a task which cancels others
    /// takes effect before the next one fires.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<T> {
        let pos = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= deadline)
            .min_by_key(|(_, e)| (e.due, e.id.0))
            .map(|(i, _)| i)?;
        let entry = self.entries.remove(pos);
        self.now = self.now.max(entry.due);
        Some(entry.task)
    }

    /// Move the clock forward to `to`. The clock never runs backwards.
    pub fn advance_clock(&mut self, to: Duration) {
        self.now = self.now.max(to);
    }

    /// Advance by `elapsed` and return every task that came due, in firing order.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<T> {
        let deadline = self.now + elapsed;
        let mut fired = Vec::new();
        while let Some(task) = self.pop_due(deadline) {
            fired.push(task);
        }
        self.advance_clock(deadline);
        fired
    }
}
