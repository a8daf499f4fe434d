//! Single-flight task queue.
//!
//! Tasks run one at a time in queue order. Adding a task whose key is
//! already queued (and not yet started) moves it to the end and keeps the
//! newest reason, so a burst of restart triggers runs once.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::Notify;

/// Dedup key for restart tasks.
pub const RESTART_KEY: &str = "restart";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub key: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: Mutex<VecDeque<Task>>,
    notify: Notify,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task, or move the queued task with the same key to the end.
    ///
    /// Returns true if an already-queued task was collapsed into this one.
    pub fn add_or_move_to_end(&self, key: impl Into<String>, reason: impl Into<String>) -> bool {
        let task = Task {
            key: key.into(),
            reason: reason.into(),
        };

        let collapsed = {
            let mut tasks = self.tasks.lock();
            let existing = tasks.iter().position(|t| t.key == task.key);
            if let Some(pos) = existing {
                tasks.remove(pos);
            }
            tasks.push_back(task);
            existing.is_some()
        };

        self.notify.notify_one();
        collapsed
    }

    /// Whether a task with `key` is waiting to start.
    pub fn has_pending(&self, key: &str) -> bool {
        self.tasks.lock().iter().any(|t| t.key == key)
    }

    /// Wait for the next task.
    pub async fn next(&self) -> Task {
        loop {
            if let Some(task) = self.try_next() {
                return task;
            }
            self.notify.notified().await;
        }
    }

    pub fn try_next(&self) -> Option<Task> {
        self.tasks.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }

    /// Drop everything not yet started (project closed).
    pub fn clear(&self) {
        self.tasks.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_same_key_collapses_to_newest() {
        let queue = TaskQueue::new();
        assert!(!queue.add_or_move_to_end(RESTART_KEY, "Program.cs changed"));
        assert!(queue.add_or_move_to_end(RESTART_KEY, "new variable Speed"));

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.try_next().unwrap().reason, "new variable Speed");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_move_to_end() {
        let queue = TaskQueue::new();
        queue.add_or_move_to_end("a", "first");
        queue.add_or_move_to_end("b", "second");
        queue.add_or_move_to_end("a", "third");

        let order: Vec<_> = std::iter::from_fn(|| queue.try_next())
            .map(|t| t.reason)
            .collect();
        assert_eq!(order, ["second", "third"]);
    }

    #[test]
    fn test_has_pending() {
        let queue = TaskQueue::new();
        assert!(!queue.has_pending(RESTART_KEY));
        queue.add_or_move_to_end(RESTART_KEY, "x");
        assert!(queue.has_pending(RESTART_KEY));
        queue.clear();
        assert!(!queue.has_pending(RESTART_KEY));
    }

    #[tokio::test]
    async fn test_next_waits_for_task() {
        let queue = Arc::new(TaskQueue::new());
        let waiter = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.next().await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        queue.add_or_move_to_end(RESTART_KEY, "late");
        let task = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(task.reason, "late");
    }
}
