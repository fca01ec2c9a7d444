/// Handle returned by [`DelayedTasks::schedule`] for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct Pending<A> {
    handle: TaskHandle,
    due: f32,
    action: A,
}

/// Cancellable delayed actions keyed on an external clock.
///
/// Nothing fires on its own: the owner polls with the current time and
/// [`clear`](Self::clear)s on teardown.
#[derive(Debug)]
pub struct DelayedTasks<A> {
    next_id: u64,
    pending: Vec<Pending<A>>,
}

impl<A> Default for DelayedTasks<A> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<A> DelayedTasks<A> {
    pub fn schedule(&mut self, due: f32, action: A) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending { handle, due, action });
        handle
    }

    /// Returns whether the task was still pending.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        match self.pending.iter().position(|task| task.handle == handle) {
            Some(index) => {
                self.pending.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.pending.iter().any(|task| task.handle == handle)
    }

    /// Remove and return the earliest task due at `now`. Ties resolve in
    /// scheduling order.
    pub fn pop_due(&mut self, now: f32) -> Option<(TaskHandle, A)> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, task)| task.due <= now)
            .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due))
            .map(|(index, _)| index)?;
        let task = self.pending.remove(index);
        Some((task.handle, task.action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_tasks_pop_in_time_order() {
        let mut tasks = DelayedTasks::default();
        tasks.schedule(2.0, "late");
        tasks.schedule(1.0, "early");
        tasks.schedule(1.0, "early_second");
        tasks.schedule(9.0, "future");

        assert!(tasks.pop_due(0.5).is_none());
        let fired: Vec<_> = std::iter::from_fn(|| tasks.pop_due(3.0).map(|(_, a)| a)).collect();
        assert_eq!(fired, ["early", "early_second", "late"]);
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn cancelled_tasks_never_fire() {
        let mut tasks = DelayedTasks::default();
        let handle = tasks.schedule(1.0, ());
        assert!(tasks.cancel(handle));
        assert!(!tasks.cancel(handle));
        assert!(tasks.pop_due(10.0).is_none());
    }

    #[test]
    fn clear_drops_everything() {
        let mut tasks = DelayedTasks::default();
        let handle = tasks.schedule(1.0, 1);
        tasks.schedule(2.0, 2);
        tasks.clear();
        assert!(tasks.is_empty());
        assert!(!tasks.is_pending(handle));
        assert!(tasks.pop_due(f32::MAX).is_none());
    }
}
