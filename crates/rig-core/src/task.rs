//! Cancellable task slots.
//!
//! A slot holds at most one in-flight task of a category. Starting a new task
//! cancels the stored one. While a task is being advanced it is checked out
//! of the slot; a [`Ticket`] records the slot generation at checkout so that
//! a task cancelled or replaced mid-advance is not put back.

/// Proof of checkout, consumed by [`TaskSlot::resume`].
#[derive(Debug)]
#[must_use]
pub struct Ticket(u64);

/// Single-occupancy holder for a running task.
#[derive(Debug)]
pub struct TaskSlot<T> {
    label: &'static str,
    current: Option<T>,
    generation: u64,
}

impl<T> TaskSlot<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            current: None,
            generation: 0,
        }
    }

    /// Store `task`, cancelling whatever was running.
    pub fn start(&mut self, task: T) {
        self.cancel();
        self.current = Some(task);
    }

    /// Drop the running task, if any. Returns whether one was running.
    pub fn cancel(&mut self) -> bool {
        self.generation += 1;
        let cancelled = self.current.take().is_some();
        if cancelled {
            tracing::debug!(task = self.label, "cancelled in-flight task");
        }
        cancelled
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.current.as_ref()
    }

    /// Check the running task out for advancing.
    pub fn checkout(&mut self) -> Option<(T, Ticket)> {
        let task = self.current.take()?;
        Some((task, Ticket(self.generation)))
    }

    /// Return a checked-out task that has not finished.
    ///
    /// Dropped instead when the slot was cancelled or restarted since checkout.
    pub fn resume(&mut self, task: T, ticket: Ticket) {
        if ticket.0 == self.generation && self.current.is_none() {
            self.current = Some(task);
        } else {
            tracing::debug!(task = self.label, "dropping superseded task");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_replaces() {
        let mut slot = TaskSlot::new("test");
        slot.start(1);
        slot.start(2);
        assert_eq!(slot.get(), Some(&2));
    }

    #[test]
    fn test_checkout_resume() {
        let mut slot = TaskSlot::new("test");
        slot.start(1);
        let (task, ticket) = slot.checkout().unwrap();
        assert!(!slot.is_active());
        slot.resume(task + 1, ticket);
        assert_eq!(slot.get(), Some(&2));
    }

    #[test]
    fn test_cancel_during_checkout_drops_task() {
        let mut slot = TaskSlot::new("test");
        slot.start(1);
        let (task, ticket) = slot.checkout().unwrap();
        slot.cancel();
        slot.resume(task, ticket);
        assert!(!slot.is_active());
    }

    #[test]
    fn test_restart_during_checkout_keeps_new_task() {
        let mut slot = TaskSlot::new("test");
        slot.start(1);
        let (task, ticket) = slot.checkout().unwrap();
        slot.start(7);
        slot.resume(task, ticket);
        assert_eq!(slot.get(), Some(&7));
    }

    #[test]
    fn test_empty_checkout() {
        let mut slot: TaskSlot<u8> = TaskSlot::new("test");
        assert!(slot.checkout().is_none());
        assert!(!slot.cancel());
    }
}
