/// Identifies one write started by the reducer so its result can be matched
/// back to the screen that asked for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Default)]
pub struct TaskSeq {
    next: u64,
}

impl TaskSeq {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// The write a task performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Login,
    Register,
    CreateBook,
    UpdateBook,
    DeleteBook,
    CreateCategory,
    CreateReview,
    DeleteReview,
}

/// In-flight write owned by a screen (mutated only by the reducer).
#[derive(Debug, Default, Clone)]
pub struct TaskState {
    pub active: Option<TaskId>,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn start(&mut self, id: TaskId) {
        self.active = Some(id);
    }

    /// Clears the task if `id` is the one running. Returns whether it was.
    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.active = None;
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_seq_is_monotonic() {
        let mut seq = TaskSeq::default();
        assert_eq!(seq.next_id(), TaskId(0));
        assert_eq!(seq.next_id(), TaskId(1));
    }

    #[test]
    fn test_finish_ignores_stale_ids() {
        let mut state = TaskState::default();
        state.start(TaskId(3));
        assert!(!state.finish_if_active(TaskId(2)));
        assert!(state.is_running());
        assert!(state.finish_if_active(TaskId(3)));
        assert!(!state.is_running());
    }
}
