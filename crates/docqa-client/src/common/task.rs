use tokio_util::sync::CancellationToken;

/// Generation token for an async task. Results carrying a stale id are dropped.
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Authenticate,
    ConversationLoad,
    Ask,
    Upload,
    Delete,
    Export,
}

impl TaskKind {
    pub const ALL: [TaskKind; 6] = [
        TaskKind::Authenticate,
        TaskKind::ConversationLoad,
        TaskKind::Ask,
        TaskKind::Upload,
        TaskKind::Delete,
        TaskKind::Export,
    ];
}

#[derive(Debug, Clone)]
pub struct TaskStarted {
    pub id: TaskId,
    pub cancel: Option<CancellationToken>,
}

#[derive(Debug)]
pub struct TaskCompleted<E> {
    pub id: TaskId,
    pub result: E,
}

/// Task lifecycle state (stored in AppState, mutated only by reducer).
///
/// The reducer claims the slot with [`TaskState::start`] when it emits the
/// effect, so a switch that happens before the runtime spawns the task still
/// invalidates it.
#[derive(Debug, Default, Clone)]
pub struct TaskState {
    pub active: Option<TaskId>,
    pub cancel: Option<CancellationToken>,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn start(&mut self, id: TaskId) {
        self.active = Some(id);
        self.cancel = None;
    }

    /// Attaches the runtime's cancellation token, if the task is still current.
    pub fn on_started(&mut self, started: &TaskStarted) -> bool {
        let ok = self.active == Some(started.id);
        if ok {
            self.cancel = started.cancel.clone();
        }
        ok
    }

    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.active = None;
            self.cancel = None;
        }
        ok
    }

    /// Forgets the current task and hands back its token for cancellation.
    pub fn clear(&mut self) -> Option<CancellationToken> {
        self.active = None;
        self.cancel.take()
    }
}

#[derive(Debug, Default, Clone)]
pub struct Tasks {
    pub authenticate: TaskState,
    pub conversation_load: TaskState,
    pub ask: TaskState,
    pub upload: TaskState,
    pub delete: TaskState,
    pub export: TaskState,
}

impl Tasks {
    pub fn state(&self, kind: TaskKind) -> &TaskState {
        match kind {
            TaskKind::Authenticate => &self.authenticate,
            TaskKind::ConversationLoad => &self.conversation_load,
            TaskKind::Ask => &self.ask,
            TaskKind::Upload => &self.upload,
            TaskKind::Delete => &self.delete,
            TaskKind::Export => &self.export,
        }
    }

    pub fn state_mut(&mut self, kind: TaskKind) -> &mut TaskState {
        match kind {
            TaskKind::Authenticate => &mut self.authenticate,
            TaskKind::ConversationLoad => &mut self.conversation_load,
            TaskKind::Ask => &mut self.ask,
            TaskKind::Upload => &mut self.upload,
            TaskKind::Delete => &mut self.delete,
            TaskKind::Export => &mut self.export,
        }
    }

    pub fn is_any_running(&self) -> bool {
        TaskKind::ALL
            .iter()
            .any(|kind| self.state(*kind).is_running())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_only_matches_current_id() {
        let mut seq = TaskSeq::default();
        let mut state = TaskState::default();

        let first = seq.next_id();
        state.start(first);
        let second = seq.next_id();
        state.start(second);

        assert!(!state.finish_if_active(first));
        assert!(state.is_running());
        assert!(state.finish_if_active(second));
        assert!(!state.is_running());
    }

    #[test]
    fn test_on_started_ignores_cleared_slot() {
        let mut seq = TaskSeq::default();
        let mut state = TaskState::default();
        let id = seq.next_id();
        state.start(id);
        let _ = state.clear();

        let started = TaskStarted {
            id,
            cancel: Some(CancellationToken::new()),
        };
        assert!(!state.on_started(&started));
        assert!(state.cancel.is_none());
    }

    #[test]
    fn test_clear_returns_token() {
        let mut state = TaskState::default();
        let id = TaskId(7);
        state.start(id);
        let token = CancellationToken::new();
        state.on_started(&TaskStarted {
            id,
            cancel: Some(token.clone()),
        });

        let taken = state.clear();
        assert!(taken.is_some());
        assert!(!state.is_running());
    }
}
