#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    /// Input closed while a run was in flight; shut down once it completes.
    Draining,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    session: SessionState,
    active_run: Option<Option<String>>,
    completed_runs: usize,
    rejected_commands: usize,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    /// Correlation id of the run in flight, if any.
    pub fn active_run(&self) -> Option<Option<&str>> {
        self.active_run.as_ref().map(|id| id.as_deref())
    }

    pub fn completed_runs(&self) -> usize {
        self.completed_runs
    }

    pub fn rejected_commands(&self) -> usize {
        self.rejected_commands
    }

    pub(crate) fn start_run(&mut self, correlation_id: Option<String>) {
        self.session = SessionState::Running;
        self.active_run = Some(correlation_id);
    }

    pub(crate) fn finish_run(&mut self) {
        self.session = match self.session {
            SessionState::Draining => SessionState::Finished,
            _ => SessionState::Idle,
        };
        self.active_run = None;
        self.completed_runs += 1;
    }

    pub(crate) fn reject_command(&mut self) {
        self.rejected_commands += 1;
    }

    pub(crate) fn close_input(&mut self) {
        self.session = match self.session {
            SessionState::Running | SessionState::Draining => SessionState::Draining,
            SessionState::Idle | SessionState::Finished => SessionState::Finished,
        };
    }

    pub(crate) fn stop(&mut self) {
        self.session = SessionState::Finished;
        self.active_run = None;
    }
}
