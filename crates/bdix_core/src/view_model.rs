use crate::{Category, RunOutcome, RunState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub run: RunState,
    /// Category selected for the next run.
    pub category: Category,
    /// Category of the current or last run.
    pub run_category: Option<Category>,
    pub progress: u8,
    pub found: usize,
    pub last_found: Option<String>,
    pub last_outcome: Option<RunOutcome>,
    pub dirty: bool,
}

impl AppViewModel {
    pub fn is_running(&self) -> bool {
        self.run == RunState::Running
    }

    pub fn status(&self) -> &'static str {
        match (&self.run, &self.last_outcome) {
            (RunState::Running, _) => "running",
            (RunState::Idle, Some(outcome)) => outcome.status(),
            (RunState::Idle, None) => "idle",
        }
    }
}
