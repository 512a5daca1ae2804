use crate::view_model::AppViewModel;
use crate::Category;

pub type RunId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
}

/// Terminal status of a run as reported to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Stopped,
    CategoryNotFound,
    FetchFailed { message: String },
}

impl RunOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            RunOutcome::Completed => "completed",
            RunOutcome::Stopped => "stopped",
            RunOutcome::CategoryNotFound => "category-not-found",
            RunOutcome::FetchFailed { .. } => "fetch-failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    category: Category,
    run: RunState,
    /// Run whose engine events are accepted. Survives a stop so the
    /// in-flight probe and the post-run reset still land.
    current_run: Option<RunId>,
    run_category: Option<Category>,
    next_run_id: RunId,
    progress: u8,
    found: usize,
    last_found: Option<String>,
    last_outcome: Option<RunOutcome>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(category: Category) -> Self {
        Self {
            category,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            run: self.run,
            category: self.category,
            run_category: self.run_category,
            progress: self.progress,
            found: self.found,
            last_found: self.last_found.clone(),
            last_outcome: self.last_outcome.clone(),
            dirty: self.dirty,
        }
    }

    pub fn run_state(&self) -> RunState {
        self.run
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn current_run(&self) -> Option<RunId> {
        self.current_run
    }

    pub fn found(&self) -> usize {
        self.found
    }

    /// Returns and clears the dirty flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn select_category(&mut self, category: Category) {
        if self.category != category {
            self.category = category;
            self.mark_dirty();
        }
    }

    pub(crate) fn begin_run(&mut self) -> RunId {
        self.next_run_id += 1;
        let run_id = self.next_run_id;
        self.run = RunState::Running;
        self.current_run = Some(run_id);
        self.run_category = Some(self.category);
        self.progress = 0;
        self.found = 0;
        self.last_found = None;
        self.last_outcome = None;
        self.mark_dirty();
        run_id
    }

    pub(crate) fn end_run(&mut self, outcome: RunOutcome) {
        self.run = RunState::Idle;
        self.last_outcome = Some(outcome);
        self.mark_dirty();
    }

    pub(crate) fn is_current(&self, run_id: RunId) -> bool {
        self.current_run == Some(run_id)
    }

    pub(crate) fn run_category(&self) -> Option<Category> {
        self.run_category
    }

    pub(crate) fn apply_progress(&mut self, percent: u8) {
        let percent = percent.min(100);
        // Stale reorderings never move the bar backwards.
        if percent > self.progress {
            self.progress = percent;
            self.mark_dirty();
        }
    }

    pub(crate) fn apply_found(&mut self, endpoint: String, found: usize) {
        if found >= self.found {
            self.found = found;
            self.last_found = Some(endpoint);
            self.mark_dirty();
        }
    }

    pub(crate) fn reset_progress(&mut self) {
        if self.progress != 0 {
            self.progress = 0;
            self.mark_dirty();
        }
    }
}
