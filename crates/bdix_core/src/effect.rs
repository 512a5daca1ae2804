use crate::{Category, OpenTarget, RunId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Clear the result store and launch the fetch+probe worker.
    StartRun { run_id: RunId, category: Category },
    /// Signal the worker to stop before its next probe.
    StopRun { run_id: RunId },
    /// Write the current result snapshot to the export file.
    SaveResults,
    /// Show the current result snapshot.
    DisplayResults,
    /// Open the selected snapshot entries in the default browser.
    OpenResults(OpenTarget),
    /// User-facing message box equivalent.
    Notify { severity: Severity, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Information,
    Error,
}
