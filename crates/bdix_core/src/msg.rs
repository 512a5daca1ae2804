#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked the category for the next run.
    CategorySelected(crate::Category),
    /// User clicked Start.
    StartClicked,
    /// User clicked Stop.
    StopClicked,
    /// User clicked Save.
    SaveClicked,
    /// User asked to see the reachable servers.
    DisplayClicked,
    /// User asked to open reachable servers in the browser.
    OpenClicked(crate::OpenTarget),
    /// Engine progress for a run, as a percentage.
    RunProgress { run_id: crate::RunId, percent: u8 },
    /// Engine confirmed another reachable endpoint.
    EndpointFound {
        run_id: crate::RunId,
        endpoint: String,
        found: usize,
    },
    /// Engine worker finished, naturally or after a stop.
    RunFinished {
        run_id: crate::RunId,
        outcome: crate::RunOutcome,
    },
    /// Completion watcher asks for the post-run progress reset.
    ProgressReset { run_id: crate::RunId },
    /// UI/render tick to coalesce rendering.
    Tick,
}
