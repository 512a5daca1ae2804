use std::fmt;

pub type RunId = u64;

/// Engine events, in emission order for a run: any number of `Progress` and
/// `Found`, then exactly one `RunFinished`, then exactly one `ProgressReset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Progress {
        run_id: RunId,
        percent: u8,
    },
    Found {
        run_id: RunId,
        endpoint: String,
        count: usize,
    },
    RunFinished {
        run_id: RunId,
        outcome: RunOutcome,
        found: usize,
    },
    ProgressReset {
        run_id: RunId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Stopped,
    CategoryNotFound { category: String },
    FetchFailed { message: String },
}

impl RunOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            RunOutcome::Completed => "completed",
            RunOutcome::Stopped => "stopped",
            RunOutcome::CategoryNotFound { .. } => "category-not-found",
            RunOutcome::FetchFailed { .. } => "fetch-failed",
        }
    }
}

/// Failure fetching the server-list document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("invalid source url: {0}")]
    InvalidUrl(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("document too large (max {max_bytes} bytes)")]
    TooLarge { max_bytes: u64 },
    #[error("transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServerListError {
    #[error("failed to fetch server list: {0}")]
    Fetch(#[from] FetchError),
    #[error("no servers found for the category: {0}")]
    CategoryNotFound(String),
}

impl ServerListError {
    pub fn into_outcome(self) -> RunOutcome {
        match self {
            ServerListError::Fetch(err) => RunOutcome::FetchFailed {
                message: err.to_string(),
            },
            ServerListError::CategoryNotFound(category) => {
                RunOutcome::CategoryNotFound { category }
            }
        }
    }
}

/// Outcome of probing one endpoint once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    Reachable,
    Unreachable(ProbeFailure),
}

impl ProbeResult {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeResult::Reachable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeFailure::InvalidUrl => write!(f, "invalid url"),
            ProbeFailure::HttpStatus(code) => write!(f, "http status {code}"),
            ProbeFailure::Timeout => write!(f, "timeout"),
            ProbeFailure::Network => write!(f, "network error"),
        }
    }
}

/// Totals for one pass of the probe loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub total: usize,
    pub probed: usize,
    pub found: usize,
    pub stopped: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build http client: {0}")]
    Client(#[from] FetchError),
    #[error("engine thread is not running")]
    Disconnected,
}
