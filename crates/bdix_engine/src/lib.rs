//! BDIX tester engine: server-list fetching, probing and run execution.
mod engine;
mod export;
mod fetch;
mod persist;
mod probe;
mod run;
mod store;
mod types;

pub use engine::{EngineConfig, EngineHandle};
pub use export::{
    export_endpoints, format_endpoint_list, parse_endpoint_list, read_endpoints, ExportError,
    DEFAULT_EXPORT_FILENAME,
};
pub use fetch::{
    extract_category, fetch_category, FetchSettings, ReqwestServerList, ServerListSource,
    DEFAULT_SOURCE_URL,
};
pub use persist::{write_atomically, PersistError};
pub use probe::{normalize_endpoint, ProbeSettings, Prober, ReqwestProber};
pub use run::{progress_percent, run_probes, RunContext, RunObserver};
pub use store::ResultStore;
pub use types::{
    EngineError, EngineEvent, FetchError, ProbeFailure, ProbeResult, RunId, RunOutcome,
    RunSummary, ServerListError,
};
