use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::fetch::{fetch_category, FetchSettings, ReqwestServerList, ServerListSource};
use crate::probe::{ProbeSettings, Prober, ReqwestProber};
use crate::run::{run_probes, RunContext, RunObserver};
use crate::{EngineError, EngineEvent, ResultStore, RunId, RunOutcome};

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub fetch: FetchSettings,
    pub probe: ProbeSettings,
}

enum EngineCommand {
    Start { run_id: RunId, category: String },
    Stop { run_id: RunId },
}

struct ActiveRun {
    run_id: RunId,
    cancel: CancellationToken,
}

/// Owns the background worker thread that runs fetch+probe pipelines.
///
/// Commands never block the caller. Each started run ends with a
/// `RunFinished` event followed by a `ProgressReset` event, emitted by a
/// watcher task once the worker has returned.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
    store: ResultStore,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let source = Arc::new(ReqwestServerList::new(config.fetch));
        let prober = Arc::new(ReqwestProber::new(&config.probe)?);
        Self::with_components(source, prober, config.probe.concurrency)
    }

    pub fn with_components(
        source: Arc<dyn ServerListSource>,
        prober: Arc<dyn Prober>,
        concurrency: usize,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let store = ResultStore::new();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("bdix-engine")
            .build()?;

        let worker_store = store.clone();
        thread::spawn(move || {
            let mut active: Option<ActiveRun> = None;
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Start { run_id, category } => {
                        if let Some(previous) = active.take() {
                            previous.cancel.cancel();
                        }
                        let cancel = CancellationToken::new();
                        active = Some(ActiveRun {
                            run_id,
                            cancel: cancel.clone(),
                        });
                        let pipeline = Pipeline {
                            source: source.clone(),
                            prober: prober.clone(),
                            store: worker_store.clone(),
                            event_tx: event_tx.clone(),
                            concurrency,
                        };
                        let worker = runtime.spawn(pipeline.execute(run_id, category, cancel));
                        runtime.spawn(watch_completion(run_id, worker, event_tx.clone()));
                    }
                    EngineCommand::Stop { run_id } => match &active {
                        Some(run) if run.run_id == run_id => {
                            engine_debug!("Cancelling run {}", run_id);
                            run.cancel.cancel();
                        }
                        _ => engine_debug!("Stop for inactive run {} ignored", run_id),
                    },
                }
            }
            if let Some(run) = active {
                run.cancel.cancel();
            }
            engine_debug!("Engine command channel closed; shutting down");
        });

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
            store,
        })
    }

    /// Clears the result store for `run_id` and launches the pipeline.
    ///
    /// Fails with [`EngineError::Disconnected`] when the engine thread is
    /// gone; no events will follow for `run_id` in that case.
    pub fn start(&self, run_id: RunId, category: impl Into<String>) -> Result<(), EngineError> {
        self.store.reset(run_id);
        self.send(EngineCommand::Start {
            run_id,
            category: category.into(),
        })
    }

    /// Requests a cooperative stop. A probe already in flight may still
    /// complete and be recorded after this returns.
    pub fn stop(&self, run_id: RunId) -> Result<(), EngineError> {
        self.send(EngineCommand::Stop { run_id })
    }

    pub fn results(&self) -> &ResultStore {
        &self.store
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) -> Result<(), EngineError> {
        self.cmd_tx.send(command).map_err(|_| {
            engine_error!("Engine thread is gone; command dropped");
            EngineError::Disconnected
        })
    }
}

struct Pipeline {
    source: Arc<dyn ServerListSource>,
    prober: Arc<dyn Prober>,
    store: ResultStore,
    event_tx: mpsc::Sender<EngineEvent>,
    concurrency: usize,
}

impl Pipeline {
    async fn execute(
        self,
        run_id: RunId,
        category: String,
        cancel: CancellationToken,
    ) -> (RunOutcome, usize) {
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                engine_info!("Run {} stopped while fetching the server list", run_id);
                return (RunOutcome::Stopped, 0);
            }
            fetched = fetch_category(self.source.as_ref(), &category) => fetched,
        };
        let endpoints = match fetched {
            Ok(endpoints) => endpoints,
            Err(err) => {
                engine_error!("Run {}: {}", run_id, err);
                return (err.into_outcome(), 0);
            }
        };
        engine_info!(
            "Run {}: testing {} endpoints for {}",
            run_id,
            endpoints.len(),
            category
        );

        let observer = ChannelObserver {
            run_id,
            tx: self.event_tx.clone(),
        };
        let summary = run_probes(
            self.prober.as_ref(),
            &endpoints,
            RunContext {
                run_id,
                store: &self.store,
                cancel: &cancel,
                observer: &observer,
                concurrency: self.concurrency,
            },
        )
        .await;

        let outcome = if summary.stopped {
            RunOutcome::Stopped
        } else {
            RunOutcome::Completed
        };
        engine_info!(
            "Run {} {}: probed {}/{}, found {}",
            run_id,
            outcome.status(),
            summary.probed,
            summary.total,
            summary.found
        );
        (outcome, summary.found)
    }
}

async fn watch_completion(
    run_id: RunId,
    worker: JoinHandle<(RunOutcome, usize)>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let (outcome, found) = match worker.await {
        Ok(result) => result,
        Err(err) => {
            engine_error!("Run {} worker aborted: {}", run_id, err);
            (RunOutcome::Stopped, 0)
        }
    };
    let _ = event_tx.send(EngineEvent::RunFinished {
        run_id,
        outcome,
        found,
    });
    let _ = event_tx.send(EngineEvent::ProgressReset { run_id });
}

struct ChannelObserver {
    run_id: RunId,
    tx: mpsc::Sender<EngineEvent>,
}

impl RunObserver for ChannelObserver {
    fn on_progress(&self, percent: u8) {
        let _ = self.tx.send(EngineEvent::Progress {
            run_id: self.run_id,
            percent,
        });
    }

    fn on_found(&self, endpoint: &str, count: usize) {
        let _ = self.tx.send(EngineEvent::Found {
            run_id: self.run_id,
            endpoint: endpoint.to_string(),
            count,
        });
    }
}
