use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use bdix_core::{Effect, Msg, OpenTarget, RunId, RunOutcome, Severity};
use bdix_engine::{export_endpoints, EngineEvent, EngineHandle};
use engine_logging::{engine_error, engine_info, engine_warn};

use super::ui::TerminalUi;

/// Executes core effects against the engine and the terminal, and pumps
/// engine events back into the message loop.
pub struct EffectRunner {
    engine: EngineHandle,
    ui: Arc<TerminalUi>,
    export_path: PathBuf,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(
        engine: EngineHandle,
        ui: Arc<TerminalUi>,
        export_path: PathBuf,
        msg_tx: mpsc::Sender<Msg>,
    ) -> Self {
        let runner = Self {
            engine,
            ui,
            export_path,
            msg_tx,
        };
        runner.spawn_event_loop(runner.msg_tx.clone());
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartRun { run_id, category } => {
                    engine_info!("StartRun run_id={} category={}", run_id, category);
                    if let Err(err) = self.engine.start(run_id, category.as_str()) {
                        self.abandon_run(run_id, err.to_string());
                    }
                }
                Effect::StopRun { run_id } => {
                    if let Err(err) = self.engine.stop(run_id) {
                        self.ui.notify(Severity::Error, &format!("Stop failed: {err}"));
                    }
                }
                Effect::SaveResults => self.save_results(),
                Effect::DisplayResults => {
                    self.ui.show_endpoints(&self.engine.results().snapshot());
                }
                Effect::OpenResults(target) => self.open_results(target),
                Effect::Notify { severity, message } => {
                    self.ui.notify(severity, &message);
                }
            }
        }
    }

    fn save_results(&self) {
        let snapshot = self.engine.results().snapshot();
        match export_endpoints(&self.export_path, &snapshot) {
            Ok(path) => self.ui.notify(
                Severity::Information,
                &format!("Working servers saved to {}", path.display()),
            ),
            Err(err) => {
                engine_error!("Saving to {:?} failed: {}", self.export_path, err);
                self.ui.notify(
                    Severity::Error,
                    &format!("Error saving working servers: {err}"),
                );
            }
        }
    }

    /// Finishes a run the engine never accepted, so the message loop does
    /// not wait for events that will not come.
    fn abandon_run(&self, run_id: RunId, message: String) {
        engine_error!("Run {} could not start: {}", run_id, message);
        self.ui.notify(Severity::Error, &format!("Testing could not start: {message}"));
        let _ = self.msg_tx.send(Msg::RunFinished {
            run_id,
            outcome: RunOutcome::FetchFailed { message },
        });
        let _ = self.msg_tx.send(Msg::ProgressReset { run_id });
    }

    fn open_results(&self, target: OpenTarget) {
        let snapshot = self.engine.results().snapshot();
        for url in select_endpoints(&snapshot, target) {
            match webbrowser::open(url) {
                Ok(()) => self.ui.notify(Severity::Information, &format!("Opened {url}")),
                Err(err) => {
                    engine_warn!("Opening {} failed: {}", url, err);
                    self.ui.notify(Severity::Error, &format!("Error opening {url}: {err}"));
                }
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            let Some(event) = engine.recv_timeout(Duration::from_millis(100)) else {
                continue;
            };
            if msg_tx.send(map_event(event)).is_err() {
                break;
            }
        });
    }
}

fn select_endpoints(endpoints: &[String], target: OpenTarget) -> &[String] {
    match target {
        OpenTarget::All => endpoints,
        OpenTarget::Index(index) => index
            .checked_sub(1)
            .and_then(|start| endpoints.get(start..index))
            .unwrap_or(&[]),
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Progress { run_id, percent } => Msg::RunProgress { run_id, percent },
        EngineEvent::Found {
            run_id,
            endpoint,
            count,
        } => Msg::EndpointFound {
            run_id,
            endpoint,
            found: count,
        },
        EngineEvent::RunFinished {
            run_id,
            outcome,
            found,
        } => {
            engine_info!("Run {} finished: {} ({} found)", run_id, outcome.status(), found);
            Msg::RunFinished {
                run_id,
                outcome: map_outcome(outcome),
            }
        }
        EngineEvent::ProgressReset { run_id } => Msg::ProgressReset { run_id },
    }
}

fn map_outcome(outcome: bdix_engine::RunOutcome) -> RunOutcome {
    match outcome {
        bdix_engine::RunOutcome::Completed => RunOutcome::Completed,
        bdix_engine::RunOutcome::Stopped => RunOutcome::Stopped,
        bdix_engine::RunOutcome::CategoryNotFound { category } => {
            engine_warn!("No servers found for the category: {}", category);
            RunOutcome::CategoryNotFound
        }
        bdix_engine::RunOutcome::FetchFailed { message } => {
            RunOutcome::FetchFailed { message }
        }
    }
}
