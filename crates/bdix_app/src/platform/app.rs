use std::io::BufRead;
use std::process::ExitCode;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use bdix_core::{update, AppState, Msg, RunOutcome, RunState};
use bdix_engine::EngineHandle;
use engine_logging::{engine_debug, engine_info};

use super::cli::Cli;
use super::config::{load_config, Settings};
use super::effects::EffectRunner;
use super::ui::TerminalUi;

const TICK_INTERVAL: Duration = Duration::from_millis(75);

pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let file_config = load_config(cli.config.as_deref())?;
    let settings = Settings::resolve(file_config, &cli)?;
    let ui = Arc::new(TerminalUi::new());
    engine_logging::initialize(settings.log_destination, settings.log_level, ui.log_writer());
    engine_info!(
        "bdix-tester {} starting: category={} source={} timeout={:?} concurrency={}",
        env!("CARGO_PKG_VERSION"),
        settings.category,
        settings.engine.fetch.source_url,
        settings.engine.probe.timeout,
        settings.engine.probe.concurrency
    );

    let engine = EngineHandle::new(settings.engine.clone()).context("failed to start engine")?;
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(
        engine,
        ui.clone(),
        settings.export_path.clone(),
        msg_tx.clone(),
    );
    spawn_stop_listener(msg_tx);

    let mut app = App {
        state: AppState::with_category(settings.category),
        runner,
        ui: ui.clone(),
    };
    ui.notify(
        bdix_core::Severity::Information,
        "Press Enter to stop testing.",
    );
    app.dispatch(Msg::StartClicked);

    loop {
        match msg_rx.recv_timeout(TICK_INTERVAL) {
            Ok(msg) => {
                let run_over = matches!(
                    &msg,
                    Msg::ProgressReset { run_id } if app.state.current_run() == Some(*run_id)
                );
                app.dispatch(msg);
                if run_over && app.state.run_state() == RunState::Idle {
                    break;
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => app.dispatch(Msg::Tick),
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    if settings.save_after_run {
        app.dispatch(Msg::SaveClicked);
    }
    if settings.show_after_run {
        app.dispatch(Msg::DisplayClicked);
    }
    if let Some(target) = settings.open_after_run {
        app.dispatch(Msg::OpenClicked(target));
    }
    ui.finish();

    let view = app.state.view();
    println!("Status: {}", view.status());
    println!("Found: {}", view.found);
    Ok(exit_code(view.last_outcome.as_ref()))
}

struct App {
    state: AppState,
    runner: EffectRunner,
    ui: Arc<TerminalUi>,
}

impl App {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            self.ui.render(&state.view());
        }
        self.state = state;
        self.runner.enqueue(effects);
    }
}

/// Any line on stdin (including an empty one) stops the run. EOF does not.
fn spawn_stop_listener(msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => return,
                Ok(_) => {
                    engine_debug!("Stop requested from terminal");
                    if msg_tx.send(Msg::StopClicked).is_err() {
                        return;
                    }
                }
            }
        }
    });
}

fn exit_code(outcome: Option<&RunOutcome>) -> ExitCode {
    match outcome {
        Some(RunOutcome::Completed) | Some(RunOutcome::Stopped) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}
