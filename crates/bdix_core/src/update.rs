use engine_logging::{engine_debug, engine_info};

use crate::{AppState, Effect, Msg, OpenTarget, RunOutcome, RunState, Severity};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::CategorySelected(category) => {
            if state.run_state() == RunState::Idle {
                state.select_category(category);
            }
            Vec::new()
        }
        Msg::StartClicked => {
            if state.run_state() == RunState::Idle {
                let run_id = state.begin_run();
                let category = state.category();
                engine_info!("Starting run {} for category {}", run_id, category);
                vec![Effect::StartRun { run_id, category }]
            } else {
                Vec::new()
            }
        }
        Msg::StopClicked => match (state.run_state(), state.current_run()) {
            (RunState::Running, Some(run_id)) => {
                engine_info!("Stopping run {}", run_id);
                state.end_run(RunOutcome::Stopped);
                vec![
                    Effect::StopRun { run_id },
                    Effect::Notify {
                        severity: Severity::Information,
                        message: "Testing Stopped!".to_string(),
                    },
                ]
            }
            _ => Vec::new(),
        },
        Msg::SaveClicked => {
            if state.found() == 0 {
                vec![info("No working servers to save.")]
            } else {
                vec![Effect::SaveResults]
            }
        }
        Msg::DisplayClicked => {
            if state.found() == 0 {
                vec![info("No working servers to display.")]
            } else {
                vec![Effect::DisplayResults]
            }
        }
        Msg::OpenClicked(target) => {
            let found = state.found();
            match target {
                _ if found == 0 => vec![info("No working servers to open.")],
                OpenTarget::Index(index) if index > found => vec![Effect::Notify {
                    severity: Severity::Error,
                    message: format!("No working server #{index}; {found} found."),
                }],
                target => vec![Effect::OpenResults(target)],
            }
        }
        Msg::RunProgress { run_id, percent } => {
            if state.is_current(run_id) {
                state.apply_progress(percent);
            } else {
                engine_debug!("Ignoring progress from stale run {}", run_id);
            }
            Vec::new()
        }
        Msg::EndpointFound {
            run_id,
            endpoint,
            found,
        } => {
            if state.is_current(run_id) {
                state.apply_found(endpoint, found);
            } else {
                engine_debug!("Ignoring found endpoint from stale run {}", run_id);
            }
            Vec::new()
        }
        Msg::RunFinished { run_id, outcome } => {
            if state.is_current(run_id) && state.run_state() == RunState::Running {
                let notice = finish_notice(&state, &outcome);
                state.end_run(outcome);
                notice.into_iter().collect()
            } else {
                // Already stopped by the user, or a stale run.
                Vec::new()
            }
        }
        Msg::ProgressReset { run_id } => {
            if state.is_current(run_id) {
                state.reset_progress();
            }
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn finish_notice(state: &AppState, outcome: &RunOutcome) -> Option<Effect> {
    match outcome {
        RunOutcome::Completed => Some(info("Testing Completed!")),
        RunOutcome::Stopped => None,
        RunOutcome::CategoryNotFound => {
            let category = state.run_category().unwrap_or(state.category());
            Some(Effect::Notify {
                severity: Severity::Error,
                message: format!("No servers found for the category: {category}"),
            })
        }
        RunOutcome::FetchFailed { .. } => Some(Effect::Notify {
            severity: Severity::Error,
            message: "Failed to fetch server list from the URL.".to_string(),
        }),
    }
}

fn info(message: &str) -> Effect {
    Effect::Notify {
        severity: Severity::Information,
        message: message.to_string(),
    }
}
