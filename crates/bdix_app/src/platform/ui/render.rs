use bdix_core::{AppViewModel, Severity};

/// Message shown next to the progress bar.
pub fn progress_message(view: &AppViewModel) -> String {
    let category = view.run_category.unwrap_or(view.category);
    match &view.last_found {
        Some(last) if view.is_running() => {
            format!("{category} | Found: {} | last: {last}", view.found)
        }
        _ => format!("{category} | Found: {} | {}", view.found, view.status()),
    }
}

pub fn notice_line(severity: Severity, message: &str) -> String {
    match severity {
        Severity::Information => format!("[info] {message}"),
        Severity::Error => format!("[error] {message}"),
    }
}

pub fn endpoint_listing(endpoints: &[String]) -> String {
    let mut out = format!("Working servers ({}):", endpoints.len());
    for (index, endpoint) in endpoints.iter().enumerate() {
        out.push_str(&format!("\n{:>4}. {endpoint}", index + 1));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdix_core::{update, AppState, Category, Msg, RunOutcome};

    #[test]
    fn running_message_shows_last_found_endpoint() {
        let (state, _) = update(AppState::with_category(Category::Tv), Msg::StartClicked);
        let (state, _) = update(
            state,
            Msg::EndpointFound {
                run_id: 1,
                endpoint: "http://tv1.example".to_string(),
                found: 1,
            },
        );
        assert_eq!(
            progress_message(&state.view()),
            "TV | Found: 1 | last: http://tv1.example"
        );
    }

    #[test]
    fn idle_message_shows_final_status() {
        let (state, _) = update(AppState::new(), Msg::StartClicked);
        let (state, _) = update(
            state,
            Msg::RunFinished {
                run_id: 1,
                outcome: RunOutcome::CategoryNotFound,
            },
        );
        assert_eq!(
            progress_message(&state.view()),
            "FTP | Found: 0 | category-not-found"
        );
    }

    #[test]
    fn listing_numbers_endpoints_in_order() {
        let listing = endpoint_listing(&["http://a".to_string(), "http://b".to_string()]);
        assert_eq!(listing, "Working servers (2):\n   1. http://a\n   2. http://b");
        assert_eq!(
            notice_line(Severity::Error, "boom"),
            "[error] boom".to_string()
        );
    }
}
