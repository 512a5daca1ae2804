use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use bdix_engine::{
    run_probes, ProbeFailure, ProbeResult, ProbeSettings, Prober, ReqwestProber, ResultStore,
    RunContext, RunObserver,
};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Answers from a fixed table and records the URLs it was asked about.
#[derive(Default)]
struct ScriptedProber {
    reachable: Vec<String>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProber {
    fn reachable(urls: &[&str]) -> Self {
        Self {
            reachable: urls.iter().map(|u| u.to_string()).collect(),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, url: &str) -> ProbeResult {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        if self.reachable.iter().any(|r| r == url) {
            ProbeResult::Reachable
        } else {
            ProbeResult::Unreachable(ProbeFailure::Network)
        }
    }
}

/// Records callbacks; optionally cancels after `cancel_after` progress reports.
struct RecordingObserver {
    progress: Mutex<Vec<u8>>,
    found: Mutex<Vec<(String, usize)>>,
    reports: AtomicUsize,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl RecordingObserver {
    fn new() -> Self {
        Self {
            progress: Mutex::new(Vec::new()),
            found: Mutex::new(Vec::new()),
            reports: AtomicUsize::new(0),
            cancel_after: None,
        }
    }

    fn cancelling_after(n: usize, token: CancellationToken) -> Self {
        Self {
            cancel_after: Some((n, token)),
            ..Self::new()
        }
    }

    fn progress(&self) -> Vec<u8> {
        self.progress.lock().unwrap().clone()
    }

    fn found(&self) -> Vec<(String, usize)> {
        self.found.lock().unwrap().clone()
    }
}

impl RunObserver for RecordingObserver {
    fn on_progress(&self, percent: u8) {
        self.progress.lock().unwrap().push(percent);
        let reports = self.reports.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((n, token)) = &self.cancel_after {
            if reports == *n {
                token.cancel();
            }
        }
    }

    fn on_found(&self, endpoint: &str, count: usize) {
        self.found.lock().unwrap().push((endpoint.to_string(), count));
    }
}

fn hosts(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[tokio::test]
async fn probes_in_order_with_normalized_urls() {
    engine_logging::initialize_for_tests();
    let prober = ScriptedProber::reachable(&["http://b.example", "https://d.example"]);
    let store = ResultStore::new();
    store.reset(1);
    let cancel = CancellationToken::new();
    let observer = RecordingObserver::new();
    let endpoints = hosts(&["a.example", "b.example", "http://c.example", "https://d.example"]);

    let summary = run_probes(
        &prober,
        &endpoints,
        RunContext {
            run_id: 1,
            store: &store,
            cancel: &cancel,
            observer: &observer,
            concurrency: 1,
        },
    )
    .await;

    assert_eq!(
        prober.calls(),
        hosts(&[
            "http://a.example",
            "http://b.example",
            "http://c.example",
            "https://d.example"
        ])
    );
    assert_eq!(observer.progress(), vec![25, 50, 75, 100]);
    assert_eq!(
        observer.found(),
        vec![
            ("http://b.example".to_string(), 1),
            ("https://d.example".to_string(), 2)
        ]
    );
    assert_eq!(
        store.snapshot(),
        hosts(&["http://b.example", "https://d.example"])
    );
    assert_eq!(summary.total, 4);
    assert_eq!(summary.probed, 4);
    assert_eq!(summary.found, 2);
    assert!(!summary.stopped);
}

#[tokio::test]
async fn empty_list_completes_immediately() {
    let prober = ScriptedProber::default();
    let store = ResultStore::new();
    store.reset(1);
    let cancel = CancellationToken::new();
    let observer = RecordingObserver::new();

    let summary = run_probes(
        &prober,
        &[],
        RunContext {
            run_id: 1,
            store: &store,
            cancel: &cancel,
            observer: &observer,
            concurrency: 1,
        },
    )
    .await;

    assert_eq!(observer.progress(), vec![0]);
    assert!(observer.found().is_empty());
    assert!(prober.calls().is_empty());
    assert_eq!(summary.found, 0);
    assert!(!summary.stopped);
}

#[tokio::test]
async fn stop_after_n_probes_launches_no_more() {
    let endpoints = hosts(&["e1", "e2", "e3", "e4", "e5", "e6"]);
    let prober = ScriptedProber::reachable(&["http://e1", "http://e3", "http://e5"]);
    let store = ResultStore::new();
    store.reset(7);
    let cancel = CancellationToken::new();
    let observer = RecordingObserver::cancelling_after(3, cancel.clone());

    let summary = run_probes(
        &prober,
        &endpoints,
        RunContext {
            run_id: 7,
            store: &store,
            cancel: &cancel,
            observer: &observer,
            concurrency: 1,
        },
    )
    .await;

    let calls = prober.calls();
    assert!(calls.len() <= 4, "probed {calls:?}");
    assert_eq!(calls, hosts(&["http://e1", "http://e2", "http://e3"]));
    assert_eq!(store.snapshot(), hosts(&["http://e1", "http://e3"]));
    assert_eq!(observer.progress(), vec![16, 33, 50]);
    assert!(summary.stopped);
    assert_eq!(summary.probed, 3);
}

#[tokio::test]
async fn already_cancelled_run_probes_nothing() {
    let prober = ScriptedProber::reachable(&["http://e1"]);
    let store = ResultStore::new();
    store.reset(1);
    let cancel = CancellationToken::new();
    cancel.cancel();
    let observer = RecordingObserver::new();

    let summary = run_probes(
        &prober,
        &hosts(&["e1", "e2"]),
        RunContext {
            run_id: 1,
            store: &store,
            cancel: &cancel,
            observer: &observer,
            concurrency: 1,
        },
    )
    .await;

    assert!(prober.calls().is_empty());
    assert!(observer.progress().is_empty());
    assert!(store.is_empty());
    assert!(summary.stopped);
}

#[tokio::test]
async fn bounded_concurrency_keeps_list_order() {
    let endpoints = hosts(&["s1", "s2", "s3", "s4", "s5", "s6"]);
    let mut prober = ScriptedProber::reachable(&[
        "http://s1",
        "http://s2",
        "http://s3",
        "http://s4",
        "http://s5",
        "http://s6",
    ]);
    // Earlier entries answer slower than later ones.
    for (i, url) in ["http://s1", "http://s2", "http://s3"].iter().enumerate() {
        prober
            .delays
            .insert(url.to_string(), Duration::from_millis(60 - 20 * i as u64));
    }
    let store = ResultStore::new();
    store.reset(1);
    let cancel = CancellationToken::new();
    let observer = RecordingObserver::new();

    let summary = run_probes(
        &prober,
        &endpoints,
        RunContext {
            run_id: 1,
            store: &store,
            cancel: &cancel,
            observer: &observer,
            concurrency: 3,
        },
    )
    .await;

    assert_eq!(
        store.snapshot(),
        hosts(&[
            "http://s1",
            "http://s2",
            "http://s3",
            "http://s4",
            "http://s5",
            "http://s6"
        ])
    );
    let progress = observer.progress();
    assert!(progress.windows(2).all(|w| w[0] <= w[1]), "{progress:?}");
    assert_eq!(progress.last(), Some(&100));
    assert_eq!(summary.found, 6);
}

#[tokio::test]
async fn stale_run_writes_are_not_recorded() {
    let prober = ScriptedProber::reachable(&["http://e1"]);
    let store = ResultStore::new();
    store.reset(2);
    let cancel = CancellationToken::new();
    let observer = RecordingObserver::new();

    let summary = run_probes(
        &prober,
        &hosts(&["e1"]),
        RunContext {
            run_id: 1,
            store: &store,
            cancel: &cancel,
            observer: &observer,
            concurrency: 1,
        },
    )
    .await;

    assert!(store.is_empty());
    assert!(observer.found().is_empty());
    assert_eq!(summary.found, 0);
}

#[tokio::test]
async fn real_probes_against_mock_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/srv1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/srv2"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    // Strip the scheme so the loop has to add it back.
    let authority = server
        .uri()
        .trim_start_matches("http://")
        .to_string();
    let endpoints = vec![format!("{authority}/srv1"), format!("{authority}/srv2")];

    let prober = ReqwestProber::new(&ProbeSettings {
        timeout: Duration::from_millis(100),
        ..ProbeSettings::default()
    })
    .expect("client");
    let store = ResultStore::new();
    store.reset(1);
    let cancel = CancellationToken::new();
    let observer = RecordingObserver::new();

    let summary = run_probes(
        &prober,
        &endpoints,
        RunContext {
            run_id: 1,
            store: &store,
            cancel: &cancel,
            observer: &observer,
            concurrency: 1,
        },
    )
    .await;

    assert_eq!(store.snapshot(), vec![format!("http://{authority}/srv1")]);
    assert_eq!(observer.progress(), vec![50, 100]);
    assert!(!summary.stopped);
}
