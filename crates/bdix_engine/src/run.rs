use std::pin::pin;

use engine_logging::engine_trace;
use futures_util::{future, stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::probe::{normalize_endpoint, Prober};
use crate::{ResultStore, RunId, RunSummary};

/// Receives per-run progress from the probe loop.
pub trait RunObserver: Send + Sync {
    fn on_progress(&self, percent: u8);
    fn on_found(&self, endpoint: &str, count: usize);
}

pub struct RunContext<'a> {
    pub run_id: RunId,
    pub store: &'a ResultStore,
    pub cancel: &'a CancellationToken,
    pub observer: &'a dyn RunObserver,
    pub concurrency: usize,
}

/// `index * 100 / total`, exactly 100 on the last entry. 0 for an empty list.
pub fn progress_percent(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (index.min(total) * 100 / total) as u8
}

/// Probes `endpoints` in order until done or `ctx.cancel` fires.
///
/// The token is checked before each probe is launched; probes already in
/// flight finish and are recorded. With `concurrency` k, at most k probes
/// start after the token is set (one with the sequential default). Results are
/// consumed in list order so the store keeps list order and progress never
/// decreases.
pub async fn run_probes(
    prober: &dyn Prober,
    endpoints: &[String],
    ctx: RunContext<'_>,
) -> RunSummary {
    let total = endpoints.len();
    let mut summary = RunSummary {
        total,
        ..RunSummary::default()
    };
    let cancel = ctx.cancel;

    if total == 0 {
        ctx.observer.on_progress(0);
        summary.stopped = cancel.is_cancelled();
        return summary;
    }

    let mut probes = pin!(stream::iter(endpoints)
        .take_while(move |_| future::ready(!cancel.is_cancelled()))
        .map(move |endpoint| async move {
            let url = normalize_endpoint(endpoint);
            let result = prober.probe(&url).await;
            (url, result)
        })
        .buffered(ctx.concurrency.max(1))
        .boxed());

    while let Some((url, result)) = probes.next().await {
        summary.probed += 1;
        engine_trace!("Run {} probed {}: {:?}", ctx.run_id, url, result);
        if result.is_reachable() {
            if let Some(count) = ctx.store.add(ctx.run_id, url.as_str()) {
                summary.found = count;
                ctx.observer.on_found(&url, count);
            }
        }
        ctx.observer.on_progress(progress_percent(summary.probed, total));
    }

    summary.stopped = cancel.is_cancelled();
    summary
}
