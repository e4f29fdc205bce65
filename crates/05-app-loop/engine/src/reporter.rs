use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::select;
use frame_metrics::PipelineMetrics;
use log::info;
use tick_clock::CancelToken;

/// Starts a thread that logs the metrics of each `period` window until
/// `cancel` fires.
pub(crate) fn spawn(
    period: Duration,
    metrics: Arc<PipelineMetrics>,
    cancel: CancelToken,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("metrics-reporter".into())
        .spawn(move || report(period, &metrics, &cancel))
}

fn report(period: Duration, metrics: &PipelineMetrics, cancel: &CancelToken) {
    let mut last = metrics.snapshot();
    loop {
        let stopped = select! {
            recv(cancel.cancelled()) -> _ => true,
            default(period) => false,
        };
        if stopped {
            break;
        }
        let now = metrics.snapshot();
        info!("pipeline metrics over {period:?}: {}", now.since(&last));
        last = now;
    }
}
