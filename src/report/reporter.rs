// src/report/reporter.rs

//! The polling reporter task.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use crate::report::snapshot::StatusSnapshot;

/// Consumer of status snapshots.
///
/// Implementations render or publish a snapshot somewhere (console, log,
/// metrics); the concrete rendering is outside the engine's
/// responsibility. `publish` is called from the reporter task at each
/// tick with the latest snapshot.
pub trait StatusSink: Send {
    fn publish(&mut self, snapshot: &StatusSnapshot);
}

/// Spawn the reporter on its own task.
///
/// Polls the watch channel at the given interval and hands the latest
/// snapshot to the sink. Exits after publishing a snapshot marked
/// finished. The reporter only ever reads; it cannot affect scheduling.
pub fn spawn_reporter<S>(
    mut status_rx: watch::Receiver<StatusSnapshot>,
    mut sink: S,
    period: Duration,
) -> JoinHandle<()>
where
    S: StatusSink + 'static,
{
    tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let snapshot = status_rx.borrow_and_update().clone();
            sink.publish(&snapshot);
            if snapshot.finished {
                break;
            }
        }

        debug!("status reporter stopped");
    })
}
