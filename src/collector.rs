use std::sync::{ Arc, Mutex, MutexGuard, PoisonError };
use tokio::{ sync::mpsc::UnboundedReceiver, task::JoinHandle };

use crate::hit::Hit;
use crate::report::StageReport;

/// A stage that several producers can feed at once.
///
/// The first recorded hit opens the stage. Prefer one `StageReport` per worker
/// merged at the end; this is for producers that cannot be sharded.
#[derive(Debug, Clone, Default)]
pub struct SharedStage {
    report: Arc<Mutex<Option<StageReport>>>, // None until the first hit
}

impl SharedStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, hit: &Hit) {
        let mut report = self.lock();
        match report.as_mut() {
            Some(stage) => {
                stage.update(hit);
            }
            None => {
                *report = Some(StageReport::new(hit));
            }
        }
    }

    /// Copy of the stage so far, None if nothing was recorded yet
    pub fn snapshot(&self) -> Option<StageReport> {
        self.lock().clone()
    }

    // a panicking producer can't leave the counters half-written, so keep going
    fn lock(&self) -> MutexGuard<'_, Option<StageReport>> {
        self.report.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Drain hits from a channel into a single stage, in arrival order.
///
/// The task finishes once every sender is dropped and yields the closed
/// stage, or None when no hit ever arrived.
pub fn spawn_collector(mut hits: UnboundedReceiver<Hit>) -> JoinHandle<Option<StageReport>> {
    tokio::spawn(async move {
        let mut report: Option<StageReport> = None;
        while let Some(hit) = hits.recv().await {
            match report.as_mut() {
                Some(stage) => {
                    stage.update(&hit);
                }
                None => {
                    report = Some(StageReport::new(&hit));
                }
            }
        }
        tracing::debug!(
            hits = report.as_ref().map_or(0, StageReport::count),
            "Collector channel closed"
        );
        report
    })
}
