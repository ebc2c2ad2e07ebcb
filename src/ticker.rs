//! Real-time timing source
//!
//! Drives a shared [`SimulationController`] from a tokio interval whose period
//! is the simulation time step. After every step that ran, the new layout is
//! published on a watch channel so readers never lock the controller.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use crate::controller::SimulationController;
use crate::snapshot::LayoutSnapshot;

/// Controller shared between the ticker and anything that rebuilds or
/// toggles it. Holding the lock makes a rebuild atomic with respect to ticks.
pub type SharedController = Arc<Mutex<SimulationController>>;

/// Publishing side of the layout feed, shared by the ticker and rebuilders
pub type SnapshotSender = Arc<watch::Sender<LayoutSnapshot>>;

/// Wrap a controller for sharing with the ticker
pub fn shared(controller: SimulationController) -> SharedController {
    Arc::new(Mutex::new(controller))
}

/// Tick `controller` every `period` until `shutdown` flips to `true` or its
/// sender is dropped. Returns the number of steps that ran.
pub async fn run_ticker(
    controller: SharedController,
    period: Duration,
    snapshots: SnapshotSender,
    mut shutdown: watch::Receiver<bool>,
) -> u64 {
    let mut interval = time::interval(period);
    // A late tick is dropped rather than replayed in a burst
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut steps = 0;

    debug!(?period, "ticker started");
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let mut guard = controller.lock().await;
                if guard.tick() {
                    steps += 1;
                    snapshots.send_replace(guard.snapshot());
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    debug!(steps, "ticker stopped");
    steps
}

/// Publish the controller's current layout, e.g. after a rebuild or a stop
pub async fn publish(controller: &SharedController, snapshots: &SnapshotSender) {
    let snapshot = controller.lock().await.snapshot();
    snapshots.send_replace(snapshot);
}
