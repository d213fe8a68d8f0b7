//! Background task driving the vehicle simulator at a fixed period

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::RwLock,
    time::{Instant, MissedTickBehavior},
};
use tracing::trace;
use transito_core::Simulator;

/// Advances the simulator once per `period` until the task is dropped.
///
/// Elapsed time is measured between ticks, so a delayed tick moves vehicles
/// by the real time that passed.
pub async fn run_simulation(simulator: Arc<RwLock<Simulator>>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // first tick completes immediately
    interval.tick().await;
    let mut last = Instant::now();

    loop {
        interval.tick().await;
        let now = Instant::now();
        let elapsed = now.duration_since(last).as_secs_f64();
        last = now;

        let updated = simulator.write().await.tick(elapsed);
        trace!(vehicles = updated.len(), elapsed, "Simulation tick");
    }
}
