use std::time::Duration;

use tokio::sync::watch;

use crate::container::{ContainerID, ContainerStatus};
use crate::runtime::{self, Runtime};

use super::LiveSet;

/// Outcome of a single pass over the live set.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub checked: usize,
    pub running: usize,
    /// Names of containers that disappeared and were pruned during this tick.
    pub vanished: Vec<String>,
    /// At least one container was not running or could not be inspected.
    pub degraded: bool,
}

/// Periodically polls every tracked container and reports anything that is not running.
///
/// The monitor only detects and logs. It never restarts containers.
#[derive(Debug)]
pub struct HealthMonitor<'a, R> {
    runtime: &'a R,
    interval: Duration,
    failure_threshold: u32,
}

impl<'a, R: Runtime> HealthMonitor<'a, R> {
    pub fn new(runtime: &'a R, interval: Duration, failure_threshold: u32) -> Self {
        Self {
            runtime,
            interval,
            failure_threshold,
        }
    }

    /// Runs ticks until `shutdown` flips to `true` or its sender goes away.
    ///
    /// A shutdown request never interrupts a tick; it is honored once the current pass over the
    /// live set is complete.
    pub async fn run(&self, live: &mut LiveSet, shutdown: &mut watch::Receiver<bool>) {
        log::info!(
            "Starting container monitoring (checking every {} seconds)...",
            self.interval.as_secs_f64()
        );
        if live.is_empty() {
            log::warn!("No containers were launched to monitor.");
            return;
        }

        loop {
            self.tick(live).await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.wait_for(|requested| *requested) => break,
            }
        }

        log::info!("Monitoring interrupted, exiting monitoring loop.");
    }

    /// Reloads every tracked container once.
    ///
    /// The pass walks a snapshot of the live set. Containers the runtime no longer knows are
    /// pruned after the pass.
    pub async fn tick(&self, live: &mut LiveSet) -> TickReport {
        let mut report = TickReport::default();
        let mut vanished: Vec<ContainerID> = Vec::new();

        for container in live.snapshot() {
            report.checked += 1;
            let id = container.runtime_id();

            match self.runtime.reload(id).await {
                Ok(status) => {
                    if let Some(tracked) = live.get_mut(id) {
                        tracked.observe(status);
                    }
                    if status.is_running() {
                        report.running += 1;
                        log::info!("Container {} is RUNNING.", container);
                    } else {
                        report.degraded = true;
                        log::error!(
                            "Container {} is in status: {}. INVESTIGATE!",
                            container,
                            status
                        );
                    }
                }
                Err(runtime::Error::NotFound(_)) => {
                    report.degraded = true;
                    log::error!(
                        "Container {} NO LONGER EXISTS. It might have stopped and been removed unexpectedly.",
                        container
                    );
                    if let Some(tracked) = live.get_mut(id) {
                        tracked.observe(ContainerStatus::Removed);
                    }
                    vanished.push(id.clone());
                }
                Err(err) => {
                    report.degraded = true;
                    log::error!(
                        "API error while monitoring container {}: {}",
                        container,
                        err
                    );
                    let failures = live.get_mut(id).map_or(0, |tracked| tracked.record_failure());
                    if self.failure_threshold > 0 && failures == self.failure_threshold {
                        log::error!(
                            "Container {} could not be inspected for {} consecutive ticks. Is the runtime healthy?",
                            container,
                            failures
                        );
                    }
                }
            }
        }

        for id in vanished {
            if let Some(container) = live.remove(&id) {
                report.vanished.push(container.spec_name().to_owned());
            }
        }

        if report.degraded {
            log::warn!(
                "One or more containers are not in 'running' state. Check logs for details."
            );
        }
        report
    }
}
