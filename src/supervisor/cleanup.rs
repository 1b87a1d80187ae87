use std::time::Duration;

use crate::runtime::Runtime;

use super::LiveSet;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: Vec<String>,
    /// Containers that were already gone when cleanup reached them.
    pub vanished: Vec<String>,
    pub failed: Vec<String>,
}

/// Stops and removes every container left in the live set.
///
/// Each entry leaves the live set as soon as cleanup has dealt with it, whether or not the runtime
/// calls succeeded, so running cleanup a second time is a no-op.
#[derive(Debug)]
pub struct CleanupCoordinator<'a, R> {
    runtime: &'a R,
    stop_timeout: Duration,
}

impl<'a, R: Runtime> CleanupCoordinator<'a, R> {
    pub fn new(runtime: &'a R, stop_timeout: Duration) -> Self {
        Self {
            runtime,
            stop_timeout,
        }
    }

    pub async fn cleanup(&self, live: &mut LiveSet) -> CleanupReport {
        let mut report = CleanupReport::default();
        if live.is_empty() {
            log::info!("No containers to clean up.");
            return report;
        }

        log::info!("Starting cleanup of {} launched containers...", live.len());
        while let Some(container) = live.take_oldest() {
            let id = container.runtime_id();

            log::info!("Stopping container {}...", container);
            match self.runtime.stop(id, self.stop_timeout).await {
                Ok(()) => {}
                Err(err) if err.is_not_found() => {
                    log::warn!(
                        "Container {} was already removed or never existed. Skipping cleanup.",
                        container
                    );
                    report.vanished.push(container.spec_name().to_owned());
                    continue;
                }
                Err(err) => log::error!(
                    "Failed to stop container {}, removing it forcefully: {}",
                    container,
                    err
                ),
            }

            log::info!("Removing container {}...", container);
            match self.runtime.remove(id).await {
                Ok(()) => {
                    log::info!("Container {} removed.", container);
                    report.removed.push(container.spec_name().to_owned());
                }
                Err(err) if err.is_not_found() => {
                    log::warn!("Container {} was already removed.", container);
                    report.vanished.push(container.spec_name().to_owned());
                }
                Err(err) => {
                    log::error!("Error during cleanup of container {}: {}", container, err);
                    report.failed.push(container.spec_name().to_owned());
                }
            }
        }

        if report.failed.is_empty() {
            log::info!("All launched containers have been cleaned up.");
        } else {
            log::warn!(
                "Cleanup finished, but {} containers could not be removed: {:?}",
                report.failed.len(),
                report.failed
            );
        }
        report
    }
}
