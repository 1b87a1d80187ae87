use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use tokio::sync::watch;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::runtime::Runtime;

use super::{CleanupCoordinator, CleanupReport, HealthMonitor, LiveSet, Reconciler};

/// One supervisor run: owns the live set from launch until cleanup.
///
/// [`Session::cleanup`] must be awaited before the session is dropped. A session dropped with
/// containers still tracked logs every container it leaks.
#[derive(Debug)]
pub struct Session<'a, R: Runtime> {
    runtime: &'a R,
    config: &'a Config,
    live: LiveSet,
}

impl<'a, R: Runtime> Session<'a, R> {
    pub fn new(runtime: &'a R, config: &'a Config) -> Self {
        Self {
            runtime,
            config,
            live: LiveSet::new(),
        }
    }

    /// Runs a complete session: launch and monitor, then clean up.
    ///
    /// Cleanup runs on every path out of the supervise phase. A panic raised while supervising is
    /// resumed once cleanup has finished. Cleanup never changes the returned outcome.
    pub async fn run(
        runtime: &'a R,
        config: &'a Config,
        shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        let mut session = Self::new(runtime, config);
        let outcome = AssertUnwindSafe(session.supervise(shutdown))
            .catch_unwind()
            .await;
        session.cleanup().await;

        match outcome {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    pub fn live(&self) -> &LiveSet {
        &self.live
    }

    /// Launches the configured containers and monitors them until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingLaunched`] if no container could be launched. Monitoring is not
    /// started in that case.
    pub async fn supervise(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        Reconciler::new(self.runtime, self.config.stop_timeout())
            .reconcile(&self.config.containers, &mut self.live)
            .await;

        if self.live.is_empty() {
            log::error!("No containers were successfully launched. Monitoring aborted.");
            return Err(Error::NothingLaunched);
        }
        if *shutdown.borrow_and_update() {
            log::info!("Shutdown requested during launch, skipping monitoring.");
            return Ok(());
        }

        HealthMonitor::new(
            self.runtime,
            self.config.poll_interval(),
            self.config.failure_threshold,
        )
        .run(&mut self.live, &mut shutdown)
        .await;

        Ok(())
    }

    /// Tears down every container still tracked. Safe to call more than once.
    pub async fn cleanup(&mut self) -> CleanupReport {
        CleanupCoordinator::new(self.runtime, self.config.stop_timeout())
            .cleanup(&mut self.live)
            .await
    }
}

impl<R: Runtime> Drop for Session<'_, R> {
    fn drop(&mut self) {
        for container in self.live.iter() {
            log::warn!(
                "Session dropped without cleanup, container {} is left behind",
                container
            );
        }
    }
}
