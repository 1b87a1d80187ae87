use std::time::Duration;

use crate::container::ContainerSpec;
use crate::error::ResultLogExt;
use crate::runtime::{self, Runtime};

use super::{LiveSet, TrackedContainer};

/// Outcome of one launch pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub launched: Vec<String>,
    pub failed: Vec<String>,
}

/// Brings the runtime in line with the desired specs at startup.
///
/// Specs are processed one at a time in the given order. A failing spec is logged and skipped;
/// it never prevents the remaining specs from being launched.
#[derive(Debug)]
pub struct Reconciler<'a, R> {
    runtime: &'a R,
    stop_timeout: Duration,
}

impl<'a, R: Runtime> Reconciler<'a, R> {
    pub fn new(runtime: &'a R, stop_timeout: Duration) -> Self {
        Self {
            runtime,
            stop_timeout,
        }
    }

    pub async fn reconcile(&self, specs: &[ContainerSpec], live: &mut LiveSet) -> ReconcileReport {
        log::info!("Attempting to launch {} containers...", specs.len());
        let mut report = ReconcileReport::default();

        for spec in specs {
            self.remove_stale(spec).await;

            match self.runtime.run(spec).await {
                Ok(launched) => {
                    let container = TrackedContainer::new(&spec.name, launched.id, launched.status);
                    log::info!(
                        "Launched container {} using image '{}'. Status: {}",
                        container,
                        spec.image,
                        container.last_known_status()
                    );
                    live.insert(container);
                    report.launched.push(spec.name.clone());
                }
                Err(runtime::Error::ImageNotFound(image)) => {
                    log::error!(
                        "Image '{}' not found for container '{}'. Please pull it first (e.g., 'docker pull {}').",
                        image,
                        spec.name,
                        image
                    );
                    report.failed.push(spec.name.clone());
                }
                Err(err) => {
                    log::error!("Failed to launch container '{}': {}", spec.name, err);
                    report.failed.push(spec.name.clone());
                }
            }
        }

        log::info!(
            "Launched {} of {} containers",
            report.launched.len(),
            specs.len()
        );
        report
    }

    /// Stops and removes a leftover container that already carries `spec.name`.
    async fn remove_stale(&self, spec: &ContainerSpec) {
        let stale = match self.runtime.find_by_name(&spec.name).await {
            Ok(id) => id,
            Err(err) if err.is_not_found() => return,
            Err(err) => {
                log::error!(
                    "Failed to look up existing container '{}': {}",
                    spec.name,
                    err
                );
                return;
            }
        };

        log::warn!(
            "Existing container '{}' (ID: {}) found. Stopping and removing it.",
            spec.name,
            stale.short()
        );
        match self.runtime.stop(&stale, self.stop_timeout).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => return,
            Err(err) => log::error!(
                "Failed to stop existing container '{}' (ID: {}): {}",
                spec.name,
                stale.short(),
                err
            ),
        }
        self.runtime.remove(&stale).await.log_err(format_args!(
            "Failed to remove existing container '{}' (ID: {})",
            spec.name,
            stale.short()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerStatus;
    use crate::runtime::fake::{Call, FakeRuntime, Failure};

    fn spec(name: &str) -> ContainerSpec {
        ContainerSpec::new(name, "alpine", ["sleep", "infinity"])
    }

    #[tokio::test]
    async fn test_launches_all_specs_in_order() {
        let runtime = FakeRuntime::new();
        let reconciler = Reconciler::new(&runtime, Duration::from_secs(5));
        let mut live = LiveSet::new();

        let report = reconciler
            .reconcile(&[spec("a"), spec("b")], &mut live)
            .await;

        assert_eq!(report.launched, ["a", "b"]);
        assert!(report.failed.is_empty());
        let names: Vec<_> = live.iter().map(TrackedContainer::spec_name).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(
            runtime.calls(),
            [
                Call::FindByName("a".into()),
                Call::Run("a".into()),
                Call::FindByName("b".into()),
                Call::Run("b".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_stale_container_is_replaced() {
        let runtime = FakeRuntime::new();
        let stale = runtime.with_existing("x");
        let reconciler = Reconciler::new(&runtime, Duration::from_secs(5));
        let mut live = LiveSet::new();

        reconciler.reconcile(&[spec("x")], &mut live).await;

        assert_eq!(
            runtime.calls(),
            [
                Call::FindByName("x".into()),
                Call::Stop(stale.clone()),
                Call::Remove(stale.clone()),
                Call::Run("x".into()),
            ]
        );
        assert_eq!(live.len(), 1);
        let tracked = live.iter().next().unwrap();
        assert_eq!(tracked.spec_name(), "x");
        assert_ne!(tracked.runtime_id(), &stale);
    }

    #[tokio::test]
    async fn test_stale_container_vanished_before_stop_is_not_removed() {
        let runtime = FakeRuntime::new();
        let stale = runtime.with_existing("x");
        runtime.fail_stop(&stale, Failure::NotFound);
        let reconciler = Reconciler::new(&runtime, Duration::from_secs(5));
        let mut live = LiveSet::new();

        reconciler.reconcile(&[spec("x")], &mut live).await;

        assert!(!runtime.calls().contains(&Call::Remove(stale)));
        assert_eq!(live.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_stale_stop_still_removes() {
        let runtime = FakeRuntime::new();
        let stale = runtime.with_existing("x");
        runtime.fail_stop(&stale, Failure::Api);
        let reconciler = Reconciler::new(&runtime, Duration::from_secs(5));
        let mut live = LiveSet::new();

        reconciler.reconcile(&[spec("x")], &mut live).await;

        assert!(runtime.calls().contains(&Call::Remove(stale)));
        assert_eq!(live.len(), 1);
    }

    #[tokio::test]
    async fn test_partial_failure_is_isolated() {
        let runtime = FakeRuntime::new();
        runtime.fail_run("second", Failure::ImageNotFound);
        let reconciler = Reconciler::new(&runtime, Duration::from_secs(5));
        let mut live = LiveSet::new();

        let report = reconciler
            .reconcile(&[spec("first"), spec("second"), spec("third")], &mut live)
            .await;

        let names: Vec<_> = live.iter().map(TrackedContainer::spec_name).collect();
        assert_eq!(names, ["first", "third"]);
        assert_eq!(report.failed, ["second"]);
    }

    #[tokio::test]
    async fn test_api_failure_is_isolated() {
        let runtime = FakeRuntime::new();
        runtime.fail_run("a", Failure::Api);
        let reconciler = Reconciler::new(&runtime, Duration::from_secs(5));
        let mut live = LiveSet::new();

        let report = reconciler
            .reconcile(&[spec("a"), spec("b")], &mut live)
            .await;

        assert_eq!(report.launched, ["b"]);
        assert_eq!(report.failed, ["a"]);
        assert_eq!(
            live.iter().next().unwrap().last_known_status(),
            ContainerStatus::Running
        );
    }

    #[tokio::test]
    async fn test_no_specs_launches_nothing() {
        let runtime = FakeRuntime::new();
        let reconciler = Reconciler::new(&runtime, Duration::from_secs(5));
        let mut live = LiveSet::new();

        let report = reconciler.reconcile(&[], &mut live).await;

        assert!(live.is_empty());
        assert_eq!(report, ReconcileReport::default());
        assert!(runtime.calls().is_empty());
    }
}
