use std::fmt;

use crate::container::{ContainerID, ContainerStatus};

/// A container launched by this supervisor run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedContainer {
    spec_name: String,
    runtime_id: ContainerID,
    last_known_status: ContainerStatus,
    consecutive_failures: u32,
}

impl TrackedContainer {
    pub fn new(
        spec_name: impl Into<String>,
        runtime_id: ContainerID,
        status: ContainerStatus,
    ) -> Self {
        Self {
            spec_name: spec_name.into(),
            runtime_id,
            last_known_status: status,
            consecutive_failures: 0,
        }
    }

    pub fn spec_name(&self) -> &str {
        &self.spec_name
    }

    pub fn runtime_id(&self) -> &ContainerID {
        &self.runtime_id
    }

    pub fn last_known_status(&self) -> ContainerStatus {
        self.last_known_status
    }

    /// Number of back-to-back ticks in which the runtime could not be asked for this container's
    /// status.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub(super) fn observe(&mut self, status: ContainerStatus) {
        self.last_known_status = status;
        self.consecutive_failures = 0;
    }

    pub(super) fn record_failure(&mut self) -> u32 {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_failures
    }
}

impl fmt::Display for TrackedContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' (ID: {})", self.spec_name, self.runtime_id.short())
    }
}

/// The containers this supervisor has launched and not yet torn down, oldest first.
///
/// Entries are only added by the launch phase and only removed by the monitor (when a container
/// vanished) or by cleanup. Once removed, an entry is never seen again.
#[derive(Debug, Default)]
pub struct LiveSet {
    containers: Vec<TrackedContainer>,
}

impl LiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedContainer> {
        self.containers.iter()
    }

    pub fn get(&self, id: &ContainerID) -> Option<&TrackedContainer> {
        self.containers.iter().find(|c| c.runtime_id() == id)
    }

    /// Copies the current entries so a pass can mutate the set while walking it.
    pub(super) fn snapshot(&self) -> Vec<TrackedContainer> {
        self.containers.clone()
    }

    pub(super) fn insert(&mut self, container: TrackedContainer) {
        self.containers.push(container);
    }

    pub(super) fn get_mut(&mut self, id: &ContainerID) -> Option<&mut TrackedContainer> {
        self.containers.iter_mut().find(|c| c.runtime_id() == id)
    }

    pub(super) fn remove(&mut self, id: &ContainerID) -> Option<TrackedContainer> {
        let idx = self.containers.iter().position(|c| c.runtime_id() == id)?;
        Some(self.containers.remove(idx))
    }

    pub(super) fn take_oldest(&mut self) -> Option<TrackedContainer> {
        if self.containers.is_empty() {
            return None;
        }
        Some(self.containers.remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracked(name: &str, id: &str) -> TrackedContainer {
        TrackedContainer::new(
            name,
            ContainerID::new(id).unwrap(),
            ContainerStatus::Running,
        )
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut live = LiveSet::new();
        live.insert(tracked("a", "aaaa"));
        live.insert(tracked("b", "bbbb"));
        live.insert(tracked("c", "cccc"));

        let removed = live.remove(&ContainerID::new("bbbb").unwrap()).unwrap();
        assert_eq!(removed.spec_name(), "b");
        let names: Vec<_> = live.iter().map(TrackedContainer::spec_name).collect();
        assert_eq!(names, ["a", "c"]);
        assert!(live.remove(&ContainerID::new("bbbb").unwrap()).is_none());
    }

    #[test]
    fn test_take_oldest_drains_in_launch_order() {
        let mut live = LiveSet::new();
        live.insert(tracked("a", "aaaa"));
        live.insert(tracked("b", "bbbb"));

        assert_eq!(live.take_oldest().unwrap().spec_name(), "a");
        assert_eq!(live.take_oldest().unwrap().spec_name(), "b");
        assert!(live.take_oldest().is_none());
        assert!(live.is_empty());
    }

    #[test]
    fn test_failure_counter_resets_on_observation() {
        let mut container = tracked("a", "aaaa");
        assert_eq!(container.record_failure(), 1);
        assert_eq!(container.record_failure(), 2);
        container.observe(ContainerStatus::Exited);
        assert_eq!(container.consecutive_failures(), 0);
        assert_eq!(container.last_known_status(), ContainerStatus::Exited);
    }

    #[test]
    fn test_display_uses_short_id() {
        let container = tracked("web", "0123456789abcdef");
        assert_eq!(container.to_string(), "'web' (ID: 0123456789ab)");
    }
}
