use std::fmt;
use std::str::FromStr;

/// Last observed state of a container as reported by the runtime.
///
/// Parsing never fails: state strings the supervisor does not know map to
/// [`ContainerStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerStatus {
    Running,
    Exited,
    Created,
    Paused,
    Restarting,
    Dead,
    Unknown,
    /// The runtime no longer knows the container, or is in the middle of deleting it.
    Removed,
}

impl ContainerStatus {
    pub fn is_running(self) -> bool {
        matches!(self, ContainerStatus::Running)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContainerStatus::Running => "running",
            ContainerStatus::Exited => "exited",
            ContainerStatus::Created => "created",
            ContainerStatus::Paused => "paused",
            ContainerStatus::Restarting => "restarting",
            ContainerStatus::Dead => "dead",
            ContainerStatus::Unknown => "unknown",
            ContainerStatus::Removed => "removed",
        }
    }
}

impl FromStr for ContainerStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status = match s.trim().to_ascii_lowercase().as_str() {
            "running" => ContainerStatus::Running,
            "exited" => ContainerStatus::Exited,
            "created" => ContainerStatus::Created,
            "paused" => ContainerStatus::Paused,
            "restarting" => ContainerStatus::Restarting,
            "dead" => ContainerStatus::Dead,
            "removing" | "removed" => ContainerStatus::Removed,
            _ => ContainerStatus::Unknown,
        };
        Ok(status)
    }
}

impl From<&str> for ContainerStatus {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(status) => status,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
