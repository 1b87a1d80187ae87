use std::fmt;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Where the container runtime's API is served.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Endpoint {
    /// `DOCKER_HOST` if set, the platform's default Docker socket otherwise.
    #[default]
    Docker,
    /// The rootless Podman API socket. Resolved from `XDG_RUNTIME_DIR` when `socket` is unset.
    Podman { socket: Option<PathBuf> },
    /// An explicit Unix socket path.
    Unix { path: PathBuf },
}

impl Endpoint {
    /// Returns the Unix socket to connect to, or `None` when the Docker defaults should be used.
    pub fn socket_path(&self) -> Option<PathBuf> {
        match self {
            Endpoint::Docker => None,
            Endpoint::Podman {
                socket: Some(socket),
            } => Some(socket.clone()),
            Endpoint::Podman { socket: None } => Some(podman_socket_path(
                std::env::var_os("XDG_RUNTIME_DIR").map(PathBuf::from),
            )),
            Endpoint::Unix { path } => Some(path.clone()),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.socket_path() {
            Some(path) => write!(f, "unix://{}", path.display()),
            None => match std::env::var("DOCKER_HOST") {
                Ok(host) => f.write_str(&host),
                Err(_) => f.write_str("docker (local defaults)"),
            },
        }
    }
}

/// Builds the rootless Podman socket path below the user's runtime directory.
///
/// Falls back to `/run/user/<uid>` when `XDG_RUNTIME_DIR` is not set.
fn podman_socket_path(runtime_dir: Option<PathBuf>) -> PathBuf {
    let runtime_dir = runtime_dir.unwrap_or_else(|| {
        let uid = match std::fs::metadata("/proc/self") {
            Ok(meta) => meta.uid(),
            Err(err) => {
                log::warn!("failed to determine current uid from /proc/self: {}", err);
                0
            }
        };
        Path::new("/run/user").join(uid.to_string())
    });

    runtime_dir.join("podman/podman.sock")
}
