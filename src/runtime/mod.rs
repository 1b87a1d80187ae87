//! Adapter around a Docker-compatible container runtime API.
//!
//! The supervisor only talks to the runtime through the [`Runtime`] trait. [`DockerRuntime`] is
//! the production implementation backed by `bollard`; it works against the Docker daemon as well
//! as the Docker-compatible API served by Podman.
//!
//! Every call is a remote call. Nothing is cached locally: a container's status is only known
//! after an explicit [`Runtime::reload`].
use std::time::Duration;

use crate::container::{ContainerID, ContainerSpec, ContainerStatus};

mod docker;
mod endpoint;
mod error;
#[cfg(test)]
pub(crate) mod fake;

pub use docker::DockerRuntime;
pub use endpoint::Endpoint;
pub use error::{Error, Result};

/// A container that was created and started by [`Runtime::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launched {
    pub id: ContainerID,
    pub status: ContainerStatus,
}

pub trait Runtime {
    /// Checks that the daemon is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the daemon does not answer.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;

    /// Looks up a container by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no container carries that name.
    fn find_by_name(&self, name: &str) -> impl Future<Output = Result<ContainerID>> + Send;

    /// Creates and starts a detached container for `spec`, then reports its post-launch status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImageNotFound`] if the image is not available locally, otherwise
    /// [`Error::Api`].
    fn run(&self, spec: &ContainerSpec) -> impl Future<Output = Result<Launched>> + Send;

    /// Refreshes the status of a container.
    fn reload(&self, id: &ContainerID) -> impl Future<Output = Result<ContainerStatus>> + Send;

    /// Stops a container, waiting up to `timeout` before the runtime kills it.
    ///
    /// A container that is already stopped is not an error.
    fn stop(&self, id: &ContainerID, timeout: Duration)
    -> impl Future<Output = Result<()>> + Send;

    fn remove(&self, id: &ContainerID) -> impl Future<Output = Result<()>> + Send;
}
