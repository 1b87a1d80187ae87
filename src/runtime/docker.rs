use std::collections::HashMap;
use std::time::Duration;

use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, ListContainersOptions,
    RemoveContainerOptions, StartContainerOptions, StopContainerOptions,
};
use bollard::models::ContainerSummary;
use bollard::{API_DEFAULT_VERSION, Docker};

use crate::container::{ContainerID, ContainerSpec, ContainerStatus};

use super::{Endpoint, Error, Launched, Result, Runtime};

/// [`Runtime`] implementation speaking the Docker Engine API through `bollard`.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    client: Docker,
    endpoint: Endpoint,
}

impl DockerRuntime {
    /// Creates a client for `endpoint`. Every request made through it is bounded by
    /// `request_timeout`.
    ///
    /// No request is sent yet; call [`Runtime::ping`] to verify the daemon is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the client cannot be configured for the endpoint.
    pub fn connect(endpoint: Endpoint, request_timeout: Duration) -> Result<Self> {
        log::debug!("Connecting to container runtime at {}...", endpoint);
        let client = match endpoint.socket_path() {
            Some(path) => Docker::connect_with_unix(
                &path.to_string_lossy(),
                request_timeout.as_secs(),
                API_DEFAULT_VERSION,
            ),
            None => Docker::connect_with_local_defaults()
                .map(|client| client.with_timeout(request_timeout)),
        }
        .map_err(|source| Error::Connection {
            endpoint: endpoint.to_string(),
            source,
        })?;
        log::debug!("Created runtime client for {}.", endpoint);

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn inspect_status(&self, id: &str) -> Result<ContainerStatus> {
        let response = self
            .client
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
            .map_err(|source| Error::not_found_or_api(source, id))?;

        let status = response
            .state
            .and_then(|state| state.status)
            .map(|status| ContainerStatus::from(status.to_string().as_str()))
            .unwrap_or(ContainerStatus::Unknown);

        Ok(status)
    }
}

impl Runtime for DockerRuntime {
    async fn ping(&self) -> Result<()> {
        self.client
            .ping()
            .await
            .map_err(|source| Error::Connection {
                endpoint: self.endpoint.to_string(),
                source,
            })?;

        Ok(())
    }

    async fn find_by_name(&self, name: &str) -> Result<ContainerID> {
        // `inspect` would also resolve id prefixes, so list and match the exact name instead.
        // The daemon treats the filter as a regex, so it only narrows the candidates.
        let filters = HashMap::from([("name".to_owned(), vec![format!("^/{}$", name)])]);
        let containers = self
            .client
            .list_containers(Some(ListContainersOptions {
                all: true,
                filters,
                ..Default::default()
            }))
            .await
            .map_err(Error::Api)?;

        let id = exact_name_match(containers, name)
            .ok_or_else(|| Error::NotFound(name.to_owned()))?;

        Ok(ContainerID::new(id)?)
    }

    async fn run(&self, spec: &ContainerSpec) -> Result<Launched> {
        let options = CreateContainerOptions {
            name: spec.name.clone(),
            ..Default::default()
        };
        let config = Config {
            image: Some(spec.image.clone()),
            cmd: (!spec.command.is_empty()).then(|| spec.command.clone()),
            ..Default::default()
        };

        let response = self
            .client
            .create_container(Some(options), config)
            .await
            .map_err(|source| match source {
                bollard::errors::Error::DockerResponseServerError {
                    status_code: 404, ..
                } => Error::ImageNotFound(spec.image.clone()),
                other => Error::Api(other),
            })?;
        for warning in &response.warnings {
            log::warn!("runtime warning while creating `{}`: {}", spec.name, warning);
        }
        let id = ContainerID::new(&response.id)?;
        log::debug!("Created container `{}` ({})", spec.name, id.short());

        if let Err(err) = self
            .client
            .start_container(id.as_ref(), None::<StartContainerOptions<String>>)
            .await
        {
            // Nothing tracks the container yet, so it must not outlive this call.
            if let Err(remove_err) = self.remove(&id).await {
                log::error!(
                    "failed to remove container `{}` ({}) after failed start: {}",
                    spec.name,
                    id.short(),
                    remove_err
                );
            }
            return Err(Error::not_found_or_api(err, id.as_ref()));
        }

        let status = match self.inspect_status(id.as_ref()).await {
            Ok(status) => status,
            Err(err) => {
                log::warn!(
                    "failed to read status of container `{}` ({}) after launch: {}",
                    spec.name,
                    id.short(),
                    err
                );
                ContainerStatus::Unknown
            }
        };

        Ok(Launched { id, status })
    }

    async fn reload(&self, id: &ContainerID) -> Result<ContainerStatus> {
        self.inspect_status(id.as_ref()).await
    }

    async fn stop(&self, id: &ContainerID, timeout: Duration) -> Result<()> {
        let options = StopContainerOptions {
            t: i64::try_from(timeout.as_secs()).unwrap_or(i64::MAX),
        };
        match self.client.stop_container(id.as_ref(), Some(options)).await {
            Ok(()) => Ok(()),
            // 304: the container was not running.
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 304, ..
            }) => Ok(()),
            Err(err) => Err(Error::not_found_or_api(err, id.as_ref())),
        }
    }

    async fn remove(&self, id: &ContainerID) -> Result<()> {
        let options = RemoveContainerOptions {
            force: true,
            ..Default::default()
        };
        self.client
            .remove_container(id.as_ref(), Some(options))
            .await
            .map_err(|source| Error::not_found_or_api(source, id.as_ref()))
    }
}

/// Returns the id of the container whose name is exactly `name`.
///
/// The daemon reports names with a leading `/`.
fn exact_name_match(containers: Vec<ContainerSummary>, name: &str) -> Option<String> {
    let wanted = format!("/{}", name);
    containers
        .into_iter()
        .find(|summary| {
            summary
                .names
                .as_deref()
                .is_some_and(|names| names.iter().any(|n| *n == wanted))
        })
        .and_then(|summary| summary.id)
}
