//! Creo Supervisor: launches a fixed set of containers against a Docker-compatible runtime,
//! watches their health and removes them again when the process exits.
//!
//! The crate is organised around the phases of a run:
//!
//! - [`runtime`] talks to the container runtime (Docker or Podman).
//! - [`config`] holds the desired containers and the timing knobs.
//! - [`supervisor`] launches, monitors and cleans up the containers.
//! - [`signals`] turns termination signals into a shutdown request.
use runtime::{DockerRuntime, Runtime};
use supervisor::Session;

pub mod config;
pub mod container;
pub mod error;
pub mod runtime;
pub mod signals;
pub mod supervisor;

pub use error::{Error, Result};

/// Runs the supervisor until a termination signal arrives.
///
/// Containers launched by the run are always stopped and removed before this returns, including
/// when monitoring panics. Cleanup failures are logged but never change the returned outcome.
///
/// # Errors
///
/// - [`Error::Config`] if the configuration cannot be loaded.
/// - [`Error::Runtime`] if the container runtime cannot be reached.
/// - [`Error::NothingLaunched`] if none of the configured containers could be launched.
pub async fn run() -> Result<()> {
    log::info!("Starting container supervisor.");
    let config = config::Config::from_env()?;
    let runtime = connect(&config).await?;
    let shutdown = signals::shutdown_channel();

    let result = Session::run(&runtime, &config, shutdown).await;
    log::info!("Supervisor finished.");
    result
}

async fn connect(config: &config::Config) -> Result<DockerRuntime> {
    let runtime = DockerRuntime::connect(config.runtime.clone(), config.request_timeout())?;
    if let Err(err) = runtime.ping().await {
        log::error!("Could not connect to container runtime: {}", err);
        log::error!("Please ensure the container runtime is running and accessible.");
        return Err(err.into());
    }
    log::info!(
        "Successfully connected to container runtime at {}.",
        runtime.endpoint()
    );

    Ok(runtime)
}
