//! Supervisor configuration.
//!
//! The configuration is a JSON document, read from the file named by the
//! `CREO_SUPERVISOR_CONFIG` environment variable. Without that variable the built-in defaults are
//! used. Every field is optional:
//!
//! ```json
//! {
//!     "containers": [
//!         { "name": "my-app-container-1", "image": "alpine/git", "command": ["sleep", "infinity"] }
//!     ],
//!     "poll_interval_secs": 5,
//!     "stop_timeout_secs": 5,
//!     "request_timeout_secs": 30,
//!     "failure_threshold": 3,
//!     "runtime": { "kind": "podman" }
//! }
//! ```
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::container::ContainerSpec;
use crate::runtime::Endpoint;

mod error;

pub use error::{Error, Result};

/// Environment variable holding the path of the JSON config file.
pub const CONFIG_PATH_ENV: &str = "CREO_SUPERVISOR_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Containers to launch, in launch order.
    pub containers: Vec<ContainerSpec>,
    pub poll_interval_secs: u64,
    /// Grace period given to a container between the stop request and the kill.
    pub stop_timeout_secs: u64,
    /// Upper bound for every request sent to the runtime.
    pub request_timeout_secs: u64,
    /// Consecutive failed status polls after which a container is reported as unreachable.
    /// `0` disables the report.
    pub failure_threshold: u32,
    pub runtime: Endpoint,
}

impl Default for Config {
    fn default() -> Self {
        let containers = (1..=3)
            .map(|i| {
                ContainerSpec::new(
                    format!("my-app-container-{i}"),
                    "alpine/git",
                    ["sleep", "infinity"],
                )
            })
            .collect();

        Self {
            containers,
            poll_interval_secs: 5,
            stop_timeout_secs: 5,
            request_timeout_secs: 30,
            failure_threshold: 3,
            runtime: Endpoint::default(),
        }
    }
}

impl Config {
    /// Loads the configuration named by [`CONFIG_PATH_ENV`], or the defaults if it is unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or does not validate.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from) {
            Some(path) => {
                log::debug!("Loading config from `{}`", path.display());
                Self::from_file(path)
            }
            None => {
                log::debug!("`{}` not set, using default config", CONFIG_PATH_ENV);
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Reads and validates a JSON config file.
    ///
    /// # Errors
    ///
    /// * [`Error::FileOpen`] if the file cannot be opened.
    /// * [`Error::Parse`] if it is not a valid config document.
    /// * Any validation error, see [`Config::validate`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;

        Ok(config)
    }

    /// Checks the values that would make supervision impossible.
    ///
    /// Duplicate container names are only warned about: the later launch replaces the earlier
    /// container.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(Error::ZeroPollInterval);
        }
        if self.request_timeout_secs <= self.stop_timeout_secs {
            return Err(Error::RequestTimeoutTooShort {
                request_timeout: self.request_timeout_secs,
                stop_timeout: self.stop_timeout_secs,
            });
        }

        let mut seen = HashSet::with_capacity(self.containers.len());
        for (index, spec) in self.containers.iter().enumerate() {
            if spec.name.trim().is_empty() {
                return Err(Error::EmptyName { index });
            }
            if spec.image.trim().is_empty() {
                return Err(Error::EmptyImage {
                    name: spec.name.clone(),
                });
            }
            if !seen.insert(spec.name.as_str()) {
                log::warn!(
                    "container name `{}` is configured more than once; later launches replace earlier ones",
                    spec.name
                );
            }
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
