use std::path::PathBuf;

/// Errors that may occur while loading or validating the configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open config file `{path}`: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("`poll_interval_secs` must be greater than zero")]
    ZeroPollInterval,
    #[error(
        "`request_timeout_secs` ({request_timeout}) must be greater than `stop_timeout_secs` ({stop_timeout})"
    )]
    RequestTimeoutTooShort {
        request_timeout: u64,
        stop_timeout: u64,
    },
    #[error("container spec #{index} has an empty name")]
    EmptyName { index: usize },
    #[error("container spec `{name}` has an empty image")]
    EmptyImage { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;
