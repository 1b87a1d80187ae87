use std::fmt::Display;

/// Errors that end a supervisor run with a failure exit status.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] crate::config::Error),
    #[error("could not reach the container runtime: {0}")]
    Runtime(#[from] crate::runtime::Error),
    #[error("no containers were successfully launched")]
    NothingLaunched,
}

pub type Result<T> = std::result::Result<T, Error>;

pub trait ResultLogExt<T> {
    /// Logs the error, prefixed with `context`, and discards it.
    fn log_err(self, context: impl Display) -> Option<T>;
}

impl<T, E> ResultLogExt<T> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn log_err(self, context: impl Display) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::error!("{context}: {err}");
                None
            }
        }
    }
}
