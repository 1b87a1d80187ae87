/// Errors surfaced by the container runtime adapter.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to connect to container runtime at `{endpoint}`: {source}")]
    Connection {
        endpoint: String,
        #[source]
        source: bollard::errors::Error,
    },
    #[error("no such container `{0}`")]
    NotFound(String),
    #[error("image `{0}` not found")]
    ImageNotFound(String),
    #[error("container runtime API error: {0}")]
    Api(#[source] bollard::errors::Error),
    #[error("runtime returned an invalid container id: {0}")]
    InvalidContainerID(#[from] crate::container::Error),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Maps a daemon error to [`Error::NotFound`] when the daemon answered with HTTP 404.
    pub(super) fn not_found_or_api(source: bollard::errors::Error, what: &str) -> Self {
        match source {
            bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            } => Error::NotFound(what.to_owned()),
            other => Error::Api(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
