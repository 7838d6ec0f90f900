use thiserror::Error;

/// Errors building the backend client.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid backend url '{0}'")]
    InvalidUrl(String),

    #[error("failed to build http client: {0}")]
    Build(#[from] reqwest::Error),
}
