use thiserror::Error;

/// Errors raised while setting the integration up. Translating and pushing
/// events never fails.
#[derive(Error, Debug)]
pub enum GtmError {
    #[error("containerId must be set to load the container script")]
    MissingContainerId,
    #[error("invalid environment configuration: {0}")]
    InvalidEnvironment(#[from] envconfig::Error),
    #[error("failed to parse integration settings: {0}")]
    InvalidSettings(#[from] serde_json::Error),
}
