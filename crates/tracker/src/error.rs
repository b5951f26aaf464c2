use txwatch_chain::ChainError;
use txwatch_config::ConfigError;

/// Errors that prevent the tracker from starting.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The chain head could not be fetched at startup.
    #[error("failed to fetch the initial chain head: {0}")]
    InitialHead(#[source] ChainError),
    /// The tracker settings are unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
