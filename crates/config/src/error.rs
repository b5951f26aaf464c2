use std::{io, path::PathBuf};

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path:?}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// The configuration is not valid TOML or misses required fields.
    #[error(transparent)]
    Parse(#[from] toml::de::Error),
    /// A value is outside its allowed range.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
}
