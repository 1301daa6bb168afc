//! Configuration error types.

/// Errors raised while loading, saving or parsing `config.ron`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    ReadError(#[source] std::io::Error),

    #[error("cannot write config file: {0}")]
    WriteError(#[source] std::io::Error),

    #[error("malformed config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    #[error("cannot encode config: {0}")]
    SerializeError(#[source] ron::Error),
}
