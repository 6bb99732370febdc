//! Sky configuration error types.

/// Errors that can occur when loading, saving, or parsing `sky.ron`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read sky config: {0}")]
    ReadError(#[source] std::io::Error),

    /// Failed to create the config directory or write the file.
    #[error("failed to write sky config: {0}")]
    WriteError(#[source] std::io::Error),

    /// The file is not valid RON, or a field has the wrong type.
    #[error("failed to parse sky config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// Failed to serialize the config to RON.
    #[error("failed to serialize sky config: {0}")]
    SerializeError(#[source] ron::Error),
}
