use thiserror::Error;

/// Top-level error type for the Wayfind system.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for WayfindError` where the `?` operator needs to
/// cross crate boundaries (configuration loading, server startup).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WayfindError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("POI error: {0}")]
    Poi(String),

    #[error("Chat error: {0}")]
    Chat(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for WayfindError {
    fn from(err: toml::de::Error) -> Self {
        WayfindError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for WayfindError {
    fn from(err: toml::ser::Error) -> Self {
        WayfindError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for WayfindError {
    fn from(err: serde_json::Error) -> Self {
        WayfindError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Wayfind operations.
pub type Result<T> = std::result::Result<T, WayfindError>;
