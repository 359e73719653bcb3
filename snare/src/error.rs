use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    ConfigError(#[from] envconfig::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
