use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    /// The default cookie store could not be opened.
    #[error("Failed to initialize default cookie store: {0}")]
    StoreInit(#[from] BridgeError),

    /// The runtime or worker thread opening the default store failed.
    #[error("Default store worker failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, Error>;
