use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CookieError {
    #[error("Cookie store is not available")]
    StoreUnavailable,

    #[error("Cannot construct cookie: {0}")]
    MalformedCookie(String),

    #[error("No cookie named {name:?} with path {path:?} for domain {domain:?}")]
    NotFound {
        name: String,
        path: String,
        domain: Option<String>,
    },

    #[error("Method not implemented: {0}")]
    UnsupportedMethod(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Cookie store error: {0}")]
    Store(#[from] BridgeError),
}

impl CookieError {
    /// Code carried by the error envelope when this error reaches the channel
    pub fn code(&self) -> &'static str {
        match self {
            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::MalformedCookie(_) => "MALFORMED_COOKIE",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::UnsupportedMethod(_) => "NOT_IMPLEMENTED",
            Self::InvalidArguments(_) => "INVALID_ARGUMENTS",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, CookieError>;
