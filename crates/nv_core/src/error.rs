use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The news feed failed or had nothing to evaluate.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Image generation failed: {0}")]
    GenerationFailed(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Identifier already processed: {0}")]
    DuplicateIdentifier(String),

    #[error("Invalid artifact key: {0}")]
    InvalidKey(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// Stable name of the error class, used in logs and responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UpstreamUnavailable(_) => "UpstreamUnavailable",
            Error::GenerationFailed(_) => "GenerationFailed",
            Error::StoreUnavailable(_) => "StoreUnavailable",
            Error::DuplicateIdentifier(_) => "DuplicateIdentifier",
            Error::InvalidKey(_) => "InvalidKey",
            Error::Config(_) => "Config",
            Error::Io(_) => "Io",
            Error::Serialization(_) => "Serialization",
            Error::External(_) => "External",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
