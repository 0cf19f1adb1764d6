// ABOUTME: Error types with structured exit codes for CLI
// ABOUTME: Every error class is fatal; rerunning after a fix is the recovery path

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status} on {endpoint}: {message}")]
    Api {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("Unexpected upstream shape: {0}")]
    Shape(String),

    #[error("Embed error: {0}")]
    Embed(String),

    #[error("Local state error: {0}")]
    LocalState(String),

    #[error("Export error: {0}")]
    Export(String),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) => 2,
            Error::Network(_) => 3,
            Error::Api { .. } => 4,
            Error::Parse(_) => 5,
            Error::Filesystem(_) => 6,
            Error::Shape(_) => 7,
            Error::Embed(_) => 8,
            Error::LocalState(_) => 9,
            Error::Export(_) => 10,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
