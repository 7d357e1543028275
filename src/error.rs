use thiserror::Error;

pub type Result<T> = std::result::Result<T, MaltError>;

#[derive(Error, Debug)]
pub enum MaltError {
    #[error("Formula error: {0}")]
    Formula(String),

    #[error("Fetch error for '{url}': {message}")]
    Fetch { url: String, message: String },

    #[error("Checksum mismatch for '{archive}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        archive: String,
        expected: String,
        actual: String,
    },

    #[error("Build error: {0}")]
    Build(String),

    #[error("Test failure: {0}")]
    TestFailure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
