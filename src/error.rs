//! Error types for the corpus toolkit.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Collector error: {0}")]
    Collector(#[from] CollectorError),

    #[error("Labeler error: {0}")]
    Labeler(#[from] LabelerError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors reading or writing the tabular message files.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid token list at offset {offset}: {reason}")]
    Literal { offset: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Collector (network + output file) errors.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("Could not resolve channel {channel}: {reason}")]
    ResolveFailed { channel: String, reason: String },

    #[error("Fetching messages from {channel} failed: {reason}")]
    FetchFailed { channel: String, reason: String },

    #[error("Media download to {path} failed: {reason}")]
    DownloadFailed { path: String, reason: String },

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Output error: {0}")]
    Output(#[from] DatasetError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Labeling session errors. Only I/O is fatal; everything else is
/// recovered inside the loop.
#[derive(Debug, thiserror::Error)]
pub enum LabelerError {
    #[error("Failed to write label file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read operator input: {0}")]
    Input(#[source] std::io::Error),
}

/// Result type alias for the toolkit.
pub type Result<T> = std::result::Result<T, Error>;
