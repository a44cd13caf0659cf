//! Error types for grid construction and configuration.
//!
//! Runtime commands on a built grid never fail: disabled features, unknown
//! columns and out-of-range indices degrade to no-ops. Errors are only
//! reported while a grid is being configured or registered.

use std::path::PathBuf;

/// Result type alias for grid operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or registering a grid.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two column definitions share the same id.
    #[error("Duplicate column id '{0}'")]
    DuplicateColumnId(String),

    /// A column definition has an empty id.
    #[error("Column definition at position {0} has an empty id")]
    EmptyColumnId(usize),

    /// A getter, setter or aggregation references a column that does not exist.
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    /// An option value is out of range.
    #[error("Invalid value for option '{name}': {message}")]
    InvalidOption { name: String, message: String },

    /// A grid with this id is already registered.
    #[error("Grid '{0}' is already registered")]
    DuplicateGrid(String),

    /// JSON configuration could not be parsed.
    #[error("JSON configuration error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration could not be parsed.
    #[error("TOML configuration error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration file could not be read.
    #[error("Failed to read grid configuration '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file extension is not `.json` or `.toml`.
    #[error("Unsupported configuration format for '{0}'")]
    UnsupportedFormat(PathBuf),
}

impl Error {
    /// Create an invalid option error.
    pub fn invalid_option(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOption {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
