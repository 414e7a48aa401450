use std::path::PathBuf;

use thiserror::Error;

use crate::remote::ServiceError;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, CopyError>;

/// Error type covering the failures that can stop a copy run.
#[derive(Debug, Error)]
pub enum CopyError {
    /// Wrapper for IO failures such as reading the configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when the configuration file does not exist.
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// Raised when the configuration lacks one of its required attributes.
    #[error("attribute not found in the config: {0}")]
    MissingConfigAttribute(&'static str),

    /// Raised when the source workbook path does not resolve to a file.
    #[error("source workbook not found: {0}")]
    SourceNotFound(PathBuf),

    /// Raised when the source workbook cannot be parsed as a spreadsheet.
    #[error("cannot read workbook {path}: {source}")]
    SourceFormat {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// Raised when credentials cannot be loaded or exchanged for a token.
    #[error("authentication failed: {0}")]
    Auth(#[source] ServiceError),

    /// Raised when the destination's existing sheets cannot be listed.
    #[error("cannot list sheets of the destination spreadsheet: {0}")]
    RemoteList(#[source] ServiceError),

    /// Raised when the destination rejects a new sheet.
    #[error("cannot create sheet '{sheet}' (source sheet #{index}): {source}")]
    RemoteCreate {
        sheet: String,
        index: usize,
        #[source]
        source: ServiceError,
    },

    /// Raised when writing values into a created sheet fails.
    #[error("cannot write values to sheet '{sheet}' (source sheet #{index}): {source}")]
    RemoteWrite {
        sheet: String,
        index: usize,
        #[source]
        source: ServiceError,
    },

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
