//! Destination side of a copy run.
//!
//! [`SpreadsheetService`] is the seam between the synchronizer and the remote
//! spreadsheet; [`google::GoogleSheetsClient`] implements it against the Google
//! Sheets v4 REST API.

pub mod a1;
pub mod google;

use thiserror::Error;

use crate::model::{CellRef, CellValue, DestinationSheetRef, GridSize};

/// Failures reported by a [`SpreadsheetService`] implementation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Transport level failure (DNS, TLS, connection reset, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Credentials could not be read or signed.
    #[error("invalid credentials: {0}")]
    Credentials(String),

    /// Raised when the credentials file does not exist.
    #[error("credentials file not found: {0}")]
    CredentialsNotFound(std::path::PathBuf),

    /// The API answered successfully but the body lacked expected fields.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Used by in-process implementations to reject a request.
    #[error("{0}")]
    Rejected(String),
}

/// Minimal set of remote capabilities a copy run needs.
///
/// Calls are blocking and issued one at a time.
pub trait SpreadsheetService {
    /// Titles of the sheets currently present in the destination.
    fn sheet_names(&mut self) -> Result<Vec<String>, ServiceError>;

    /// Adds a sheet titled `title`, large enough to hold `size` cells.
    fn create_sheet(
        &mut self,
        title: &str,
        size: GridSize,
    ) -> Result<DestinationSheetRef, ServiceError>;

    /// Replaces the block starting at `origin` with `rows`.
    ///
    /// `origin` is the block's position in the source sheet, so a trimmed
    /// grid keeps its source offset in the destination.
    fn write_values(
        &mut self,
        sheet: &DestinationSheetRef,
        origin: CellRef,
        rows: &[Vec<CellValue>],
    ) -> Result<(), ServiceError>;
}
