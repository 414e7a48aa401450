//! Core library for the copy-to-sheets command line application.
//!
//! A run reads every sheet of a local workbook with [`io::excel_read`], then
//! [`sync::SheetSynchronizer`] mirrors each one into a remote spreadsheet
//! through the [`remote::SpreadsheetService`] seam. Destination titles are
//! kept unique by [`naming::NameRegistry`].

pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod naming;
pub mod remote;
pub mod sync;

pub use config::Config;
pub use error::{CopyError, Result};
