use std::time::Instant;

use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::error::{CopyError, Result};
use crate::io::excel_read;
use crate::model::{DestinationSheetRef, SourceSheet};
use crate::naming::NameRegistry;
use crate::remote::SpreadsheetService;
use crate::remote::google::GoogleSheetsClient;

/// Copies source sheets into a destination spreadsheet, one at a time.
pub struct SheetSynchronizer<'a, S: SpreadsheetService> {
    service: &'a mut S,
    registry: NameRegistry,
}

impl<'a, S: SpreadsheetService> SheetSynchronizer<'a, S> {
    /// Seeds the name registry from the sheets currently in the destination.
    pub fn new(service: &'a mut S) -> Result<Self> {
        let existing = service.sheet_names().map_err(CopyError::RemoteList)?;
        debug!(existing = existing.len(), "loaded destination sheet titles");
        Ok(Self {
            service,
            registry: NameRegistry::with_existing(existing),
        })
    }

    pub fn registry(&self) -> &NameRegistry {
        &self.registry
    }

    /// Creates a destination sheet for `sheet` and writes its grid.
    ///
    /// `index` is the sheet's position in the workbook and only used to
    /// identify it in errors.
    #[instrument(level = "info", skip_all, fields(index = index, source_sheet = %sheet.name))]
    pub fn sync_sheet(&mut self, index: usize, sheet: &SourceSheet) -> Result<DestinationSheetRef> {
        let title = self.registry.claim(&sheet.name);
        let destination = self
            .service
            .create_sheet(&title, sheet.required_size())
            .map_err(|source| CopyError::RemoteCreate {
                sheet: title.clone(),
                index,
                source,
            })?;
        info!(destination = %destination.name, "created sheet");

        if sheet.is_empty() {
            debug!("source sheet is empty, nothing to write");
            return Ok(destination);
        }

        self.service
            .write_values(&destination, sheet.origin, &sheet.rows)
            .map_err(|source| CopyError::RemoteWrite {
                sheet: destination.name.clone(),
                index,
                source,
            })?;
        info!(
            rows = sheet.height(),
            columns = sheet.width(),
            "wrote values"
        );
        Ok(destination)
    }

    /// Synchronizes `sheets` in order, stopping at the first failure.
    pub fn sync_all(&mut self, sheets: &[SourceSheet]) -> Result<Vec<DestinationSheetRef>> {
        sheets
            .iter()
            .enumerate()
            .map(|(index, sheet)| self.sync_sheet(index, sheet))
            .collect()
    }
}

/// Copies `sheets` into `service`, returning the destination sheets in source
/// order.
pub fn copy_sheets<S: SpreadsheetService>(
    sheets: &[SourceSheet],
    service: &mut S,
) -> Result<Vec<DestinationSheetRef>> {
    let mut synchronizer = SheetSynchronizer::new(service)?;
    synchronizer.sync_all(sheets)
}

/// Runs a full copy described by `config`.
#[instrument(
    level = "info",
    skip_all,
    fields(source = %config.source.display(), destination = %config.destination)
)]
pub fn copy_workbook(config: &Config) -> Result<Vec<DestinationSheetRef>> {
    let started = Instant::now();

    info!("loading local workbook");
    let sheets = excel_read::read_workbook(&config.source)?;
    info!(sheet_count = sheets.len(), "read sheets from workbook");

    info!("connecting to destination spreadsheet");
    let mut client = GoogleSheetsClient::connect(&config.destination, &config.credentials)
        .map_err(CopyError::Auth)?;

    info!("copying workbook into destination");
    let created = copy_sheets(&sheets, &mut client)?;

    info!(
        sheet_count = created.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "copy finished"
    );
    Ok(created)
}
