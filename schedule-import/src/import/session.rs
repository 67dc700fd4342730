//! Import session state machine
//!
//! `Uploading -> Mapping -> Importing -> Done`. The only way back is an
//! explicit return from Mapping to Uploading to pick another file. Once
//! Importing starts the run always finishes in Done.

use anyhow::{Result, bail};
use std::path::Path;

use super::assignees::AssigneeDirectory;
use super::executor::{ImportResult, TaskCreator, run_import};
use super::ingest::{Spreadsheet, read_spreadsheet};
use super::mapping::FieldMapping;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStep {
    Uploading,
    Mapping,
    Importing,
    Done,
}

impl std::fmt::Display for ImportStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportStep::Uploading => write!(f, "uploading"),
            ImportStep::Mapping => write!(f, "mapping"),
            ImportStep::Importing => write!(f, "importing"),
            ImportStep::Done => write!(f, "done"),
        }
    }
}

/// One import of one spreadsheet into one project
#[derive(Debug)]
pub struct ImportSession {
    project_id: i64,
    step: ImportStep,
    sheet: Option<Spreadsheet>,
    mapping: FieldMapping,
    result: Option<ImportResult>,
}

impl ImportSession {
    pub fn new(project_id: i64) -> Self {
        Self {
            project_id,
            step: ImportStep::Uploading,
            sheet: None,
            mapping: FieldMapping::new(),
            result: None,
        }
    }

    pub fn project_id(&self) -> i64 {
        self.project_id
    }

    pub fn step(&self) -> ImportStep {
        self.step
    }

    /// Accept a parsed sheet and propose a mapping for it
    pub fn load(&mut self, sheet: Spreadsheet) -> Result<()> {
        if self.step != ImportStep::Uploading {
            bail!("Cannot load a file while {}", self.step);
        }
        if sheet.rows.is_empty() {
            bail!("Spreadsheet has no data rows after the header");
        }

        self.mapping = FieldMapping::suggest(&sheet.headers);
        log::info!(
            "Loaded {} rows; {} of 8 fields auto-mapped",
            sheet.row_count(),
            self.mapping.iter().count()
        );
        self.sheet = Some(sheet);
        self.step = ImportStep::Mapping;
        Ok(())
    }

    /// Read a file from disk and load it.
    ///
    /// On failure the session stays in Uploading.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        if self.step != ImportStep::Uploading {
            bail!("Cannot load a file while {}", self.step);
        }
        let sheet = read_spreadsheet(path)?;
        self.load(sheet)
    }

    /// Discard the loaded file and mapping to choose another file
    pub fn back_to_upload(&mut self) -> Result<()> {
        if self.step != ImportStep::Mapping {
            bail!("Can only go back to file selection from mapping (currently {})", self.step);
        }
        self.sheet = None;
        self.mapping = FieldMapping::new();
        self.step = ImportStep::Uploading;
        Ok(())
    }

    pub fn sheet(&self) -> Option<&Spreadsheet> {
        self.sheet.as_ref()
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    pub fn mapping_mut(&mut self) -> &mut FieldMapping {
        &mut self.mapping
    }

    /// True in Mapping once every required field is mapped
    pub fn can_import(&self) -> bool {
        self.step == ImportStep::Mapping && self.mapping.is_ready()
    }

    /// Run the import.
    ///
    /// Returns `Ok(None)` and stays in Mapping when the title field is
    /// unmapped. Otherwise runs every row and ends in Done.
    pub async fn import(
        &mut self,
        creator: &dyn TaskCreator,
        assignees: Option<&AssigneeDirectory>,
    ) -> Result<Option<&ImportResult>> {
        if self.step != ImportStep::Mapping {
            bail!("Cannot import while {}", self.step);
        }
        if !self.can_import() {
            log::warn!("Import blocked: title column is not mapped");
            return Ok(None);
        }
        let Some(sheet) = self.sheet.as_ref() else {
            bail!("No spreadsheet loaded");
        };

        self.step = ImportStep::Importing;
        let result = run_import(creator, self.project_id, &sheet.rows, &self.mapping, assignees)
            .await
            .unwrap_or_default();
        self.step = ImportStep::Done;
        self.result = Some(result);

        Ok(self.result.as_ref())
    }

    /// Result of the finished run
    pub fn result(&self) -> Option<&ImportResult> {
        self.result.as_ref()
    }
}
