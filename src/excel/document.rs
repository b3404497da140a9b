//! In-memory workbook document - every sheet's values, formulas and visibility,
//! plus the workbook's defined names

use crate::error::{RatioError, RatioResult};
use calamine::{open_workbook, Data, Range, Reader, SheetVisible, Xlsx};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One worksheet as read from disk
#[derive(Debug, Clone)]
pub struct SheetData {
    pub name: String,
    /// Cached cell values
    pub values: Range<Data>,
    /// Formula text (without the leading `=`), empty where a cell has no formula
    pub formulas: Option<Range<String>>,
    pub visible: SheetVisible,
}

impl SheetData {
    pub fn new(name: impl Into<String>, values: Range<Data>) -> Self {
        Self {
            name: name.into(),
            values,
            formulas: None,
            visible: SheetVisible::Visible,
        }
    }

    /// Formula at an absolute 0-based position, if the cell holds one
    pub fn formula_at(&self, row: u32, col: u32) -> Option<&str> {
        self.formulas
            .as_ref()
            .and_then(|formulas| formulas.get_value((row, col)))
            .map(String::as_str)
            .filter(|formula| !formula.is_empty())
    }
}

/// A workbook-level defined name, e.g. `Rev` → `INCOME_STATEMENT!$B$2`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinedName {
    pub name: String,
    /// Referenced range or formula, without the leading `=`
    pub formula: String,
}

impl DefinedName {
    pub fn new(name: impl Into<String>, formula: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            formula: formula.into(),
        }
    }
}

/// A workbook loaded fully into memory for a single run
#[derive(Debug, Clone)]
pub struct WorkbookDocument {
    path: PathBuf,
    sheets: Vec<SheetData>,
    defined_names: Vec<DefinedName>,
}

impl WorkbookDocument {
    /// Read every worksheet of an .xlsx file
    pub fn open<P: AsRef<Path>>(path: P) -> RatioResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut workbook: Xlsx<_> = open_workbook(&path).map_err(|e| {
            RatioError::Workbook(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let defined_names = workbook
            .defined_names()
            .iter()
            .map(|(name, formula)| DefinedName::new(name.as_str(), formula.trim_start_matches('=')))
            .collect::<Vec<_>>();
        let metadata = workbook.sheets_metadata().to_vec();

        let mut sheets = Vec::new();
        for sheet in metadata {
            let name = sheet.name;
            let values = match workbook.worksheet_range(&name) {
                Ok(range) => range,
                Err(e) => {
                    // chart sheets and other non-grid sheets have no cell range
                    warn!(sheet = %name, error = %e, "sheet has no readable cells; not carried over");
                    continue;
                }
            };
            let formulas = workbook.worksheet_formula(&name).ok();
            debug!(sheet = %name, size = ?values.get_size(), visible = ?sheet.visible, "loaded sheet");
            sheets.push(SheetData {
                name,
                values,
                formulas,
                visible: sheet.visible,
            });
        }
        debug!(count = defined_names.len(), "loaded defined names");

        Ok(Self {
            path,
            sheets,
            defined_names,
        })
    }

    /// Build a document from sheets already in memory
    pub fn from_sheets(path: impl Into<PathBuf>, sheets: Vec<SheetData>) -> Self {
        Self {
            path: path.into(),
            sheets,
            defined_names: Vec::new(),
        }
    }

    pub fn with_defined_names(mut self, defined_names: Vec<DefinedName>) -> Self {
        self.defined_names = defined_names;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheets(&self) -> &[SheetData] {
        &self.sheets
    }

    pub fn defined_names(&self) -> &[DefinedName] {
        &self.defined_names
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }

    /// Sheet by exact name
    pub fn sheet(&self, name: &str) -> Option<&SheetData> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    /// Sheet by exact name; a missing sheet is a structural error
    pub fn require(&self, name: &str) -> RatioResult<&SheetData> {
        self.sheet(name)
            .ok_or_else(|| RatioError::MissingSheet(name.to_string()))
    }
}
