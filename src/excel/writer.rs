//! Result writer - source workbook + RATIOS sheet → .xlsx

use crate::error::{RatioError, RatioResult};
use crate::excel::document::{SheetData, WorkbookDocument};
use crate::types::{Ratio, RatioSeries};
use calamine::{Data, SheetVisible};
use rust_xlsxwriter::{Format, Formula, Workbook, Worksheet};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// Writes the source sheets back out with a freshly built result sheet
pub struct WorkbookWriter<'a> {
    document: &'a WorkbookDocument,
    result_sheet: &'a str,
    include_intermediates: bool,
}

impl<'a> WorkbookWriter<'a> {
    pub fn new(document: &'a WorkbookDocument, result_sheet: &'a str) -> Self {
        Self {
            document,
            result_sheet,
            include_intermediates: false,
        }
    }

    /// Also write the DSO / DIO / DPO rows
    pub fn with_intermediates(mut self, include: bool) -> Self {
        self.include_intermediates = include;
        self
    }

    /// Build the output workbook in memory.
    ///
    /// A sheet already named like the result sheet is dropped, so the result
    /// sheet is always rebuilt from scratch and appended last. Hidden sheets
    /// stay hidden and the workbook's defined names are carried over.
    pub fn render(&self, series: &RatioSeries) -> RatioResult<Workbook> {
        let mut workbook = Workbook::new();
        // Excel opens on the first sheet unless told otherwise; a hidden one can't be it
        let mut needs_active = false;
        let mut emitted = 0usize;

        for sheet in self.document.sheets() {
            if sheet.name.eq_ignore_ascii_case(self.result_sheet) {
                info!(sheet = %sheet.name, "replacing existing result sheet");
                continue;
            }
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name).map_err(|e| {
                RatioError::Export(format!("Failed to set worksheet name '{}': {}", sheet.name, e))
            })?;
            copy_sheet(worksheet, sheet)?;

            match sheet.visible {
                SheetVisible::Visible => {
                    if needs_active {
                        worksheet.set_active(true);
                        needs_active = false;
                    }
                }
                SheetVisible::Hidden => {
                    worksheet.set_hidden(true);
                    needs_active |= emitted == 0;
                }
                SheetVisible::VeryHidden => {
                    worksheet.set_very_hidden(true);
                    needs_active |= emitted == 0;
                }
            }
            emitted += 1;
        }

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(self.result_sheet).map_err(|e| {
            RatioError::Export(format!(
                "Failed to set worksheet name '{}': {}",
                self.result_sheet, e
            ))
        })?;
        write_ratio_sheet(worksheet, series, self.include_intermediates)?;
        if needs_active {
            worksheet.set_active(true);
        }

        define_names(&mut workbook, self.document);

        Ok(workbook)
    }

    /// Render and persist atomically: nothing at `path` changes unless the
    /// whole workbook was serialized and written.
    pub fn save(&self, series: &RatioSeries, path: &Path) -> RatioResult<()> {
        let mut workbook = self.render(series)?;
        let buffer = workbook
            .save_to_buffer()
            .map_err(|e| RatioError::Export(format!("Failed to serialize workbook: {}", e)))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = tempfile::NamedTempFile::new_in(dir)?;
        staged.write_all(&buffer)?;
        staged.as_file().sync_all()?;
        staged.persist(path).map_err(|e| RatioError::Io(e.error))?;

        info!(path = %path.display(), bytes = buffer.len(), "workbook saved");
        Ok(())
    }
}

/// Write the result table: header row of years, one row per ratio.
/// Unknown values stay as empty cells.
pub fn write_ratio_sheet(
    worksheet: &mut Worksheet,
    series: &RatioSeries,
    include_intermediates: bool,
) -> RatioResult<()> {
    let header_format = Format::new().set_bold();

    worksheet
        .write_string_with_format(0, 0, "Ratio", &header_format)
        .map_err(|e| RatioError::Export(format!("Failed to write header: {}", e)))?;
    for (idx, &year) in series.years.iter().enumerate() {
        worksheet
            .write_number_with_format(0, to_col(idx + 1)?, f64::from(year), &header_format)
            .map_err(|e| RatioError::Export(format!("Failed to write year header: {}", e)))?;
    }

    let ratios = Ratio::output_order(include_intermediates);
    for (idx, ratio) in ratios.iter().enumerate() {
        let row = to_row(idx + 1)?;
        worksheet
            .write_string(row, 0, ratio.name())
            .map_err(|e| RatioError::Export(format!("Failed to write ratio name: {}", e)))?;

        for (year_idx, value) in series.row(*ratio).into_iter().enumerate() {
            if let Some(value) = value {
                worksheet
                    .write_number(row, to_col(year_idx + 1)?, value)
                    .map_err(|e| {
                        RatioError::Export(format!("Failed to write {}: {}", ratio.name(), e))
                    })?;
            }
        }
    }

    worksheet
        .set_column_width(0, 28)
        .map_err(|e| RatioError::Export(format!("Failed to set column width: {}", e)))?;
    Ok(())
}

/// Re-declare the source workbook's defined names.
///
/// Print areas, filter ranges and other `_xlnm.` built-ins are sheet-scoped
/// and have no workbook-level equivalent, so they are left out. A name seen
/// twice keeps its first definition; one Excel would reject is logged and skipped.
fn define_names(workbook: &mut Workbook, document: &WorkbookDocument) {
    let mut seen = HashSet::new();
    for defined in document.defined_names() {
        if defined.name.is_empty() || defined.name.starts_with("_xlnm.") {
            debug!(name = %defined.name, "built-in defined name not carried over");
            continue;
        }
        if !seen.insert(defined.name.to_ascii_lowercase()) {
            warn!(name = %defined.name, "defined name repeated; first definition kept");
            continue;
        }
        if let Err(e) = workbook.define_name(defined.name.as_str(), &defined.formula) {
            warn!(name = %defined.name, error = %e, "defined name not carried over");
        }
    }
}

/// Re-emit a source sheet's values and formulas at their original positions
fn copy_sheet(worksheet: &mut Worksheet, sheet: &SheetData) -> RatioResult<()> {
    let mut written = HashSet::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    if let Some((start_row, start_col)) = sheet.values.start() {
        for (r, c, cell) in sheet.values.used_cells() {
            let row = start_row + r as u32;
            let col = start_col + c as u32;

            if let Some(formula) = sheet.formula_at(row, col) {
                write_formula(worksheet, row, col, formula, Some(cell))?;
            } else {
                write_cell(worksheet, row, col, cell, &date_format)?;
            }
            written.insert((row, col));
        }
    }

    // formulas whose cached value is empty
    if let Some(formulas) = &sheet.formulas {
        if let Some((start_row, start_col)) = formulas.start() {
            for (r, c, formula) in formulas.used_cells() {
                let (row, col) = (start_row + r as u32, start_col + c as u32);
                if !formula.is_empty() && !written.contains(&(row, col)) {
                    write_formula(worksheet, row, col, formula, None)?;
                }
            }
        }
    }

    debug!(sheet = %sheet.name, cells = written.len(), "copied sheet");
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u32,
    cell: &Data,
    date_format: &Format,
) -> RatioResult<()> {
    let col = to_col(col as usize)?;
    let result = match cell {
        Data::Empty => return Ok(()),
        Data::Int(i) => worksheet.write_number(row, col, *i as f64),
        Data::Float(f) => worksheet.write_number(row, col, *f),
        Data::String(s) => worksheet.write_string(row, col, s),
        Data::Bool(b) => worksheet.write_boolean(row, col, *b),
        Data::DateTime(dt) => worksheet.write_number_with_format(row, col, dt.as_f64(), date_format),
        Data::DateTimeIso(s) | Data::DurationIso(s) => worksheet.write_string(row, col, s),
        Data::Error(e) => worksheet.write_string(row, col, e.to_string()),
    };
    result
        .map(|_| ())
        .map_err(|e| RatioError::Export(format!("Failed to write cell ({}, {}): {}", row, col, e)))
}

fn write_formula(
    worksheet: &mut Worksheet,
    row: u32,
    col: u32,
    formula: &str,
    cached: Option<&Data>,
) -> RatioResult<()> {
    let mut formula = Formula::new(formula);
    if let Some(result) = cached.and_then(cached_result) {
        formula = formula.set_result(result);
    }
    worksheet
        .write_formula(row, to_col(col as usize)?, formula)
        .map(|_| ())
        .map_err(|e| {
            RatioError::Export(format!("Failed to write formula ({}, {}): {}", row, col, e))
        })
}

/// Cached formula result as Excel stores it
fn cached_result(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::Bool(true) => Some("TRUE".to_string()),
        Data::Bool(false) => Some("FALSE".to_string()),
        Data::DateTime(dt) => Some(dt.as_f64().to_string()),
        other => Some(other.to_string()),
    }
}

fn to_row(idx: usize) -> RatioResult<u32> {
    u32::try_from(idx).map_err(|_| RatioError::Export(format!("Row {} out of range", idx)))
}

fn to_col(idx: usize) -> RatioResult<u16> {
    u16::try_from(idx).map_err(|_| RatioError::Export(format!("Column {} out of range", idx)))
}
