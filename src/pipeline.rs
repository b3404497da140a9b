//! One-shot run: load workbook → extract statements → compute ratios → save

use crate::core::RatioCalculator;
use crate::error::RatioResult;
use crate::excel::{TableExtractor, WorkbookDocument, WorkbookWriter};
use crate::layout::Layout;
use crate::types::{RatioSeries, Statement, Statements};
use std::path::{Path, PathBuf};
use tracing::info;

/// Options for a ratio run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Destination workbook; `None` overwrites the input
    pub output: Option<PathBuf>,
    /// Also write the DSO / DIO / DPO rows
    pub include_intermediates: bool,
    /// Compute without writing anything
    pub dry_run: bool,
}

/// Outcome of a ratio run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub statements: Statements,
    pub series: RatioSeries,
    /// Where the workbook was written; `None` for a dry run
    pub written_to: Option<PathBuf>,
}

/// Extract all four statement tables.
///
/// Every configured sheet must exist; a missing one aborts before anything
/// is computed or written.
pub fn extract_statements(
    document: &WorkbookDocument,
    layout: &Layout,
) -> RatioResult<Statements> {
    for statement in Statement::ALL {
        document.require(&layout.sheet(statement).name)?;
    }

    let mut statements = Statements::default();
    for statement in Statement::ALL {
        let config = layout.sheet(statement);
        let sheet = document.require(&config.name)?;
        *statements.table_mut(statement) = TableExtractor::new(config).extract(&sheet.values);
    }
    Ok(statements)
}

/// Compute the ratio series for an in-memory document
pub fn compute_ratios(
    document: &WorkbookDocument,
    layout: &Layout,
) -> RatioResult<(Statements, RatioSeries)> {
    let statements = extract_statements(document, layout)?;
    let series = RatioCalculator::new(&statements, &layout.labels).calculate();
    Ok((statements, series))
}

/// Build the ratio sheet for the workbook at `input`.
///
/// The save is the only write: if anything fails before it, the destination
/// is left exactly as it was.
pub fn build_ratios(input: &Path, layout: &Layout, options: &RunOptions) -> RatioResult<RunReport> {
    layout.validate()?;

    let document = WorkbookDocument::open(input)?;
    info!(path = %input.display(), sheets = document.sheets().len(), "workbook loaded");

    let (statements, series) = compute_ratios(&document, layout)?;
    info!(years = ?series.years, "ratios computed");

    let written_to = if options.dry_run {
        None
    } else {
        let output = options.output.clone().unwrap_or_else(|| input.to_path_buf());
        WorkbookWriter::new(&document, &layout.result_sheet)
            .with_intermediates(options.include_intermediates)
            .save(&series, &output)?;
        Some(output)
    };

    Ok(RunReport {
        statements,
        series,
        written_to,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RatioError;
    use crate::excel::SheetData;
    use crate::layout::SheetConfig;
    use crate::types::Ratio;
    use calamine::{Data, Range};

    fn small_config(name: &str) -> SheetConfig {
        SheetConfig {
            name: name.to_string(),
            header_row: 1,
            label_col: 1,
            data_start_row: 2,
            data_end_row: 5,
            year_cols: vec![2, 3],
        }
    }

    fn small_layout() -> Layout {
        Layout {
            income_statement: small_config("IS"),
            balance_sheet: small_config("BS"),
            stockholders_equity: small_config("SE"),
            cash_flow: small_config("CF"),
            ..Layout::default()
        }
    }

    fn sheet(name: &str, rows: &[(&str, f64, f64)]) -> SheetData {
        let mut range = Range::new((0, 0), (5, 2));
        range.set_value((0, 1), Data::Int(2023));
        range.set_value((0, 2), Data::Int(2024));
        for (idx, (label, first, second)) in rows.iter().enumerate() {
            let row = idx as u32 + 1;
            range.set_value((row, 0), Data::String(label.to_string()));
            range.set_value((row, 1), Data::Float(*first));
            range.set_value((row, 2), Data::Float(*second));
        }
        SheetData::new(name, range)
    }

    fn document(with_cash_flow: bool) -> WorkbookDocument {
        let mut sheets = vec![
            sheet("IS", &[("Revenue", 100.0, 120.0), ("Cost of revenue", 60.0, 70.0)]),
            sheet(
                "BS",
                &[("Accounts receivable, net", 10.0, 12.0), ("Total assets", 50.0, 55.0)],
            ),
            sheet("SE", &[]),
        ];
        if with_cash_flow {
            sheets.push(sheet("CF", &[]));
        }
        WorkbookDocument::from_sheets("memory.xlsx", sheets)
    }

    #[test]
    fn test_compute_ratios_in_memory() {
        let (statements, series) = compute_ratios(&document(true), &small_layout()).unwrap();

        assert_eq!(statements.income.len(), 2);
        assert!(statements.cash_flow.is_empty());
        assert_eq!(series.years, vec![2023, 2024]);

        let asset_turnover = series.get(Ratio::AssetTurnover, 2024).unwrap();
        assert!((asset_turnover - 120.0 / 52.5).abs() < 1e-9);
        assert_eq!(series.get(Ratio::AssetTurnover, 2023), None);
    }

    #[test]
    fn test_missing_statement_sheet_is_fatal() {
        let err = compute_ratios(&document(false), &small_layout()).unwrap_err();
        assert!(matches!(err, RatioError::MissingSheet(ref name) if name == "CF"));
    }
}
