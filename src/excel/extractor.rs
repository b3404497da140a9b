//! Table extraction - fixed-position statement sheet → normalized [`Table`]

use crate::layout::SheetConfig;
use crate::types::{normalize_label, Table, Year, YearValues};
use calamine::{Data, Range};
use tracing::debug;

/// Extracts a normalized label → {year → value} table from one sheet
pub struct TableExtractor<'a> {
    config: &'a SheetConfig,
}

impl<'a> TableExtractor<'a> {
    pub fn new(config: &'a SheetConfig) -> Self {
        Self { config }
    }

    /// Extract the table described by the sheet config.
    ///
    /// Blank labels, blank or non-numeric values and year columns whose header
    /// is not a number are skipped. Rows left without any value are dropped.
    pub fn extract(&self, grid: &Range<Data>) -> Table {
        let year_columns = self.year_columns(grid);
        let mut table = Table::new();

        for row in self.config.data_start_row..=self.config.data_end_row {
            let Some(label) = cell(grid, row, self.config.label_col).and_then(label_text) else {
                continue;
            };
            let key = normalize_label(&label);
            if key.is_empty() {
                continue;
            }

            let values: YearValues = year_columns
                .iter()
                .filter_map(|&(col, year)| {
                    cell(grid, row, col)
                        .and_then(numeric_value)
                        .map(|value| (year, value))
                })
                .collect();

            if values.is_empty() {
                continue;
            }

            if table.insert(key.clone(), values) {
                debug!(sheet = %self.config.name, row, label = %key, "label repeated; later row wins");
            }
        }

        debug!(
            sheet = %self.config.name,
            rows = table.len(),
            years = year_columns.len(),
            "extracted table"
        );
        table
    }

    /// Year columns whose header cell holds a number, paired with that year
    fn year_columns(&self, grid: &Range<Data>) -> Vec<(u32, Year)> {
        self.config
            .year_cols
            .iter()
            .filter_map(|&col| {
                let year = cell(grid, self.config.header_row, col).and_then(header_year);
                if year.is_none() {
                    debug!(
                        sheet = %self.config.name,
                        row = self.config.header_row,
                        col,
                        "header is not a year; column skipped"
                    );
                }
                year.map(|year| (col, year))
            })
            .collect()
    }
}

/// Cell at a 1-based absolute position
fn cell(grid: &Range<Data>, row: u32, col: u32) -> Option<&Data> {
    if row == 0 || col == 0 {
        return None;
    }
    grid.get_value((row - 1, col - 1))
}

/// Year from a header cell; only numeric cells qualify
fn header_year(cell: &Data) -> Option<Year> {
    let value = match cell {
        Data::Int(i) => *i as f64,
        Data::Float(f) => *f,
        _ => return None,
    };
    if !value.is_finite() || value < Year::MIN as f64 || value > Year::MAX as f64 {
        return None;
    }
    Some(value.trunc() as Year)
}

/// Label text, or `None` for a blank label cell
fn label_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Numeric value of a data cell; text is coerced, everything else is skipped.
/// TRUE/FALSE flags are not amounts and never count as 1 or 0.
fn numeric_value(cell: &Data) -> Option<f64> {
    let value = match cell {
        Data::Int(i) => *i as f64,
        Data::Float(f) => *f,
        Data::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SheetConfig {
        SheetConfig {
            name: "TEST".to_string(),
            header_row: 1,
            label_col: 1,
            data_start_row: 2,
            data_end_row: 6,
            year_cols: vec![2, 3],
        }
    }

    /// Grid from 1-based (row, col, value) triples
    fn grid(cells: &[(u32, u32, Data)]) -> Range<Data> {
        let mut range = Range::new((0, 0), (9, 5));
        for (row, col, value) in cells {
            range.set_value((row - 1, col - 1), value.clone());
        }
        range
    }

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    #[test]
    fn test_extract_basic_table() {
        let grid = grid(&[
            (1, 2, Data::Float(2023.0)),
            (1, 3, Data::Int(2024)),
            (2, 1, text("Revenue")),
            (2, 2, Data::Float(100.0)),
            (2, 3, Data::Float(120.0)),
            (3, 1, text("  Cost of   Revenue ")),
            (3, 2, Data::Int(60)),
            (3, 3, Data::Float(70.5)),
        ]);

        let table = TableExtractor::new(&config()).extract(&grid);

        assert_eq!(table.len(), 2);
        assert_eq!(table.value("revenue", 2023), Some(100.0));
        assert_eq!(table.value("revenue", 2024), Some(120.0));
        assert_eq!(table.value("cost of revenue", 2023), Some(60.0));
        assert_eq!(table.value("cost of revenue", 2024), Some(70.5));
    }

    #[test]
    fn test_blank_and_non_numeric_values_are_omitted() {
        let grid = grid(&[
            (1, 2, Data::Int(2023)),
            (1, 3, Data::Int(2024)),
            (2, 1, text("Revenue")),
            (2, 2, text("n/a")),
            (2, 3, Data::Float(120.0)),
            (3, 1, text("Inventory")),
            (3, 2, text("")),
            (3, 3, Data::Bool(true)),
            (4, 1, text("Deferred revenue")),
            (4, 2, text(" 42.5 ")),
        ]);

        let table = TableExtractor::new(&config()).extract(&grid);

        let revenue = table.get("revenue").unwrap();
        assert!(!revenue.contains_key(&2023));
        assert_eq!(revenue.get(&2024), Some(&120.0));
        // no value survived, so the row is dropped rather than zero-filled
        assert!(table.get("inventory").is_none());
        assert_eq!(table.value("deferred revenue", 2023), Some(42.5));
    }

    #[test]
    fn test_non_numeric_header_skips_column() {
        let grid = grid(&[
            (1, 2, text("FY2023")),
            (1, 3, Data::Int(2024)),
            (2, 1, text("Revenue")),
            (2, 2, Data::Float(100.0)),
            (2, 3, Data::Float(120.0)),
        ]);

        let table = TableExtractor::new(&config()).extract(&grid);

        let years: Vec<Year> = table.years().into_iter().collect();
        assert_eq!(years, vec![2024]);
    }

    #[test]
    fn test_blank_labels_skipped() {
        let grid = grid(&[
            (1, 2, Data::Int(2023)),
            (2, 1, text("   ")),
            (2, 2, Data::Float(5.0)),
            (3, 2, Data::Float(6.0)),
        ]);

        let table = TableExtractor::new(&config()).extract(&grid);
        assert!(table.is_empty());
    }

    #[test]
    fn test_duplicate_label_later_row_wins() {
        let grid = grid(&[
            (1, 2, Data::Int(2023)),
            (1, 3, Data::Int(2024)),
            (2, 1, text("Total")),
            (2, 2, Data::Float(1.0)),
            (2, 3, Data::Float(2.0)),
            (3, 1, text("Other")),
            (3, 2, Data::Float(9.0)),
            (4, 1, text("TOTAL")),
            (4, 3, Data::Float(3.0)),
        ]);

        let table = TableExtractor::new(&config()).extract(&grid);

        assert_eq!(table.value("total", 2023), None);
        assert_eq!(table.value("total", 2024), Some(3.0));
        let labels: Vec<&str> = table.labels().collect();
        assert_eq!(labels, vec!["total", "other"]);
    }

    #[test]
    fn test_rows_outside_range_ignored() {
        let grid = grid(&[
            (1, 2, Data::Int(2023)),
            (2, 1, text("Inside")),
            (2, 2, Data::Float(1.0)),
            (7, 1, text("Outside")),
            (7, 2, Data::Float(2.0)),
        ]);

        let table = TableExtractor::new(&config()).extract(&grid);
        assert!(table.get("inside").is_some());
        assert!(table.get("outside").is_none());
    }

    #[test]
    fn test_absolute_positions_when_range_does_not_start_at_a1() {
        // calamine trims leading empty rows/columns from worksheet ranges
        let mut range = Range::new((4, 2), (8, 5));
        range.set_value((4, 3), Data::Int(2023));
        range.set_value((5, 2), text("Revenue"));
        range.set_value((5, 3), Data::Float(100.0));

        let config = SheetConfig {
            name: "OFFSET".to_string(),
            header_row: 5,
            label_col: 3,
            data_start_row: 6,
            data_end_row: 9,
            year_cols: vec![4],
        };

        let table = TableExtractor::new(&config).extract(&range);
        assert_eq!(table.value("revenue", 2023), Some(100.0));
    }

    #[test]
    fn test_header_year_truncates_floats() {
        assert_eq!(header_year(&Data::Float(2024.0)), Some(2024));
        assert_eq!(header_year(&Data::Float(2024.9)), Some(2024));
        assert_eq!(header_year(&Data::Int(2022)), Some(2022));
        assert_eq!(header_year(&text("2024")), None);
        assert_eq!(header_year(&Data::Bool(true)), None);
        assert_eq!(header_year(&Data::Float(f64::NAN)), None);
    }

    #[test]
    fn test_numeric_value_rejects_non_finite_text() {
        assert_eq!(numeric_value(&text("inf")), None);
        assert_eq!(numeric_value(&text("NaN")), None);
        assert_eq!(numeric_value(&text("1,234")), None);
        assert_eq!(numeric_value(&text("-12")), Some(-12.0));
        assert_eq!(numeric_value(&Data::Empty), None);
        assert_eq!(numeric_value(&Data::Bool(true)), None);
        assert_eq!(numeric_value(&Data::Bool(false)), None);
    }

    #[test]
    fn test_numeric_label_rendered_as_text() {
        assert_eq!(label_text(&Data::Int(401)), Some("401".to_string()));
        assert_eq!(label_text(&Data::Empty), None);
        assert_eq!(label_text(&text("")), None);
    }
}
