//! Sheet layout descriptors and the label catalogue
//!
//! Positions are 1-based spreadsheet coordinates (row 1 / column 1 = A1).
//! The built-in layout matches the original financials workbook; a YAML file
//! can override any part of it:
//!
//! ```yaml
//! balance_sheet:
//!   name: BALANCE_SHEET
//!   header_row: 14
//!   label_col: 2
//!   data_start_row: 17
//!   data_end_row: 55
//!   year_cols: [3, 4]
//! labels:
//!   total_stockholders_equity:
//!     - Total stockholders' equity
//! ```

use crate::error::{RatioError, RatioResult};
use crate::types::{LineItem, Statement};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

pub const DEFAULT_RESULT_SHEET: &str = "RATIOS";

/// Fixed-position layout of one statement sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetConfig {
    pub name: String,
    pub header_row: u32,
    pub label_col: u32,
    pub data_start_row: u32,
    pub data_end_row: u32,
    pub year_cols: Vec<u32>,
}

impl SheetConfig {
    fn validate(&self) -> RatioResult<()> {
        let fail = |msg: &str| Err(RatioError::Layout(format!("sheet '{}': {}", self.name, msg)));

        if self.name.trim().is_empty() {
            return Err(RatioError::Layout("sheet name must not be empty".to_string()));
        }
        if self.header_row == 0 || self.data_start_row == 0 || self.label_col == 0 {
            return fail("rows and columns are 1-based");
        }
        if self.data_end_row < self.data_start_row {
            return fail("data_end_row is before data_start_row");
        }
        if self.year_cols.is_empty() {
            return fail("year_cols must list at least one column");
        }
        if self.year_cols.contains(&0) {
            return fail("year_cols are 1-based");
        }
        Ok(())
    }
}

/// Label variants per line item; items without an entry use the built-in labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelCatalog {
    entries: BTreeMap<LineItem, Vec<String>>,
}

impl Default for LabelCatalog {
    fn default() -> Self {
        let entries = LineItem::ALL
            .into_iter()
            .map(|item| {
                let labels = item.default_labels().iter().map(|s| s.to_string()).collect();
                (item, labels)
            })
            .collect();
        Self { entries }
    }
}

impl LabelCatalog {
    /// An empty catalogue: every item falls back to its built-in labels
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, item: LineItem, labels: Vec<String>) {
        self.entries.insert(item, labels);
    }

    /// Label variants for an item, first preference first
    pub fn variants(&self, item: LineItem) -> Vec<String> {
        match self.entries.get(&item) {
            Some(labels) => labels.clone(),
            None => item
                .default_labels()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    fn validate(&self) -> RatioResult<()> {
        for (item, labels) in &self.entries {
            if labels.is_empty() {
                return Err(RatioError::Layout(format!(
                    "labels.{}: at least one label is required",
                    item_key(*item)
                )));
            }
            if labels.iter().any(|label| label.trim().is_empty()) {
                return Err(RatioError::Layout(format!(
                    "labels.{}: blank label variant",
                    item_key(*item)
                )));
            }
        }
        Ok(())
    }
}

fn item_key(item: LineItem) -> String {
    serde_yaml::to_string(&item)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|_| format!("{:?}", item))
}

/// Complete run layout: the four statement sheets, labels and result sheet name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Layout {
    pub income_statement: SheetConfig,
    pub balance_sheet: SheetConfig,
    pub stockholders_equity: SheetConfig,
    pub cash_flow: SheetConfig,
    pub result_sheet: String,
    pub labels: LabelCatalog,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            income_statement: SheetConfig {
                name: "INCOME_STATEMENT".to_string(),
                header_row: 15,
                label_col: 2,
                data_start_row: 16,
                data_end_row: 42,
                year_cols: vec![3, 4, 5],
            },
            balance_sheet: SheetConfig {
                name: "BALANCE_SHEET".to_string(),
                header_row: 14,
                label_col: 2,
                data_start_row: 17,
                data_end_row: 55,
                year_cols: vec![3, 4],
            },
            stockholders_equity: SheetConfig {
                name: "STOCKHOLDERS_EQUITY".to_string(),
                header_row: 17,
                label_col: 2,
                data_start_row: 18,
                data_end_row: 62,
                year_cols: vec![3, 4, 5, 6, 7, 8, 9, 10],
            },
            cash_flow: SheetConfig {
                name: "CASH_FLOW".to_string(),
                header_row: 15,
                label_col: 2,
                data_start_row: 17,
                data_end_row: 68,
                year_cols: vec![3, 4, 5],
            },
            result_sheet: DEFAULT_RESULT_SHEET.to_string(),
            labels: LabelCatalog::default(),
        }
    }
}

impl Layout {
    pub fn sheet(&self, statement: Statement) -> &SheetConfig {
        match statement {
            Statement::Income => &self.income_statement,
            Statement::Balance => &self.balance_sheet,
            Statement::StockholdersEquity => &self.stockholders_equity,
            Statement::CashFlow => &self.cash_flow,
        }
    }

    /// Parse and validate a layout from YAML text
    pub fn from_yaml_str(content: &str) -> RatioResult<Self> {
        let layout: Layout = serde_yaml::from_str(content)?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn to_yaml(&self) -> RatioResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> RatioResult<()> {
        let mut seen = HashSet::new();
        for statement in Statement::ALL {
            let sheet = self.sheet(statement);
            sheet.validate()?;
            if !seen.insert(sheet.name.as_str()) {
                return Err(RatioError::Layout(format!(
                    "sheet '{}' is configured for more than one statement",
                    sheet.name
                )));
            }
        }

        if self.result_sheet.trim().is_empty() {
            return Err(RatioError::Layout(
                "result_sheet must not be empty".to_string(),
            ));
        }
        if seen
            .iter()
            .any(|name| name.eq_ignore_ascii_case(&self.result_sheet))
        {
            return Err(RatioError::Layout(format!(
                "result_sheet '{}' would replace a statement sheet",
                self.result_sheet
            )));
        }

        self.labels.validate()
    }
}

/// Load a layout file, or the built-in layout when no path is given
pub fn load_layout(path: Option<&Path>) -> RatioResult<Layout> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            Layout::from_yaml_str(&content)
        }
        None => Ok(Layout::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_valid() {
        let layout = Layout::default();
        assert!(layout.validate().is_ok());
        assert_eq!(layout.income_statement.year_cols, vec![3, 4, 5]);
        assert_eq!(layout.balance_sheet.data_start_row, 17);
        assert_eq!(layout.result_sheet, "RATIOS");
    }

    #[test]
    fn test_default_layout_yaml_roundtrip() {
        let layout = Layout::default();
        let yaml = layout.to_yaml().unwrap();
        assert!(yaml.contains("INCOME_STATEMENT"));
        assert!(yaml.contains("accounts_receivable"));

        let parsed = Layout::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, layout);
    }

    #[test]
    fn test_partial_layout_keeps_defaults() {
        let yaml = r#"
balance_sheet:
  name: BS
  header_row: 1
  label_col: 1
  data_start_row: 2
  data_end_row: 10
  year_cols: [2, 3]
result_sheet: OUT
"#;
        let layout = Layout::from_yaml_str(yaml).unwrap();
        assert_eq!(layout.balance_sheet.name, "BS");
        assert_eq!(layout.result_sheet, "OUT");
        assert_eq!(layout.income_statement, Layout::default().income_statement);
    }

    #[test]
    fn test_label_override_falls_back_per_item() {
        let yaml = r#"
labels:
  total_stockholders_equity:
    - "Total stockholders' equity"
"#;
        let layout = Layout::from_yaml_str(yaml).unwrap();
        assert_eq!(
            layout.labels.variants(LineItem::TotalStockholdersEquity),
            vec!["Total stockholders' equity".to_string()]
        );
        assert_eq!(
            layout.labels.variants(LineItem::Revenue),
            vec!["Revenue".to_string()]
        );
    }

    #[test]
    fn test_zero_based_positions_rejected() {
        let mut layout = Layout::default();
        layout.cash_flow.label_col = 0;
        let err = layout.validate().unwrap_err();
        assert!(matches!(err, RatioError::Layout(_)));
        assert!(err.to_string().contains("1-based"));
    }

    #[test]
    fn test_inverted_row_range_rejected() {
        let mut layout = Layout::default();
        layout.income_statement.data_end_row = 3;
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_empty_year_columns_rejected() {
        let mut layout = Layout::default();
        layout.balance_sheet.year_cols.clear();
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_duplicate_sheet_names_rejected() {
        let mut layout = Layout::default();
        layout.cash_flow.name = "BALANCE_SHEET".to_string();
        let err = layout.validate().unwrap_err();
        assert!(err.to_string().contains("more than one statement"));
    }

    #[test]
    fn test_result_sheet_cannot_shadow_statement() {
        let mut layout = Layout::default();
        layout.result_sheet = "income_statement".to_string();
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_blank_label_variant_rejected() {
        let yaml = r#"
labels:
  revenue: ["Revenue", "  "]
"#;
        let err = Layout::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("labels.revenue"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(Layout::from_yaml_str("ratios_sheet: X\n").is_err());
    }

    #[test]
    fn test_load_layout_without_path_uses_default() {
        assert_eq!(load_layout(None).unwrap(), Layout::default());
    }
}
