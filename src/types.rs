use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Fiscal year used as the join key across statements
pub type Year = i32;

/// Values of one line item keyed by fiscal year
pub type YearValues = BTreeMap<Year, f64>;

/// Normalize a line-item label into a lookup key.
///
/// Trims, lowercases and collapses internal whitespace runs to a single space,
/// so `"  Total   Assets "` and `"total assets"` share one key.
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

//==============================================================================
// Extracted statement tables
//==============================================================================

/// Normalized label → {year → value} mapping extracted from one statement sheet.
///
/// Iteration follows extraction order: a label keeps the position where it was
/// first seen, even when a later row with the same normalized label replaces
/// its values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    rows: Vec<(String, YearValues)>,
    index: HashMap<String, usize>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row, replacing any earlier row with the same key.
    /// Returns `true` when an earlier row was replaced.
    pub fn insert(&mut self, label: String, values: YearValues) -> bool {
        if let Some(&position) = self.index.get(&label) {
            self.rows[position].1 = values;
            return true;
        }
        self.index.insert(label.clone(), self.rows.len());
        self.rows.push((label, values));
        false
    }

    pub fn get(&self, label: &str) -> Option<&YearValues> {
        self.index.get(label).map(|&position| &self.rows[position].1)
    }

    /// Value for an exact key and year
    pub fn value(&self, label: &str, year: Year) -> Option<f64> {
        self.get(label).and_then(|values| values.get(&year).copied())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &YearValues)> {
        self.rows
            .iter()
            .map(|(label, values)| (label.as_str(), values))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(label, _)| label.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every year that carries at least one value in any row
    pub fn years(&self) -> BTreeSet<Year> {
        self.rows
            .iter()
            .flat_map(|(_, values)| values.keys().copied())
            .collect()
    }
}

/// The four statement sheets a run reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statement {
    Income,
    Balance,
    StockholdersEquity,
    CashFlow,
}

impl Statement {
    pub const ALL: [Statement; 4] = [
        Statement::Income,
        Statement::Balance,
        Statement::StockholdersEquity,
        Statement::CashFlow,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Statement::Income => "Income statement",
            Statement::Balance => "Balance sheet",
            Statement::StockholdersEquity => "Stockholders' equity",
            Statement::CashFlow => "Cash flow",
        }
    }
}

/// Extracted tables for every statement sheet.
///
/// Stockholders' equity and cash flow are extracted but no ratio reads them yet.
#[derive(Debug, Clone, Default)]
pub struct Statements {
    pub income: Table,
    pub balance: Table,
    pub stockholders_equity: Table,
    pub cash_flow: Table,
}

impl Statements {
    pub fn table(&self, statement: Statement) -> &Table {
        match statement {
            Statement::Income => &self.income,
            Statement::Balance => &self.balance,
            Statement::StockholdersEquity => &self.stockholders_equity,
            Statement::CashFlow => &self.cash_flow,
        }
    }

    pub fn table_mut(&mut self, statement: Statement) -> &mut Table {
        match statement {
            Statement::Income => &mut self.income,
            Statement::Balance => &mut self.balance,
            Statement::StockholdersEquity => &mut self.stockholders_equity,
            Statement::CashFlow => &mut self.cash_flow,
        }
    }

    /// Years computed for a run: present in both the income and balance tables
    pub fn run_years(&self) -> Vec<Year> {
        self.income
            .years()
            .intersection(&self.balance.years())
            .copied()
            .collect()
    }
}

//==============================================================================
// Line items consumed by the ratio formulas
//==============================================================================

/// Logical line items the ratio formulas read
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItem {
    Revenue,
    CostOfRevenue,
    NetIncome,
    NetIncomeCommon,
    AccountsReceivable,
    Inventory,
    AccountsPayable,
    PropertyAndEquipment,
    TotalAssets,
    TotalEquity,
    TotalStockholdersEquity,
}

impl LineItem {
    pub const ALL: [LineItem; 11] = [
        LineItem::Revenue,
        LineItem::CostOfRevenue,
        LineItem::NetIncome,
        LineItem::NetIncomeCommon,
        LineItem::AccountsReceivable,
        LineItem::Inventory,
        LineItem::AccountsPayable,
        LineItem::PropertyAndEquipment,
        LineItem::TotalAssets,
        LineItem::TotalEquity,
        LineItem::TotalStockholdersEquity,
    ];

    /// Statement the item is looked up in
    pub fn statement(&self) -> Statement {
        match self {
            LineItem::Revenue
            | LineItem::CostOfRevenue
            | LineItem::NetIncome
            | LineItem::NetIncomeCommon => Statement::Income,
            _ => Statement::Balance,
        }
    }

    /// Built-in label variants, first preference first
    pub fn default_labels(&self) -> &'static [&'static str] {
        match self {
            LineItem::Revenue => &["Revenue"],
            LineItem::CostOfRevenue => &["Cost of revenue"],
            LineItem::NetIncome => &["Net income (loss)"],
            LineItem::NetIncomeCommon => {
                &["Net income (loss) attributable to common stockholders"]
            }
            LineItem::AccountsReceivable => &["Accounts receivable, net"],
            LineItem::Inventory => &["Inventory"],
            LineItem::AccountsPayable => &["Accounts payable"],
            LineItem::PropertyAndEquipment => &["Property and equipment, net"],
            LineItem::TotalAssets => &["Total assets"],
            LineItem::TotalEquity => &["Total equity"],
            LineItem::TotalStockholdersEquity => &["Total Palantir's stockholders' equity"],
        }
    }
}

//==============================================================================
// Ratios
//==============================================================================

/// Ratios produced per fiscal year, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Ratio {
    #[serde(rename = "A/R Turnover")]
    ReceivablesTurnover,
    #[serde(rename = "Inventory Turnover")]
    InventoryTurnover,
    #[serde(rename = "A/P Turnover")]
    PayablesTurnover,
    #[serde(rename = "PPE Turnover")]
    PpeTurnover,
    #[serde(rename = "Asset Turnover")]
    AssetTurnover,
    #[serde(rename = "Return on Assets")]
    ReturnOnAssets,
    #[serde(rename = "Days Sales Outstanding")]
    DaysSalesOutstanding,
    #[serde(rename = "Days Inventory Outstanding")]
    DaysInventoryOutstanding,
    #[serde(rename = "Days Payable Outstanding")]
    DaysPayableOutstanding,
    #[serde(rename = "Cash Conversion Cycle")]
    CashConversionCycle,
    #[serde(rename = "Return on Equity")]
    ReturnOnEquity,
    #[serde(rename = "Return on Common Equity")]
    ReturnOnCommonEquity,
    #[serde(rename = "Net Profit Margin")]
    NetProfitMargin,
    #[serde(rename = "Leverage")]
    Leverage,
}

impl Ratio {
    pub const ALL: [Ratio; 14] = [
        Ratio::ReceivablesTurnover,
        Ratio::InventoryTurnover,
        Ratio::PayablesTurnover,
        Ratio::PpeTurnover,
        Ratio::AssetTurnover,
        Ratio::ReturnOnAssets,
        Ratio::DaysSalesOutstanding,
        Ratio::DaysInventoryOutstanding,
        Ratio::DaysPayableOutstanding,
        Ratio::CashConversionCycle,
        Ratio::ReturnOnEquity,
        Ratio::ReturnOnCommonEquity,
        Ratio::NetProfitMargin,
        Ratio::Leverage,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Ratio::ReceivablesTurnover => "A/R Turnover",
            Ratio::InventoryTurnover => "Inventory Turnover",
            Ratio::PayablesTurnover => "A/P Turnover",
            Ratio::PpeTurnover => "PPE Turnover",
            Ratio::AssetTurnover => "Asset Turnover",
            Ratio::ReturnOnAssets => "Return on Assets",
            Ratio::DaysSalesOutstanding => "Days Sales Outstanding",
            Ratio::DaysInventoryOutstanding => "Days Inventory Outstanding",
            Ratio::DaysPayableOutstanding => "Days Payable Outstanding",
            Ratio::CashConversionCycle => "Cash Conversion Cycle",
            Ratio::ReturnOnEquity => "Return on Equity",
            Ratio::ReturnOnCommonEquity => "Return on Common Equity",
            Ratio::NetProfitMargin => "Net Profit Margin",
            Ratio::Leverage => "Leverage",
        }
    }

    /// Day-count ratios that feed the cash conversion cycle
    pub fn is_intermediate(&self) -> bool {
        matches!(
            self,
            Ratio::DaysSalesOutstanding
                | Ratio::DaysInventoryOutstanding
                | Ratio::DaysPayableOutstanding
        )
    }

    /// Ratios in output order, optionally including the day-count intermediates
    pub fn output_order(include_intermediates: bool) -> Vec<Ratio> {
        Self::ALL
            .into_iter()
            .filter(|ratio| include_intermediates || !ratio.is_intermediate())
            .collect()
    }
}

/// Ratio name → {year → value}, where `None` means the value is unknown
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RatioSeries {
    /// Years in ascending order
    pub years: Vec<Year>,
    pub values: BTreeMap<Ratio, BTreeMap<Year, Option<f64>>>,
}

impl RatioSeries {
    pub fn new(mut years: Vec<Year>) -> Self {
        years.sort_unstable();
        years.dedup();
        Self {
            years,
            values: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, ratio: Ratio, year: Year, value: Option<f64>) {
        self.values.entry(ratio).or_default().insert(year, value);
    }

    pub fn get(&self, ratio: Ratio, year: Year) -> Option<f64> {
        self.values
            .get(&ratio)
            .and_then(|by_year| by_year.get(&year).copied().flatten())
    }

    /// One value per run year, in year order
    pub fn row(&self, ratio: Ratio) -> Vec<Option<f64>> {
        self.years.iter().map(|&year| self.get(ratio, year)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(Year, f64)]) -> YearValues {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_normalize_label_collapses_whitespace() {
        assert_eq!(normalize_label("  Total   Assets \t"), "total assets");
        assert_eq!(normalize_label("Revenue"), "revenue");
        assert_eq!(normalize_label("Cost of\nrevenue"), "cost of revenue");
        assert_eq!(normalize_label("   "), "");
    }

    #[test]
    fn test_table_insert_overwrites_in_place() {
        let mut table = Table::new();
        assert!(!table.insert("revenue".to_string(), values(&[(2023, 1.0)])));
        assert!(!table.insert("cost of revenue".to_string(), values(&[(2023, 2.0)])));
        assert!(table.insert("revenue".to_string(), values(&[(2024, 3.0)])));

        let labels: Vec<&str> = table.labels().collect();
        assert_eq!(labels, vec!["revenue", "cost of revenue"]);
        assert_eq!(table.value("revenue", 2023), None);
        assert_eq!(table.value("revenue", 2024), Some(3.0));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_table_years_is_union_of_rows() {
        let mut table = Table::new();
        table.insert("a".to_string(), values(&[(2022, 1.0)]));
        table.insert("b".to_string(), values(&[(2023, 1.0), (2024, 2.0)]));

        let years: Vec<Year> = table.years().into_iter().collect();
        assert_eq!(years, vec![2022, 2023, 2024]);
    }

    #[test]
    fn test_run_years_intersects_income_and_balance() {
        let mut statements = Statements::default();
        statements
            .income
            .insert("revenue".to_string(), values(&[(2022, 1.0), (2023, 1.0), (2024, 1.0)]));
        statements
            .balance
            .insert("total assets".to_string(), values(&[(2023, 1.0), (2024, 1.0)]));

        assert_eq!(statements.run_years(), vec![2023, 2024]);
    }

    #[test]
    fn test_ratio_output_order() {
        let default_order = Ratio::output_order(false);
        assert_eq!(default_order.len(), 11);
        assert_eq!(default_order[0], Ratio::ReceivablesTurnover);
        assert_eq!(default_order[6], Ratio::CashConversionCycle);
        assert_eq!(default_order[10], Ratio::Leverage);

        let with_days = Ratio::output_order(true);
        assert_eq!(with_days.len(), 14);
        assert_eq!(with_days[6], Ratio::DaysSalesOutstanding);
    }

    #[test]
    fn test_ratio_series_row_follows_sorted_years() {
        let mut series = RatioSeries::new(vec![2024, 2023, 2024]);
        series.set(Ratio::Leverage, 2024, Some(2.0));
        series.set(Ratio::Leverage, 2023, None);

        assert_eq!(series.years, vec![2023, 2024]);
        assert_eq!(series.row(Ratio::Leverage), vec![None, Some(2.0)]);
        assert_eq!(series.row(Ratio::AssetTurnover), vec![None, None]);
    }

    #[test]
    fn test_line_item_statements() {
        assert_eq!(LineItem::Revenue.statement(), Statement::Income);
        assert_eq!(LineItem::NetIncomeCommon.statement(), Statement::Income);
        assert_eq!(LineItem::Inventory.statement(), Statement::Balance);
        for item in LineItem::ALL {
            assert!(!item.default_labels().is_empty());
        }
    }
}
