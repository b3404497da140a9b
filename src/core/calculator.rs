use super::math::{average, cash_conversion_cycle, days_outstanding, safe_divide};
use super::resolver::find_value;
use crate::layout::LabelCatalog;
use crate::types::{LineItem, Ratio, RatioSeries, Statements, Year};
use tracing::{debug, warn};

/// Derives the ratio series from extracted statements
pub struct RatioCalculator<'a> {
    statements: &'a Statements,
    labels: &'a LabelCatalog,
}

impl<'a> RatioCalculator<'a> {
    #[must_use]
    pub fn new(statements: &'a Statements, labels: &'a LabelCatalog) -> Self {
        Self { statements, labels }
    }

    /// Compute every ratio for each year present in both income and balance tables
    pub fn calculate(&self) -> RatioSeries {
        let years = self.statements.run_years();
        if years.is_empty() {
            warn!("income statement and balance sheet share no fiscal year");
        }

        let mut series = RatioSeries::new(years);
        for year in series.years.clone() {
            for (ratio, value) in self.calculate_year(year) {
                series.set(ratio, year, value);
            }
        }
        series
    }

    /// All ratios for one fiscal year, in [`Ratio::ALL`] order
    pub fn calculate_year(&self, year: Year) -> Vec<(Ratio, Option<f64>)> {
        let revenue = self.resolve(LineItem::Revenue, year);
        let cost_of_revenue = self.resolve(LineItem::CostOfRevenue, year);
        let net_income = self.resolve(LineItem::NetIncome, year);
        let net_income_common = self.resolve(LineItem::NetIncomeCommon, year);

        let avg_receivables = self.average_balance(LineItem::AccountsReceivable, year);
        let avg_inventory = self.average_balance(LineItem::Inventory, year);
        let avg_payables = self.average_balance(LineItem::AccountsPayable, year);
        let avg_ppe = self.average_balance(LineItem::PropertyAndEquipment, year);
        let avg_assets = self.average_balance(LineItem::TotalAssets, year);
        let avg_equity = self.average_balance(LineItem::TotalEquity, year);
        let avg_common_equity = self.average_balance(LineItem::TotalStockholdersEquity, year);

        let receivables_turnover = safe_divide(revenue, avg_receivables);
        let inventory_turnover = safe_divide(cost_of_revenue, avg_inventory);
        let payables_turnover = safe_divide(cost_of_revenue, avg_payables);

        let dso = days_outstanding(receivables_turnover);
        let dio = days_outstanding(inventory_turnover);
        let dpo = days_outstanding(payables_turnover);

        vec![
            (Ratio::ReceivablesTurnover, receivables_turnover),
            (Ratio::InventoryTurnover, inventory_turnover),
            (Ratio::PayablesTurnover, payables_turnover),
            (Ratio::PpeTurnover, safe_divide(revenue, avg_ppe)),
            (Ratio::AssetTurnover, safe_divide(revenue, avg_assets)),
            (Ratio::ReturnOnAssets, safe_divide(net_income, avg_assets)),
            (Ratio::DaysSalesOutstanding, dso),
            (Ratio::DaysInventoryOutstanding, dio),
            (Ratio::DaysPayableOutstanding, dpo),
            (Ratio::CashConversionCycle, cash_conversion_cycle(dso, dio, dpo)),
            (Ratio::ReturnOnEquity, safe_divide(net_income, avg_equity)),
            (
                Ratio::ReturnOnCommonEquity,
                safe_divide(net_income_common, avg_common_equity),
            ),
            (Ratio::NetProfitMargin, safe_divide(net_income, revenue)),
            (Ratio::Leverage, safe_divide(avg_assets, avg_equity)),
        ]
    }

    /// Resolve a line item in the statement it belongs to
    fn resolve(&self, item: LineItem, year: Year) -> Option<f64> {
        let table = self.statements.table(item.statement());
        let value = find_value(table, &self.labels.variants(item), year);
        if value.is_none() {
            debug!(?item, year, "line item not found");
        }
        value
    }

    /// Mean of the year's balance and the prior year's balance
    fn average_balance(&self, item: LineItem, year: Year) -> Option<f64> {
        let prior = year
            .checked_sub(1)
            .and_then(|prior| self.resolve(item, prior));
        average(self.resolve(item, year), prior)
    }
}
