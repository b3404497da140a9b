use crate::error::RatioResult;
use crate::excel::{TableExtractor, WorkbookDocument};
use crate::layout::{load_layout, Layout};
use crate::pipeline::{build_ratios, RunOptions};
use crate::types::{Ratio, RatioSeries, Statement, Table};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

/// Format a number for display, removing unnecessary decimal places
fn format_number(n: f64) -> String {
    // Round to 4 decimal places for display; the workbook keeps full precision
    let rounded = (n * 1e4).round() / 1e4;
    let formatted = format!("{:.4}", rounded)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string();
    if formatted == "-0" {
        "0".to_string()
    } else {
        formatted
    }
}

/// Display text for a ratio value; unknown values render as a dash
fn format_cell(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_else(|| "—".to_string())
}

fn resolve_layout(layout: Option<&PathBuf>, verbose: bool) -> RatioResult<Layout> {
    if verbose {
        match layout {
            Some(path) => println!("{}", format!("📐 Loading layout {}", path.display()).cyan()),
            None => println!("{}", "📐 Using built-in layout".cyan()),
        }
    }
    load_layout(layout.map(PathBuf::as_path))
}

/// Execute the calculate command
pub fn calculate(
    input: PathBuf,
    output: Option<PathBuf>,
    layout: Option<PathBuf>,
    include_days: bool,
    dry_run: bool,
    json: bool,
    verbose: bool,
) -> RatioResult<()> {
    // JSON mode keeps stdout machine-readable
    let chatty = !json;

    if chatty {
        println!("{}", "📊 Ratiosheet - Calculating ratios".bold().green());
        println!("   Input:  {}", input.display());
        if !dry_run {
            let target = output.as_ref().unwrap_or(&input);
            println!("   Output: {}", target.display());
        }
        println!();
        if dry_run {
            println!(
                "{}",
                "📋 DRY RUN MODE - No changes will be written\n".yellow()
            );
        }
    }

    let layout = resolve_layout(layout.as_ref(), verbose && chatty)?;
    let options = RunOptions {
        output,
        include_intermediates: include_days,
        dry_run,
    };

    let report = build_ratios(&input, &layout, &options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report.series)?);
        return Ok(());
    }

    if verbose {
        for statement in Statement::ALL {
            let table = report.statements.table(statement);
            println!(
                "   {} {}: {} line items, years {:?}",
                "📄".cyan(),
                statement.title(),
                table.len(),
                table.years()
            );
        }
        println!();
    }

    print_ratio_table(&report.series, include_days);

    match report.written_to {
        Some(path) => {
            println!(
                "{}",
                format!("✅ {} sheet written to {}", layout.result_sheet, path.display())
                    .bold()
                    .green()
            );
        }
        None => {
            println!("{}", "✅ Dry run complete - workbook not modified".bold().green());
        }
    }

    Ok(())
}

/// Print ratios as a terminal table, one column per year
fn print_ratio_table(series: &RatioSeries, include_days: bool) {
    if series.years.is_empty() {
        println!(
            "{}",
            "⚠️  No fiscal year appears in both the income statement and balance sheet".yellow()
        );
        println!();
        return;
    }

    println!("{}", "📈 Ratios:".bold().cyan());
    let mut header = format!("   {:<28}", "Ratio");
    for year in &series.years {
        header.push_str(&format!("{:>14}", year));
    }
    println!("{}", header.bold());
    println!("   {}", "─".repeat(28 + 14 * series.years.len()));

    for ratio in Ratio::output_order(include_days) {
        let mut line = format!("   {:<28}", ratio.name());
        for value in series.row(ratio) {
            line.push_str(&format!("{:>14}", format_cell(value)));
        }
        println!("{}", line);
    }
    println!();
}

/// Execute the layout command
pub fn layout(output: Option<PathBuf>) -> RatioResult<()> {
    let yaml = Layout::default().to_yaml()?;

    match output {
        Some(path) => {
            fs::write(&path, yaml)?;
            println!(
                "{}",
                format!("✅ Default layout written to {}", path.display())
                    .bold()
                    .green()
            );
        }
        None => print!("{}", yaml),
    }

    Ok(())
}

/// Execute the inspect command
pub fn inspect(input: PathBuf, layout: Option<PathBuf>, sheet: Option<String>) -> RatioResult<()> {
    println!("{}", "🔍 Ratiosheet - Inspecting statements".bold().green());
    println!("   File: {}\n", input.display());

    let layout = load_layout(layout.as_deref())?;
    let document = WorkbookDocument::open(&input)?;

    let mut matched = false;
    for statement in Statement::ALL {
        let config = layout.sheet(statement);
        if sheet.as_ref().is_some_and(|name| name != &config.name) {
            continue;
        }
        matched = true;

        let grid = &document.require(&config.name)?.values;
        let table = TableExtractor::new(config).extract(grid);
        print_table(statement, &config.name, &table);
    }

    if !matched {
        if let Some(name) = sheet {
            println!(
                "{}",
                format!("⚠️  '{}' is not a statement sheet in this layout", name).yellow()
            );
        }
    }

    Ok(())
}

fn print_table(statement: Statement, sheet_name: &str, table: &Table) {
    println!(
        "{} {} ({})",
        "📄".cyan(),
        statement.title().bold(),
        sheet_name.bright_blue()
    );

    if table.is_empty() {
        println!("   (no line items with numeric values)\n");
        return;
    }

    let years: Vec<_> = table.years().into_iter().collect();
    let mut header = format!("   {:<60}", "Label");
    for year in &years {
        header.push_str(&format!("{:>16}", year));
    }
    println!("{}", header.bold());

    for (label, values) in table.iter() {
        let mut line = format!("   {:<60}", label);
        for year in &years {
            line.push_str(&format!("{:>16}", format_cell(values.get(year).copied())));
        }
        println!("{}", line);
    }
    println!();
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
