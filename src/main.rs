use clap::{Parser, Subcommand};
use ratiosheet::cli;
use ratiosheet::error::RatioResult;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ratiosheet")]
#[command(about = "Financial ratios from the statement sheets of an Excel workbook")]
#[command(long_about = "Ratiosheet - financial ratios from statement sheets

Reads INCOME_STATEMENT, BALANCE_SHEET, STOCKHOLDERS_EQUITY and CASH_FLOW at
fixed positions, resolves line items by label and writes year-over-year
ratios to a RATIOS sheet (replacing any previous one).

COMMANDS:
  calculate - Compute ratios and write the RATIOS sheet
  layout    - Print the built-in sheet layout as YAML
  inspect   - Show the line items extracted from each statement

EXAMPLES:
  ratiosheet calculate financials.xlsx                 # Update in place
  ratiosheet calculate financials.xlsx -o ratios.xlsx  # Write a copy
  ratiosheet layout -o layout.yaml                     # Start a custom layout
  ratiosheet calculate book.xlsx --layout layout.yaml --dry-run")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Compute financial ratios and write them to the RATIOS sheet.

RATIOS:
  A/R Turnover, Inventory Turnover, A/P Turnover, PPE Turnover,
  Asset Turnover, Return on Assets, Cash Conversion Cycle,
  Return on Equity, Return on Common Equity, Net Profit Margin, Leverage

Balance-sheet inputs use the average of the current and prior year.
Ratios that cannot be determined (missing line item, zero divisor) are
left as empty cells, never zero.

Only years present in both the income statement and the balance sheet
are computed. An existing RATIOS sheet is dropped and rebuilt.

Use --dry-run to preview ratios without modifying files.")]
    /// Compute ratios and write the RATIOS sheet
    Calculate {
        /// Path to the Excel workbook (.xlsx)
        input: PathBuf,

        /// Output workbook (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Sheet layout YAML (default: built-in layout)
        #[arg(short, long, env = "RATIOSHEET_LAYOUT")]
        layout: Option<PathBuf>,

        /// Also write Days Sales/Inventory/Payable Outstanding rows
        #[arg(long)]
        include_days: bool,

        /// Compute and print ratios without writing the workbook
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Print the ratio series as JSON
        #[arg(long)]
        json: bool,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the built-in sheet layout as YAML
    Layout {
        /// Write the layout to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the line items extracted from each statement sheet
    Inspect {
        /// Path to the Excel workbook (.xlsx)
        input: PathBuf,

        /// Sheet layout YAML (default: built-in layout)
        #[arg(short, long, env = "RATIOSHEET_LAYOUT")]
        layout: Option<PathBuf>,

        /// Only show this statement sheet
        #[arg(short, long)]
        sheet: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "ratiosheet=debug"
    } else {
        "ratiosheet=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> RatioResult<()> {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Calculate { verbose: true, .. });
    init_tracing(verbose);

    match cli.command {
        Commands::Calculate {
            input,
            output,
            layout,
            include_days,
            dry_run,
            json,
            verbose,
        } => cli::calculate(input, output, layout, include_days, dry_run, json, verbose),

        Commands::Layout { output } => cli::layout(output),

        Commands::Inspect {
            input,
            layout,
            sheet,
        } => cli::inspect(input, layout, sheet),
    }
}
