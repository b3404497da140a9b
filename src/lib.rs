//! Ratiosheet - financial ratios from statement sheets in an Excel workbook
//!
//! Reads the income statement, balance sheet, stockholders' equity and cash
//! flow sheets at fixed, configurable positions, resolves line items by label,
//! computes year-over-year ratios and writes them back as a `RATIOS` sheet.
//!
//! # Features
//!
//! - Layout descriptors kept as data (built-in default or a YAML file)
//! - Exact-then-substring label matching tolerant of label drift
//! - Unknown values propagate instead of becoming zero, infinity or NaN
//! - Atomic save: the workbook is replaced only once fully written
//!
//! # Example
//!
//! ```no_run
//! use ratiosheet::layout::Layout;
//! use ratiosheet::pipeline::{build_ratios, RunOptions};
//! use std::path::Path;
//!
//! let report = build_ratios(
//!     Path::new("financials.xlsx"),
//!     &Layout::default(),
//!     &RunOptions::default(),
//! )?;
//!
//! println!("Years: {:?}", report.series.years);
//! # Ok::<(), ratiosheet::error::RatioError>(())
//! ```

pub mod cli;
pub mod core;
pub mod error;
pub mod excel;
pub mod layout;
pub mod pipeline;
pub mod types;

// Re-export commonly used types
pub use error::{RatioError, RatioResult};
pub use layout::{Layout, SheetConfig};
pub use types::{LineItem, Ratio, RatioSeries, Statements, Table};
