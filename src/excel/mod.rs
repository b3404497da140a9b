//! Excel side of a run
//!
//! - Document: .xlsx → in-memory sheets (values + formulas) and defined names
//! - Extractor: statement sheet → normalized label/year table
//! - Writer: sheets + ratio series → .xlsx with the result sheet replaced

mod document;
mod extractor;
mod writer;

pub use document::{DefinedName, SheetData, WorkbookDocument};
pub use extractor::TableExtractor;
pub use writer::{write_ratio_sheet, WorkbookWriter};
