//! Ratio engine: label resolution and the ratio formulas

pub mod calculator;
pub mod math;
pub mod resolver;

pub use calculator::RatioCalculator;
pub use resolver::find_value;
