//! Unknown-propagating arithmetic
//!
//! `None` is an unknown value. Every helper here returns `None` instead of
//! failing, and never yields an infinite or NaN result.

/// Days in the fiscal year used by the day-count ratios
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Guarded division: unknown when either operand is unknown or the divisor is zero
pub fn safe_divide(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (numerator, denominator) = (numerator?, denominator?);
    if denominator == 0.0 {
        return None;
    }
    let quotient = numerator / denominator;
    quotient.is_finite().then_some(quotient)
}

/// Average balance of the current and prior year; no partial averaging
pub fn average(current: Option<f64>, prior: Option<f64>) -> Option<f64> {
    let mean = (current? + prior?) / 2.0;
    mean.is_finite().then_some(mean)
}

/// Day count for a turnover ratio (365 / turnover)
pub fn days_outstanding(turnover: Option<f64>) -> Option<f64> {
    safe_divide(Some(DAYS_PER_YEAR), turnover)
}

/// Cash conversion cycle: DSO + DIO - DPO.
///
/// Without inventory days the cycle is DSO - DPO, so companies that carry no
/// inventory still get a cycle. Unknown DSO or DPO leaves the cycle unknown.
pub fn cash_conversion_cycle(
    dso: Option<f64>,
    dio: Option<f64>,
    dpo: Option<f64>,
) -> Option<f64> {
    let (dso, dpo) = (dso?, dpo?);
    Some(match dio {
        Some(dio) => dso + dio - dpo,
        None => dso - dpo,
    })
}
