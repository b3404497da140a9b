//! Label resolution against an extracted table

use crate::types::{normalize_label, Table, Year};

/// Find the value of a line item for a year.
///
/// Exact normalized matches are tried first, in variant order. Failing that,
/// the table is scanned in extraction order and the first key that contains
/// any variant as a substring (and has the year) wins. The substring pass is
/// best-effort: it tolerates suffixes such as "Revenue (Note 3)" but can pick
/// an unrelated row that happens to contain the variant text.
///
/// Returns `None` when nothing matches; an unmatched label is not an error.
pub fn find_value<S: AsRef<str>>(table: &Table, variants: &[S], year: Year) -> Option<f64> {
    let keys: Vec<String> = variants
        .iter()
        .map(|variant| normalize_label(variant.as_ref()))
        .filter(|key| !key.is_empty())
        .collect();

    if let Some(value) = keys.iter().find_map(|key| table.value(key, year)) {
        return Some(value);
    }

    table.iter().find_map(|(label, values)| {
        let value = values.get(&year)?;
        keys.iter()
            .any(|key| label.contains(key.as_str()))
            .then_some(*value)
    })
}
