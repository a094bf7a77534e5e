//! Feature matrix extraction from heterogeneous row records.
//!
//! Measurement rows arrive as loosely-typed maps (spreadsheet imports rarely
//! agree on types: a sensor column may hold numbers, numeric strings, and
//! blanks in the same file). The analytics stages downstream want a dense
//! numeric matrix. This module bridges the two with a **permissive coercion
//! policy**: a cell that is missing or non-numeric becomes `0.0` instead of
//! failing the whole run. The original row values stay untouched in the
//! caller's hands for display purposes.

use std::collections::HashMap;

/// A single cell value in a measurement row.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// A numeric measurement.
    Number(f64),
    /// Free text (labels, units, operator notes).
    Text(String),
}

impl CellValue {
    /// Numeric view of the cell under the permissive coercion policy.
    ///
    /// Numbers pass through. Text is parsed as a number when possible
    /// (spreadsheet imports frequently deliver numbers as strings);
    /// anything else coerces to `0.0`.
    pub fn as_number(&self) -> f64 {
        match self {
            CellValue::Number(x) => *x,
            CellValue::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        }
    }
}

impl From<f64> for CellValue {
    fn from(x: f64) -> Self {
        CellValue::Number(x)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

/// A measurement row: column name → cell value. Absent columns are simply
/// missing keys.
pub type Row = HashMap<String, CellValue>;

/// Extract a dense numeric matrix from `rows` for the selected columns.
///
/// Output is row-major, one vector per input row, one component per selected
/// column in selection order. Every vector has length `columns.len()`.
/// Missing or non-numeric cells coerce to `0.0`; an empty row list yields an
/// empty matrix. Deterministic, no error conditions.
pub fn feature_matrix(rows: &[Row], columns: &[String]) -> Vec<Vec<f64>> {
    rows.iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| row.get(col).map(CellValue::as_number).unwrap_or(0.0))
                .collect()
        })
        .collect()
}

/// Extract a single numeric-coerced column.
///
/// Same coercion rule as [`feature_matrix`]; used by the correlation engine,
/// which works column-at-a-time.
pub fn numeric_column(rows: &[Row], column: &str) -> Vec<f64> {
    rows.iter()
        .map(|row| row.get(column).map(CellValue::as_number).unwrap_or(0.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, CellValue)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_matrix_shape_and_order() {
        let rows = vec![
            row(&[("a", 1.0.into()), ("b", 2.0.into())]),
            row(&[("a", 3.0.into()), ("b", 4.0.into())]),
        ];
        let cols = vec!["b".to_string(), "a".to_string()];

        let m = feature_matrix(&rows, &cols);
        assert_eq!(m, vec![vec![2.0, 1.0], vec![4.0, 3.0]]);
    }

    #[test]
    fn test_missing_and_text_coerce_to_zero() {
        let rows = vec![row(&[("a", 1.0.into()), ("note", "warm-up run".into())])];
        let cols = vec!["a".to_string(), "note".to_string(), "absent".to_string()];

        let m = feature_matrix(&rows, &cols);
        assert_eq!(m, vec![vec![1.0, 0.0, 0.0]]);
    }

    #[test]
    fn test_numeric_text_parses() {
        let rows = vec![row(&[("a", " 3.5 ".into())])];
        let m = feature_matrix(&rows, &["a".to_string()]);
        assert_eq!(m, vec![vec![3.5]]);
    }

    #[test]
    fn test_empty_rows_yield_empty_matrix() {
        let m = feature_matrix(&[], &["a".to_string()]);
        assert!(m.is_empty());
    }

    #[test]
    fn test_numeric_column() {
        let rows = vec![
            row(&[("a", 1.0.into())]),
            row(&[("b", 9.0.into())]),
            row(&[("a", "2".into())]),
        ];
        assert_eq!(numeric_column(&rows, "a"), vec![1.0, 0.0, 2.0]);
    }
}
