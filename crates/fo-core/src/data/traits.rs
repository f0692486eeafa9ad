//! Ingestion traits for foreign data sources

use ndarray::Array2;

use super::*;

/// A row/column addressable numeric matrix
pub trait Matrix {
    /// (rows, columns)
    fn dims(&self) -> (usize, usize);

    fn at(&self, row: usize, col: usize) -> f64;
}

impl Matrix for Array2<f64> {
    fn dims(&self) -> (usize, usize) {
        self.dim()
    }

    fn at(&self, row: usize, col: usize) -> f64 {
        self[[row, col]]
    }
}

impl Matrix for Vec<Vec<f64>> {
    fn dims(&self) -> (usize, usize) {
        (self.len(), self.first().map_or(0, Vec::len))
    }

    fn at(&self, row: usize, col: usize) -> f64 {
        self.get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(f64::NAN)
    }
}

/// Description of one record field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub column_type: ColumnType,
    /// Skip this field when loading
    pub ignore: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            ignore: false,
        }
    }

    pub fn ignored(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            ignore: true,
            ..Self::new(name, column_type)
        }
    }
}

/// A record type that can be loaded with [`load_structs`]
///
/// `values` must return one entry per field of `fields`, in the same order,
/// including ignored fields.
pub trait Record {
    fn fields() -> Vec<FieldDef>;

    fn values(&self) -> Vec<Option<Value>>;
}
