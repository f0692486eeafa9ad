//! Core data structures for FrameOxide
//!
//! This module provides typed columns ([`Series`]), tables ([`DataFrame`]) and
//! the selection, sorting, grouping and join machinery built on top of them.
//! Every fallible operation returns a [`Result`]; a failed operation never
//! leaves its receiver half-modified.

mod builder;
mod dataframe;
mod element;
mod grouped;
mod index;
mod join;
mod ops;
mod series;
mod traits;
mod utils;


// Re-exports
pub use builder::{DataFrameBuilder, LoadOptions, load_maps, load_matrix, load_records, load_structs};
pub use dataframe::DataFrame;
pub use element::{Element, Value};
pub use grouped::{AggregationType, GroupKey, Groups, KeyPart};
pub use index::{Indexes, resolve_columns, resolve_rows};
pub use ops::{Aggregation, ColumnRef, Condition, F, Order};
pub use series::{Comparator, ElementPredicate, Operand, Series, SeriesData};
pub use traits::{FieldDef, Matrix, Record};
pub use utils::{ColumnType, dominant_type, fix_colnames, infer_column_type};

/// Error types specific to data operations
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    #[error("No columns given")]
    NoColumns,

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Too many column names: {names} names for {columns} columns")]
    TooManyNames { names: usize, columns: usize },

    #[error("Not enough column names: {names} names for {columns} columns")]
    NotEnoughNames { names: usize, columns: usize },

    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("Index out of bounds: index {index}, length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("Boolean mask length mismatch: expected {expected}, got {actual}")]
    MaskLengthMismatch { expected: usize, actual: usize },

    #[error("Unsupported selector: {0}")]
    UnsupportedSelector(String),

    #[error("Invalid column type: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Couldn't detect column type")]
    TypeUndetectable,

    #[error("Can't convert '{value}' to {target}")]
    InvalidCoercion { value: String, target: ColumnType },

    #[error("Missing data in column: {0}")]
    MissingData(String),

    #[error("{}", .0.join("; "))]
    MissingKeys(Vec<String>),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<DataError>,
    },
}

impl DataError {
    /// Wrap this error with the operation (and column) it occurred in
    pub fn context(self, context: impl Into<String>) -> Self {
        DataError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with every context layer stripped
    pub fn root_cause(&self) -> &DataError {
        match self {
            DataError::Context { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type for data operations
pub type Result<T> = std::result::Result<T, DataError>;

/// Attaches operation context to a failed [`Result`]
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| e.context(f()))
    }
}
