//! FrameOxide core: typed, column-oriented, in-memory tables.
//!
//! Everything lives under [`data`]; the most used types are re-exported here.

pub mod data;

pub use data::{
    Aggregation, AggregationType, ColumnType, Comparator, DataError, DataFrame, DataFrameBuilder,
    Element, F, Groups, Indexes, LoadOptions, Order, Result, ResultExt, Series, Value,
};
