//! DataFrame implementation for tabular data
//!
//! A DataFrame is an ordered set of equal-length, uniquely named columns of
//! potentially different types. Every operation here returns a new table,
//! except [`DataFrame::set`] and [`DataFrame::set_names`] which mutate an
//! explicitly borrowed handle.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use ndarray::Array2;

use super::*;

/// Main DataFrame structure
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataFrame {
    pub(crate) columns: Vec<Series>,
    pub(crate) nrows: usize,
}

impl DataFrame {
    /// Build a table from columns.
    ///
    /// Fails on zero columns or unequal column lengths. Empty names become
    /// `X0`, `X1`, ... and duplicated names are suffixed `_0`, `_1`, ...
    pub fn new(columns: Vec<Series>) -> Result<Self> {
        let Some(first) = columns.first() else {
            return Err(DataError::NoColumns);
        };
        let nrows = first.len();
        if let Some((i, bad)) = columns.iter().enumerate().find(|(_, s)| s.len() != nrows) {
            return Err(DataError::DimensionMismatch {
                expected: format!("{nrows} rows"),
                actual: format!("{} rows in column {i} '{}'", bad.len(), bad.name()),
            });
        }

        let mut df = Self { columns, nrows };
        df.fix_names();
        Ok(df)
    }

    fn fix_names(&mut self) {
        let mut names = self.names();
        fix_colnames(&mut names);
        for (col, name) in self.columns.iter_mut().zip(names) {
            col.set_name(name);
        }
    }

    /// Get the shape of the DataFrame (rows, columns)
    pub fn dims(&self) -> (usize, usize) {
        (self.nrows, self.columns.len())
    }

    /// Get the number of rows
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Get the number of columns
    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    /// True when the table has no rows or no columns
    pub fn is_empty(&self) -> bool {
        self.nrows == 0 || self.columns.is_empty()
    }

    /// Get column names
    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|s| s.name().to_string()).collect()
    }

    pub fn types(&self) -> Vec<ColumnType> {
        self.columns.iter().map(Series::column_type).collect()
    }

    pub fn columns(&self) -> &[Series] {
        &self.columns
    }

    /// Get a reference to a column
    pub fn column(&self, name: &str) -> Option<&Series> {
        self.columns.iter().find(|s| s.name() == name)
    }

    /// Copy of the named column
    pub fn col(&self, name: &str) -> Result<Series> {
        self.column(name)
            .cloned()
            .ok_or_else(|| DataError::ColumnNotFound(name.to_string()))
    }

    pub fn col_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|s| s.name() == name)
    }

    /// Element at row `r`, column `c`
    pub fn elem(&self, r: usize, c: usize) -> Option<Element> {
        self.columns.get(c).and_then(|s| s.get(r))
    }

    /// Replace every column name; names are fixed as in [`DataFrame::new`]
    pub fn set_names<S: Into<String>>(&mut self, names: Vec<S>) -> Result<()> {
        if names.len() != self.ncols() {
            return Err(DataError::DimensionMismatch {
                expected: format!("{} names", self.ncols()),
                actual: format!("{} names", names.len()),
            })
            .context("set_names");
        }
        for (col, name) in self.columns.iter_mut().zip(names) {
            col.set_name(name);
        }
        self.fix_names();
        Ok(())
    }

    // ==================== Column selection ====================

    /// New table with the selected columns, in selector order
    pub fn select(&self, selector: impl Into<Indexes>) -> Result<Self> {
        let idx = resolve_columns(&self.names(), &selector.into()).context("select")?;
        let columns = idx.iter().map(|&i| self.columns[i].clone()).collect();
        Self::new(columns).context("select")
    }

    /// New table without the selected columns, keeping original order
    pub fn drop(&self, selector: impl Into<Indexes>) -> Result<Self> {
        let idx = resolve_columns(&self.names(), &selector.into()).context("drop")?;
        let columns = self
            .columns
            .iter()
            .enumerate()
            .filter(|(i, _)| !idx.contains(i))
            .map(|(_, s)| s.clone())
            .collect();
        Self::new(columns).context("drop")
    }

    /// Copy with column `old` renamed to `new`
    pub fn rename(&self, new: &str, old: &str) -> Result<Self> {
        let idx = self
            .col_index(old)
            .ok_or_else(|| DataError::ColumnNotFound(old.to_string()))
            .context("rename")?;
        let mut df = self.clone();
        df.columns[idx].set_name(new);
        df.fix_names();
        Ok(df)
    }

    // ==================== Row selection ====================

    /// New table with the selected rows
    pub fn subset(&self, selector: impl Into<Indexes>) -> Result<Self> {
        let idx = resolve_rows(self.nrows, &selector.into()).context("subset")?;
        Ok(self.take_rows(&idx))
    }

    pub(crate) fn take_rows(&self, idx: &[usize]) -> Self {
        Self {
            columns: self.columns.iter().map(|s| s.take(idx)).collect(),
            nrows: idx.len(),
        }
    }

    /// Overwrite the selected rows with the rows of `values`, column by
    /// column. Either every column is written or none is.
    pub fn set(&mut self, selector: impl Into<Indexes>, values: &DataFrame) -> Result<()> {
        if values.ncols() != self.ncols() {
            return Err(DataError::DimensionMismatch {
                expected: format!("{} columns", self.ncols()),
                actual: format!("{} columns", values.ncols()),
            })
            .context("set");
        }
        let selector = selector.into();
        let mut updated = self.columns.clone();
        for (i, (col, new)) in updated.iter_mut().zip(&values.columns).enumerate() {
            col.set(selector.clone(), new)
                .with_context(|| format!("set: column {i} '{}'", col.name()))?;
        }
        self.columns = updated;
        Ok(())
    }

    // ==================== Combining tables ====================

    /// Columns of `self` followed by the columns of `other`
    pub fn cbind(&self, other: &DataFrame) -> Result<Self> {
        let columns = self.columns.iter().chain(&other.columns).cloned().collect();
        Self::new(columns).context("cbind")
    }

    /// Rows of `self` followed by the rows of `other`, matching columns by
    /// name. Both tables must have the same set of column names.
    pub fn rbind(&self, other: &DataFrame) -> Result<Self> {
        if self.ncols() != other.ncols() {
            return Err(DataError::DimensionMismatch {
                expected: format!("{} columns", self.ncols()),
                actual: format!("{} columns", other.ncols()),
            })
            .context("rbind");
        }
        let columns = self
            .columns
            .iter()
            .map(|col| {
                other
                    .column(col.name())
                    .map(|o| col.concat(o))
                    .ok_or_else(|| DataError::ColumnNotFound(col.name().to_string()))
            })
            .collect::<Result<Vec<_>>>()
            .context("rbind")?;
        Self::new(columns).context("rbind")
    }

    /// Like [`DataFrame::rbind`] but tolerant of disjoint columns: a column
    /// missing from one side is padded with missing values for that side's
    /// rows. Columns appear in first-seen order across both tables.
    pub fn concat(&self, other: &DataFrame) -> Result<Self> {
        let names: IndexSet<String> = self.names().into_iter().chain(other.names()).collect();
        let columns = names
            .iter()
            .filter_map(|name| match (self.column(name), other.column(name)) {
                (Some(a), Some(b)) => Some(a.concat(b)),
                (Some(a), None) => Some(a.concat(&missing_column(a, other.nrows))),
                (None, Some(b)) => Some(missing_column(b, self.nrows).concat(b)),
                (None, None) => None,
            })
            .collect();
        Self::new(columns).context("concat")
    }

    /// Replace the column with the same name, or append it.
    ///
    /// Its length must equal the row count, unless this table has no columns.
    pub fn mutate(&self, series: Series) -> Result<Self> {
        if !self.columns.is_empty() && series.len() != self.nrows {
            return Err(DataError::DimensionMismatch {
                expected: format!("{} rows", self.nrows),
                actual: format!("{} rows", series.len()),
            })
            .context("mutate");
        }
        let mut columns = self.columns.clone();
        match self.col_index(series.name()) {
            Some(idx) => columns[idx] = series,
            None => columns.push(series),
        }
        Self::new(columns).context("mutate")
    }

    // ==================== Apply ====================

    /// Apply `f` to every column; column names are preserved
    pub fn capply<M>(&self, f: M) -> Result<Self>
    where
        M: Fn(&Series) -> Series,
    {
        let columns = self
            .columns
            .iter()
            .map(|s| f(s).with_name(s.name()))
            .collect();
        Self::new(columns).context("capply")
    }

    /// Apply `f` to every row.
    ///
    /// Each row is handed to `f` as an unnamed series whose type is the
    /// dominant declared column type. All outputs must have the same length;
    /// output column `j` takes the dominant type of the elements emitted at
    /// position `j`. Output columns are named `X0`, `X1`, ...
    pub fn rapply<M>(&self, f: M) -> Result<Self>
    where
        M: Fn(&Series) -> Series,
    {
        if self.is_empty() {
            return Ok(self.clone());
        }
        let Some(row_type) = dominant_type(self.types()) else {
            return Ok(self.clone());
        };

        let mut rows: Vec<Vec<Element>> = Vec::with_capacity(self.nrows);
        for i in 0..self.nrows {
            let mut row = Series::new_empty("", row_type);
            row.append(self.columns.iter().filter_map(|c| c.get(i)));
            let out = f(&row);
            if let Some(first) = rows.first()
                && first.len() != out.len()
            {
                return Err(DataError::DimensionMismatch {
                    expected: format!("{} elements per row", first.len()),
                    actual: format!("{} elements on row {i}", out.len()),
                })
                .context("rapply");
            }
            rows.push(out.elements());
        }

        let width = rows.first().map_or(0, Vec::len);
        let columns = (0..width)
            .map(|j| {
                let cells: Vec<&Element> = rows.iter().filter_map(|r| r.get(j)).collect();
                let ty = dominant_type(cells.iter().map(|e| e.column_type()))
                    .unwrap_or(row_type);
                Series::from_elements("", ty, cells)
            })
            .collect();
        Self::new(columns).context("rapply")
    }

    // ==================== Export ====================

    /// Header row followed by one string record per row; missing is `NaN`
    pub fn records(&self) -> Vec<Vec<String>> {
        let mut records = vec![self.names()];
        let columns: Vec<Vec<String>> = self.columns.iter().map(Series::records).collect();
        for i in 0..self.nrows {
            records.push(columns.iter().map(|c| c[i].clone()).collect());
        }
        records
    }

    /// [`DataFrame::records`] with fields quoted the way a delimited-text
    /// writer expects them: fields containing the delimiter, a quote or a
    /// line break are wrapped in quotes and inner quotes are doubled.
    ///
    /// This only prepares the fields; writing them out is left to the
    /// caller's writer.
    pub fn quoted_records(&self, delimiter: char) -> Vec<Vec<String>> {
        self.records()
            .into_iter()
            .map(|row| row.iter().map(|f| quote_field(f, delimiter)).collect())
            .collect()
    }

    /// One name-to-value map per row; missing cells map to `None`
    pub fn maps(&self) -> Vec<IndexMap<String, Option<Value>>> {
        (0..self.nrows)
            .map(|i| {
                self.columns
                    .iter()
                    .map(|c| (c.name().to_string(), c.value(i)))
                    .collect()
            })
            .collect()
    }

    /// Numeric columns (int, float, bool) as a row-major matrix; missing is `NaN`
    pub fn numeric_matrix(&self) -> Array2<f64> {
        let numeric: Vec<Vec<f64>> = self
            .columns
            .iter()
            .filter(|s| s.column_type().is_numeric())
            .map(Series::float_values)
            .collect();
        Array2::from_shape_fn((self.nrows, numeric.len()), |(r, c)| numeric[c][r])
    }

    /// Summary statistics, one column per input column.
    ///
    /// The first column, `column`, labels the rows: mean, median, stddev,
    /// min, 25%, 50%, 75%, max. Numeric and bool columns become float
    /// columns; string columns only report their min and max.
    pub fn describe(&self) -> Result<Self> {
        let labels = Series::string(
            "column",
            vec!["mean", "median", "stddev", "min", "25%", "50%", "75%", "max"],
        );
        let mut columns = vec![labels];
        for col in &self.columns {
            let summary = match col.column_type() {
                ColumnType::String => {
                    let dash = || Some("-".to_string());
                    Series::new(
                        col.name(),
                        vec![
                            dash(),
                            dash(),
                            dash(),
                            Some(col.min_str()),
                            dash(),
                            dash(),
                            dash(),
                            Some(col.max_str()),
                        ],
                    )
                }
                _ => Series::float(
                    col.name(),
                    vec![
                        col.mean(),
                        col.median(),
                        col.std_dev(),
                        col.min(),
                        col.quantile(0.25),
                        col.quantile(0.50),
                        col.quantile(0.75),
                        col.max(),
                    ],
                ),
            };
            columns.push(summary);
        }
        Self::new(columns).context("describe")
    }
}

impl fmt::Display for DataFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataFrame({} rows × {} cols)", self.nrows, self.ncols())
    }
}

/// All-missing column shaped like `like`
fn missing_column(like: &Series, len: usize) -> Series {
    let missing = vec![Element::missing(like.column_type()); len];
    Series::from_elements(like.name(), like.column_type(), &missing)
}

fn quote_field(field: &str, delimiter: char) -> String {
    let needs_quotes = field
        .chars()
        .any(|c| c == delimiter || c == '"' || c == '\r' || c == '\n');
    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
