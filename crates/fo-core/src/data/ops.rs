//! Row filtering and sorting for DataFrames

use std::fmt;
use std::sync::Arc;

use super::*;

/// Column addressed by position or by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl From<usize> for ColumnRef {
    fn from(i: usize) -> Self {
        ColumnRef::Index(i)
    }
}

impl From<&str> for ColumnRef {
    fn from(s: &str) -> Self {
        ColumnRef::Name(s.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(s: String) -> Self {
        ColumnRef::Name(s)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Index(i) => write!(f, "#{i}"),
            ColumnRef::Name(n) => write!(f, "'{n}'"),
        }
    }
}

/// Test applied to every cell of a filtered column
#[derive(Clone)]
pub enum Condition {
    Compare(Comparator, Operand),
    Func(ElementPredicate),
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Compare(cmp, operand) => {
                f.debug_tuple("Compare").field(cmp).field(operand).finish()
            }
            Condition::Func(_) => f.write_str("Func(..)"),
        }
    }
}

/// A single row filter
#[derive(Debug, Clone)]
pub struct F {
    pub column: ColumnRef,
    pub condition: Condition,
}

impl F {
    /// Keep rows where `column <comparator> operand`
    pub fn new(
        column: impl Into<ColumnRef>,
        comparator: Comparator,
        operand: impl Into<Operand>,
    ) -> Self {
        Self {
            column: column.into(),
            condition: Condition::Compare(comparator, operand.into()),
        }
    }

    /// Keep rows where `predicate` holds for the cell of `column`
    pub fn func<P>(column: impl Into<ColumnRef>, predicate: P) -> Self
    where
        P: Fn(&Element) -> bool + Send + Sync + 'static,
    {
        Self {
            column: column.into(),
            condition: Condition::Func(Arc::new(predicate)),
        }
    }

    fn mask(&self, df: &DataFrame) -> Result<Vec<bool>> {
        let col = match &self.column {
            ColumnRef::Index(i) => df.columns.get(*i).ok_or(DataError::IndexOutOfBounds {
                index: *i as i64,
                len: df.ncols(),
            })?,
            ColumnRef::Name(name) => df
                .column(name)
                .ok_or_else(|| DataError::ColumnNotFound(name.clone()))?,
        };
        let result = match &self.condition {
            Condition::Compare(cmp, operand) => col.compare(*cmp, operand.clone())?,
            Condition::Func(predicate) => col.compare_with(|e| predicate(e)),
        };
        result.bool_values()
    }
}

/// How the masks of several filters are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggregation {
    /// A row is kept if any filter matches
    #[default]
    Or,
    /// A row is kept if every filter matches
    And,
}

/// A sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub reverse: bool,
}

impl Order {
    /// Ascending order on `column`
    pub fn sort(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            reverse: false,
        }
    }

    /// Descending order on `column`
    pub fn rev_sort(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            reverse: true,
        }
    }
}

impl DataFrame {
    /// Rows matching any of `filters`
    pub fn filter(&self, filters: &[F]) -> Result<Self> {
        self.filter_aggregation(Aggregation::Or, filters)
    }

    /// Rows whose filter results, combined with `agg`, are true.
    /// No filters returns a copy.
    pub fn filter_aggregation(&self, agg: Aggregation, filters: &[F]) -> Result<Self> {
        let mut combined: Option<Vec<bool>> = None;
        for f in filters {
            let mask = f
                .mask(self)
                .with_context(|| format!("filter on column {}", f.column))?;
            combined = Some(match combined {
                None => mask,
                Some(acc) => acc
                    .iter()
                    .zip(&mask)
                    .map(|(&a, &b)| match agg {
                        Aggregation::Or => a || b,
                        Aggregation::And => a && b,
                    })
                    .collect(),
            });
        }
        match combined {
            None => Ok(self.clone()),
            Some(mask) => self.subset(mask).context("filter"),
        }
    }

    /// Sort rows by `orders`, most significant key first.
    ///
    /// Sorting is stable: ties on every key keep their original relative
    /// order. Missing cells sort last for each key regardless of direction.
    pub fn arrange(&self, orders: &[Order]) -> Result<Self> {
        if orders.is_empty() {
            return Err(DataError::InvalidParameter(
                "no sort keys given".to_string(),
            ))
            .context("arrange");
        }
        let keys = orders
            .iter()
            .map(|o| {
                self.column(&o.column)
                    .map(|s| (s, o.reverse))
                    .ok_or_else(|| DataError::ColumnNotFound(o.column.clone()))
            })
            .collect::<Result<Vec<_>>>()
            .context("arrange")?;

        // Least significant key first; each pass re-sorts the current view
        // stably and composes the result into the running permutation.
        let mut perm: Vec<usize> = (0..self.nrows).collect();
        for (col, reverse) in keys.into_iter().rev() {
            let view_order = col.take(&perm).order(reverse);
            perm = view_order.iter().map(|&k| perm[k]).collect();
        }
        Ok(self.take_rows(&perm))
    }
}
