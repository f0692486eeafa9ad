//! Grouping rows by key columns and aggregating per group

use std::fmt;

use indexmap::IndexMap;

use super::*;

/// One typed component of a [`GroupKey`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    Int(i64),
    /// Bit pattern of the float; `-0.0` is folded into `0.0`
    Float(u64),
    Bool(bool),
    String(String),
    Missing,
}

impl From<&Element> for KeyPart {
    fn from(e: &Element) -> Self {
        match e {
            Element::Int(Some(v)) => KeyPart::Int(*v),
            Element::Float(Some(v)) => {
                let v = if *v == 0.0 { 0.0f64 } else { *v };
                KeyPart::Float(v.to_bits())
            }
            Element::Bool(Some(v)) => KeyPart::Bool(*v),
            Element::String(Some(v)) => KeyPart::String(v.clone()),
            _ => KeyPart::Missing,
        }
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Int(v) => write!(f, "{v}"),
            KeyPart::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            KeyPart::Bool(v) => write!(f, "{v}"),
            KeyPart::String(v) => f.write_str(v),
            KeyPart::Missing => f.write_str("NaN"),
        }
    }
}

/// Composite value of the grouping columns for one row
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey(pub Vec<KeyPart>);

impl GroupKey {
    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("_")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

/// Per-group statistic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationType {
    Max,
    Min,
    Mean,
    Median,
    Std,
    Sum,
    Count,
}

impl AggregationType {
    fn apply(&self, s: &Series) -> f64 {
        match self {
            AggregationType::Max => s.max(),
            AggregationType::Min => s.min(),
            AggregationType::Mean => s.mean(),
            AggregationType::Median => s.median(),
            AggregationType::Std => s.std_dev(),
            AggregationType::Sum => s.sum(),
            AggregationType::Count => s.len() as f64,
        }
    }
}

impl fmt::Display for AggregationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AggregationType::Max => "MAX",
            AggregationType::Min => "MIN",
            AggregationType::Mean => "MEAN",
            AggregationType::Median => "MEDIAN",
            AggregationType::Std => "STD",
            AggregationType::Sum => "SUM",
            AggregationType::Count => "COUNT",
        })
    }
}

/// Rows of a table partitioned by the values of some key columns.
///
/// Groups are kept in order of first appearance; every group is a full
/// sub-table with the original column types and row order.
#[derive(Debug, Clone, PartialEq)]
pub struct Groups {
    groups: IndexMap<GroupKey, DataFrame>,
    colnames: Vec<String>,
    // zero-row copy of the source table, keeps column types for empty input
    schema: DataFrame,
}

impl Groups {
    pub fn groups(&self) -> &IndexMap<GroupKey, DataFrame> {
        &self.groups
    }

    pub fn get(&self, key: &GroupKey) -> Option<&DataFrame> {
        self.groups.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &GroupKey> {
        self.groups.keys()
    }

    /// Names of the grouping columns
    pub fn colnames(&self) -> &[String] {
        &self.colnames
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// One row per group: the grouping columns, then one float column
    /// `{column}_{TYPE}` per `(types[i], colnames[i])` pair.
    pub fn aggregation(&self, types: &[AggregationType], colnames: &[&str]) -> Result<DataFrame> {
        if types.len() != colnames.len() {
            return Err(DataError::InvalidParameter(format!(
                "{} aggregation types for {} columns",
                types.len(),
                colnames.len()
            )))
            .context("aggregation");
        }
        for name in colnames {
            if self.schema.col_index(name).is_none() {
                return Err(DataError::ColumnNotFound(name.to_string())).context("aggregation");
            }
        }

        let mut columns = Vec::with_capacity(self.colnames.len() + types.len());
        for key in &self.colnames {
            let mut col = self.schema.col(key)?;
            for group in self.groups.values() {
                col.append(group.column(key).and_then(|s| s.get(0)));
            }
            columns.push(col);
        }
        for (ty, name) in types.iter().zip(colnames) {
            let values = self
                .groups
                .values()
                .map(|g| g.column(name).map_or(f64::NAN, |s| ty.apply(s)))
                .collect();
            columns.push(Series::float(format!("{name}_{ty}"), values));
        }
        DataFrame::new(columns).context("aggregation")
    }
}

impl DataFrame {
    /// Partition rows by the values of `colnames`.
    ///
    /// Returns `Ok(None)` when no column names are given. Rows whose key
    /// cells are all equal (missing matching missing) share a group.
    pub fn group_by(&self, colnames: &[&str]) -> Result<Option<Groups>> {
        if colnames.is_empty() {
            return Ok(None);
        }
        let keys = colnames
            .iter()
            .map(|c| {
                self.column(c)
                    .ok_or_else(|| DataError::ColumnNotFound(c.to_string()))
            })
            .collect::<Result<Vec<_>>>()
            .context("group_by")?;

        let mut rows: IndexMap<GroupKey, Vec<usize>> = IndexMap::new();
        for i in 0..self.nrows {
            let key = GroupKey(
                keys.iter()
                    .map(|s| s.get(i).map_or(KeyPart::Missing, |e| KeyPart::from(&e)))
                    .collect(),
            );
            rows.entry(key).or_default().push(i);
        }

        Ok(Some(Groups {
            groups: rows
                .into_iter()
                .map(|(key, idx)| (key, self.take_rows(&idx)))
                .collect(),
            colnames: colnames.iter().map(|c| c.to_string()).collect(),
            schema: self.take_rows(&[]),
        }))
    }
}
