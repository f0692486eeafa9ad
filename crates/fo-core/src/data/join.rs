//! Relational joins between two DataFrames
//!
//! Keyed joins produce the key columns (typed as on the left table), then
//! the left non-key columns, then the right non-key columns. Rows match
//! when every key cell is equal, with right cells converted to the left
//! key's type. Matching is a nested loop over both tables.

use super::*;

/// Where one output row takes its cells from
#[derive(Debug, Clone, Copy)]
struct JoinRow {
    left: Option<usize>,
    right: Option<usize>,
}

/// Column positions of a keyed join
struct JoinPlan<'a> {
    left: &'a DataFrame,
    right: &'a DataFrame,
    left_keys: Vec<usize>,
    right_keys: Vec<usize>,
    left_rest: Vec<usize>,
    right_rest: Vec<usize>,
}

impl<'a> JoinPlan<'a> {
    fn new(left: &'a DataFrame, right: &'a DataFrame, keys: &[&str]) -> Result<Self> {
        if keys.is_empty() {
            return Err(DataError::InvalidParameter(
                "join keys not specified".to_string(),
            ));
        }
        let mut missing = Vec::new();
        let mut left_keys = Vec::with_capacity(keys.len());
        let mut right_keys = Vec::with_capacity(keys.len());
        for key in keys {
            match left.col_index(key) {
                Some(i) => left_keys.push(i),
                None => missing.push(format!("can't find key '{key}' on left table")),
            }
            match right.col_index(key) {
                Some(j) => right_keys.push(j),
                None => missing.push(format!("can't find key '{key}' on right table")),
            }
        }
        if !missing.is_empty() {
            return Err(DataError::MissingKeys(missing));
        }

        let left_rest = (0..left.ncols()).filter(|i| !left_keys.contains(i)).collect();
        let right_rest = (0..right.ncols()).filter(|j| !right_keys.contains(j)).collect();
        Ok(Self {
            left,
            right,
            left_keys,
            right_keys,
            left_rest,
            right_rest,
        })
    }

    fn matches(&self, i: usize, j: usize) -> bool {
        self.left_keys.iter().zip(&self.right_keys).all(|(&lk, &rk)| {
            match (self.left.elem(i, lk), self.right.elem(j, rk)) {
                (Some(a), Some(b)) => a.eq_value(&b),
                _ => false,
            }
        })
    }

    /// For each right row, whether any left row matches it
    fn right_matched(&self) -> Vec<bool> {
        (0..self.right.nrows())
            .map(|j| (0..self.left.nrows()).any(|i| self.matches(i, j)))
            .collect()
    }

    /// One row per left row: its matches, or a single row padded on the right
    fn left_rows(&self) -> Vec<JoinRow> {
        let mut rows = Vec::new();
        for i in 0..self.left.nrows() {
            let before = rows.len();
            for j in 0..self.right.nrows() {
                if self.matches(i, j) {
                    rows.push(JoinRow {
                        left: Some(i),
                        right: Some(j),
                    });
                }
            }
            if rows.len() == before {
                rows.push(JoinRow {
                    left: Some(i),
                    right: None,
                });
            }
        }
        rows
    }

    fn build(&self, rows: &[JoinRow]) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(
            self.left_keys.len() + self.left_rest.len() + self.right_rest.len(),
        );

        for (&lk, &rk) in self.left_keys.iter().zip(&self.right_keys) {
            let template = &self.left.columns[lk];
            let cells: Vec<Element> = rows
                .iter()
                .map(|row| match row.left {
                    Some(i) => template.get(i),
                    None => row.right.and_then(|j| self.right.elem(j, rk)),
                })
                .map(|e| e.unwrap_or_else(|| Element::missing(template.column_type())))
                .collect();
            columns.push(Series::from_elements(
                template.name(),
                template.column_type(),
                &cells,
            ));
        }
        for &c in &self.left_rest {
            columns.push(gather(&self.left.columns[c], rows.iter().map(|r| r.left)));
        }
        for &c in &self.right_rest {
            columns.push(gather(&self.right.columns[c], rows.iter().map(|r| r.right)));
        }
        DataFrame::new(columns)
    }
}

/// Cells of `col` at the given rows; `None` rows become missing
fn gather(col: &Series, rows: impl Iterator<Item = Option<usize>>) -> Series {
    let ty = col.column_type();
    let cells: Vec<Element> = rows
        .map(|r| r.and_then(|i| col.get(i)).unwrap_or_else(|| Element::missing(ty)))
        .collect();
    Series::from_elements(col.name(), ty, &cells)
}

impl DataFrame {
    /// One row per pair of matching rows
    pub fn inner_join(&self, right: &DataFrame, keys: &[&str]) -> Result<Self> {
        let plan = JoinPlan::new(self, right, keys).context("inner_join")?;
        let mut rows = Vec::new();
        for i in 0..self.nrows {
            for j in 0..right.nrows {
                if plan.matches(i, j) {
                    rows.push(JoinRow {
                        left: Some(i),
                        right: Some(j),
                    });
                }
            }
        }
        plan.build(&rows).context("inner_join")
    }

    /// Every left row, with its matches or with missing right columns
    pub fn left_join(&self, right: &DataFrame, keys: &[&str]) -> Result<Self> {
        let plan = JoinPlan::new(self, right, keys).context("left_join")?;
        plan.build(&plan.left_rows()).context("left_join")
    }

    /// Every matching pair (right row major), then every unmatched right row
    /// with its own key values and missing left columns
    pub fn right_join(&self, right: &DataFrame, keys: &[&str]) -> Result<Self> {
        let plan = JoinPlan::new(self, right, keys).context("right_join")?;
        let mut rows = Vec::new();
        let mut unmatched = Vec::new();
        for j in 0..right.nrows {
            let before = rows.len();
            for i in 0..self.nrows {
                if plan.matches(i, j) {
                    rows.push(JoinRow {
                        left: Some(i),
                        right: Some(j),
                    });
                }
            }
            if rows.len() == before {
                unmatched.push(JoinRow {
                    left: None,
                    right: Some(j),
                });
            }
        }
        rows.extend(unmatched);
        plan.build(&rows).context("right_join")
    }

    /// [`DataFrame::left_join`] followed by every unmatched right row
    pub fn outer_join(&self, right: &DataFrame, keys: &[&str]) -> Result<Self> {
        let plan = JoinPlan::new(self, right, keys).context("outer_join")?;
        let mut rows = plan.left_rows();
        rows.extend(
            plan.right_matched()
                .into_iter()
                .enumerate()
                .filter(|(_, matched)| !matched)
                .map(|(j, _)| JoinRow {
                    left: None,
                    right: Some(j),
                }),
        );
        plan.build(&rows).context("outer_join")
    }

    /// Cartesian product: all left columns, then all right columns
    pub fn cross_join(&self, right: &DataFrame) -> Result<Self> {
        let pairs: Vec<(usize, usize)> = (0..self.nrows)
            .flat_map(|i| (0..right.nrows).map(move |j| (i, j)))
            .collect();
        let left_rows: Vec<usize> = pairs.iter().map(|&(i, _)| i).collect();
        let right_rows: Vec<usize> = pairs.iter().map(|&(_, j)| j).collect();
        let columns = self
            .columns
            .iter()
            .map(|c| c.take(&left_rows))
            .chain(right.columns.iter().map(|c| c.take(&right_rows)))
            .collect();
        DataFrame::new(columns).context("cross_join")
    }
}
