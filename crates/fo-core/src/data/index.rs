//! Row and column selectors
//!
//! [`Indexes`] is the one selector type accepted by every subsetting
//! operation. It is resolved into plain positions by [`resolve_rows`] or
//! [`resolve_columns`], depending on the axis being indexed.

use std::ops::Range;

use super::*;

/// A request identifying rows or columns
#[derive(Debug, Clone, PartialEq)]
pub enum Indexes {
    /// Single position
    Position(usize),
    /// Positions in the order to be returned
    Positions(Vec<usize>),
    /// Boolean mask; its length must equal the indexed dimension
    Mask(Vec<bool>),
    /// Single column name
    Name(String),
    /// Column names in the order to be returned
    Names(Vec<String>),
    /// Int series as positions, Bool series as a mask, String series as names
    Series(Series),
}

impl From<usize> for Indexes {
    fn from(i: usize) -> Self {
        Indexes::Position(i)
    }
}

impl From<Vec<usize>> for Indexes {
    fn from(v: Vec<usize>) -> Self {
        Indexes::Positions(v)
    }
}

impl From<&[usize]> for Indexes {
    fn from(v: &[usize]) -> Self {
        Indexes::Positions(v.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Indexes {
    fn from(v: [usize; N]) -> Self {
        Indexes::Positions(v.to_vec())
    }
}

impl From<Range<usize>> for Indexes {
    fn from(r: Range<usize>) -> Self {
        Indexes::Positions(r.collect())
    }
}

impl From<Vec<bool>> for Indexes {
    fn from(v: Vec<bool>) -> Self {
        Indexes::Mask(v)
    }
}

impl From<&[bool]> for Indexes {
    fn from(v: &[bool]) -> Self {
        Indexes::Mask(v.to_vec())
    }
}

impl<const N: usize> From<[bool; N]> for Indexes {
    fn from(v: [bool; N]) -> Self {
        Indexes::Mask(v.to_vec())
    }
}

impl From<&str> for Indexes {
    fn from(s: &str) -> Self {
        Indexes::Name(s.to_string())
    }
}

impl From<String> for Indexes {
    fn from(s: String) -> Self {
        Indexes::Name(s)
    }
}

impl From<Vec<&str>> for Indexes {
    fn from(v: Vec<&str>) -> Self {
        Indexes::Names(v.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for Indexes {
    fn from(v: Vec<String>) -> Self {
        Indexes::Names(v)
    }
}

impl<const N: usize> From<[&str; N]> for Indexes {
    fn from(v: [&str; N]) -> Self {
        Indexes::Names(v.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Series> for Indexes {
    fn from(s: Series) -> Self {
        Indexes::Series(s)
    }
}

impl From<&Series> for Indexes {
    fn from(s: &Series) -> Self {
        Indexes::Series(s.clone())
    }
}

/// Resolve a selector over `len` rows into positions
pub fn resolve_rows(len: usize, selector: &Indexes) -> Result<Vec<usize>> {
    resolve::<&str>(len, None, selector)
}

/// Resolve a selector over the named columns into positions
pub fn resolve_columns<S: AsRef<str>>(names: &[S], selector: &Indexes) -> Result<Vec<usize>> {
    resolve(names.len(), Some(names), selector)
}

fn resolve<S: AsRef<str>>(
    len: usize,
    names: Option<&[S]>,
    selector: &Indexes,
) -> Result<Vec<usize>> {
    match selector {
        Indexes::Position(i) => check_positions(len, &[*i]),
        Indexes::Positions(idx) => check_positions(len, idx),
        Indexes::Mask(mask) => mask_positions(len, mask),
        Indexes::Name(name) => lookup_names(names, std::slice::from_ref(name)),
        Indexes::Names(list) => lookup_names(names, list),
        Indexes::Series(s) => {
            if s.has_missing() {
                return Err(DataError::MissingData(format!(
                    "index series '{}'",
                    s.name()
                )));
            }
            match s.data() {
                SeriesData::Int(values) => {
                    let idx = values
                        .iter()
                        .flatten()
                        .map(|&v| {
                            usize::try_from(v)
                                .map_err(|_| DataError::IndexOutOfBounds { index: v, len })
                        })
                        .collect::<Result<Vec<_>>>()?;
                    check_positions(len, &idx)
                }
                SeriesData::Bool(values) => {
                    let mask: Vec<bool> = values.iter().flatten().copied().collect();
                    mask_positions(len, &mask)
                }
                SeriesData::String(values) => {
                    let list: Vec<String> = values.iter().flatten().cloned().collect();
                    lookup_names(names, &list)
                }
                SeriesData::Float(_) => Err(DataError::UnsupportedSelector(
                    "float series can't be used as an index".to_string(),
                )),
            }
        }
    }
}

fn check_positions(len: usize, idx: &[usize]) -> Result<Vec<usize>> {
    if let Some(&bad) = idx.iter().find(|&&i| i >= len) {
        return Err(DataError::IndexOutOfBounds {
            index: bad as i64,
            len,
        });
    }
    Ok(idx.to_vec())
}

fn mask_positions(len: usize, mask: &[bool]) -> Result<Vec<usize>> {
    if mask.len() != len {
        return Err(DataError::MaskLengthMismatch {
            expected: len,
            actual: mask.len(),
        });
    }
    Ok(mask
        .iter()
        .enumerate()
        .filter_map(|(i, &keep)| keep.then_some(i))
        .collect())
}

fn lookup_names<S: AsRef<str>>(names: Option<&[S]>, wanted: &[String]) -> Result<Vec<usize>> {
    let Some(names) = names else {
        return Err(DataError::UnsupportedSelector(
            "rows can't be selected by name".to_string(),
        ));
    };
    wanted
        .iter()
        .map(|w| {
            names
                .iter()
                .position(|n| n.as_ref() == w)
                .ok_or_else(|| DataError::ColumnNotFound(w.clone()))
        })
        .collect()
}
