//! Series data structure for holding homogeneous data
//!
//! A Series is a named, one-dimensional column whose cells all share one
//! declared [`ColumnType`]. Any cell may be missing. It's the building block
//! of DataFrames.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use ndarray::Array1;

use super::element::non_nan;
use super::*;

/// Typed storage of a Series; `None` marks a missing cell
#[derive(Clone, Debug, PartialEq)]
pub enum SeriesData {
    /// Integer numbers (i64)
    Int(Vec<Option<i64>>),
    /// Floating point numbers (f64); never holds `NaN`
    Float(Vec<Option<f64>>),
    /// Boolean values
    Bool(Vec<Option<bool>>),
    /// String values
    String(Vec<Option<String>>),
}

impl SeriesData {
    /// Zero-length storage of the given type
    pub fn empty(ty: ColumnType) -> Self {
        Self::with_capacity(ty, 0)
    }

    fn with_capacity(ty: ColumnType, capacity: usize) -> Self {
        match ty {
            ColumnType::Int => SeriesData::Int(Vec::with_capacity(capacity)),
            ColumnType::Float => SeriesData::Float(Vec::with_capacity(capacity)),
            ColumnType::Bool => SeriesData::Bool(Vec::with_capacity(capacity)),
            ColumnType::String => SeriesData::String(Vec::with_capacity(capacity)),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            SeriesData::Int(_) => ColumnType::Int,
            SeriesData::Float(_) => ColumnType::Float,
            SeriesData::Bool(_) => ColumnType::Bool,
            SeriesData::String(_) => ColumnType::String,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SeriesData::Int(v) => v.len(),
            SeriesData::Float(v) => v.len(),
            SeriesData::Bool(v) => v.len(),
            SeriesData::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, idx: usize) -> Option<Element> {
        match self {
            SeriesData::Int(v) => v.get(idx).map(|x| Element::Int(*x)),
            SeriesData::Float(v) => v.get(idx).map(|x| Element::Float(*x)),
            SeriesData::Bool(v) => v.get(idx).map(|x| Element::Bool(*x)),
            SeriesData::String(v) => v.get(idx).map(|x| Element::String(x.clone())),
        }
    }

    /// Append one element, converting it to this storage's type
    fn push(&mut self, elem: &Element) {
        match self {
            SeriesData::Int(v) => v.push(int_of(elem)),
            SeriesData::Float(v) => v.push(float_of(elem)),
            SeriesData::Bool(v) => v.push(bool_of(elem)),
            SeriesData::String(v) => v.push(string_of(elem)),
        }
    }

    /// Overwrite one cell, converting the element to this storage's type
    fn put(&mut self, idx: usize, elem: &Element) {
        match self {
            SeriesData::Int(v) => put_at(v, idx, int_of(elem)),
            SeriesData::Float(v) => put_at(v, idx, float_of(elem)),
            SeriesData::Bool(v) => put_at(v, idx, bool_of(elem)),
            SeriesData::String(v) => put_at(v, idx, string_of(elem)),
        }
    }

    /// Gather cells at `indices`; callers pass validated positions
    fn take(&self, indices: &[usize]) -> Self {
        fn gather<T: Clone>(v: &[Option<T>], indices: &[usize]) -> Vec<Option<T>> {
            indices
                .iter()
                .map(|&i| v.get(i).cloned().flatten())
                .collect()
        }
        match self {
            SeriesData::Int(v) => SeriesData::Int(gather(v, indices)),
            SeriesData::Float(v) => SeriesData::Float(gather(v, indices)),
            SeriesData::Bool(v) => SeriesData::Bool(gather(v, indices)),
            SeriesData::String(v) => SeriesData::String(gather(v, indices)),
        }
    }
}

impl From<Vec<i64>> for SeriesData {
    fn from(v: Vec<i64>) -> Self {
        SeriesData::Int(v.into_iter().map(Some).collect())
    }
}

impl From<Vec<Option<i64>>> for SeriesData {
    fn from(v: Vec<Option<i64>>) -> Self {
        SeriesData::Int(v)
    }
}

impl From<Vec<f64>> for SeriesData {
    fn from(v: Vec<f64>) -> Self {
        SeriesData::Float(v.into_iter().map(non_nan).collect())
    }
}

impl From<Vec<Option<f64>>> for SeriesData {
    fn from(v: Vec<Option<f64>>) -> Self {
        SeriesData::Float(v.into_iter().map(|x| x.and_then(non_nan)).collect())
    }
}

impl From<Vec<bool>> for SeriesData {
    fn from(v: Vec<bool>) -> Self {
        SeriesData::Bool(v.into_iter().map(Some).collect())
    }
}

impl From<Vec<Option<bool>>> for SeriesData {
    fn from(v: Vec<Option<bool>>) -> Self {
        SeriesData::Bool(v)
    }
}

impl From<Vec<String>> for SeriesData {
    fn from(v: Vec<String>) -> Self {
        SeriesData::String(v.into_iter().map(Some).collect())
    }
}

impl From<Vec<&str>> for SeriesData {
    fn from(v: Vec<&str>) -> Self {
        SeriesData::String(v.into_iter().map(|s| Some(s.to_string())).collect())
    }
}

impl From<Vec<Option<String>>> for SeriesData {
    fn from(v: Vec<Option<String>>) -> Self {
        SeriesData::String(v)
    }
}

impl From<Vec<Option<&str>>> for SeriesData {
    fn from(v: Vec<Option<&str>>) -> Self {
        SeriesData::String(v.into_iter().map(|s| s.map(str::to_string)).collect())
    }
}

/// Element-wise comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Neq,
    Greater,
    GreaterEq,
    Less,
    LessEq,
    /// Membership in the operand's values
    In,
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Comparator::Eq => "==",
            Comparator::Neq => "!=",
            Comparator::Greater => ">",
            Comparator::GreaterEq => ">=",
            Comparator::Less => "<",
            Comparator::LessEq => "<=",
            Comparator::In => "in",
        })
    }
}

/// Right-hand side of [`Series::compare`]
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(Value),
    List(Vec<Value>),
    Series(Series),
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Value(v)
    }
}

impl From<i64> for Operand {
    fn from(v: i64) -> Self {
        Operand::Value(v.into())
    }
}

impl From<i32> for Operand {
    fn from(v: i32) -> Self {
        Operand::Value(v.into())
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Value(v.into())
    }
}

impl From<bool> for Operand {
    fn from(v: bool) -> Self {
        Operand::Value(v.into())
    }
}

impl From<&str> for Operand {
    fn from(v: &str) -> Self {
        Operand::Value(v.into())
    }
}

impl From<String> for Operand {
    fn from(v: String) -> Self {
        Operand::Value(v.into())
    }
}

impl From<Vec<Value>> for Operand {
    fn from(v: Vec<Value>) -> Self {
        Operand::List(v)
    }
}

impl From<Series> for Operand {
    fn from(s: Series) -> Self {
        Operand::Series(s)
    }
}

impl From<&Series> for Operand {
    fn from(s: &Series) -> Self {
        Operand::Series(s.clone())
    }
}

/// User-supplied element test, see [`Series::compare_with`]
pub type ElementPredicate = Arc<dyn Fn(&Element) -> bool + Send + Sync>;

/// A typed, named column
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    name: String,
    data: SeriesData,
}

impl Series {
    /// Create a series from any typed vector, e.g. `Vec<i64>` or `Vec<Option<&str>>`
    pub fn new(name: impl Into<String>, data: impl Into<SeriesData>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Create a new Int series
    pub fn int(name: impl Into<String>, data: Vec<i64>) -> Self {
        Self::new(name, data)
    }

    /// Create a new Float series; `NaN` values become missing
    pub fn float(name: impl Into<String>, data: Vec<f64>) -> Self {
        Self::new(name, data)
    }

    /// Create a new Bool series
    pub fn bool(name: impl Into<String>, data: Vec<bool>) -> Self {
        Self::new(name, data)
    }

    /// Create a new String series
    pub fn string<S: Into<String>>(name: impl Into<String>, data: Vec<S>) -> Self {
        Self::new(
            name,
            SeriesData::String(data.into_iter().map(|s| Some(s.into())).collect()),
        )
    }

    /// Zero-length series of the given type
    pub fn new_empty(name: impl Into<String>, ty: ColumnType) -> Self {
        Self::new(name, SeriesData::empty(ty))
    }

    /// Build a series of type `ty`, converting every element to it
    pub fn from_elements<'a, I>(name: impl Into<String>, ty: ColumnType, elements: I) -> Self
    where
        I: IntoIterator<Item = &'a Element>,
    {
        let mut s = Self::new_empty(name, ty);
        for e in elements {
            s.data.push(e);
        }
        s
    }

    /// Parse raw tokens as type `ty`; tokens listed in `nan_values` are missing
    pub fn from_tokens<S, N>(
        name: impl Into<String>,
        ty: ColumnType,
        tokens: &[S],
        nan_values: &[N],
    ) -> Self
    where
        S: AsRef<str>,
        N: AsRef<str>,
    {
        let mut s = Self::new_empty(name, ty);
        for token in tokens {
            let token = token.as_ref();
            let elem = if nan_values.iter().any(|n| n.as_ref() == token) {
                Element::missing(ty)
            } else {
                Element::parse(token, ty)
            };
            s.data.push(&elem);
        }
        s
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Same series under another name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Get the length of the series
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_type(&self) -> ColumnType {
        self.data.column_type()
    }

    pub fn data(&self) -> &SeriesData {
        &self.data
    }

    /// Get the element at index
    pub fn get(&self, idx: usize) -> Option<Element> {
        self.data.get(idx)
    }

    /// Native value at index; `None` when missing or out of range
    pub fn value(&self, idx: usize) -> Option<Value> {
        self.get(idx).and_then(|e| e.value())
    }

    pub fn elements(&self) -> Vec<Element> {
        (0..self.len()).filter_map(|i| self.get(i)).collect()
    }

    /// Per-cell missing flags
    pub fn is_missing(&self) -> Vec<bool> {
        self.elements().iter().map(Element::is_missing).collect()
    }

    pub fn has_missing(&self) -> bool {
        self.elements().iter().any(Element::is_missing)
    }

    /// Convert to another column type; failed conversions become missing
    pub fn cast(&self, ty: ColumnType) -> Series {
        if ty == self.column_type() {
            return self.clone();
        }
        Series::from_elements(self.name.clone(), ty, &self.elements())
    }

    /// Same-typed zero-length series
    pub fn empty(&self) -> Series {
        Series::new_empty(self.name.clone(), self.column_type())
    }

    /// Append elements in place, converting each to this series' type
    pub fn append<I>(&mut self, elements: I)
    where
        I: IntoIterator,
        I::Item: Into<Element>,
    {
        for e in elements {
            self.data.push(&e.into());
        }
    }

    /// New series with `other`'s elements after this one's
    pub fn concat(&self, other: &Series) -> Series {
        let mut out = self.clone();
        out.append(other.elements());
        out
    }

    pub(crate) fn take(&self, indices: &[usize]) -> Series {
        Series {
            name: self.name.clone(),
            data: self.data.take(indices),
        }
    }

    /// New series holding the elements at the selected rows
    pub fn subset(&self, selector: impl Into<Indexes>) -> Result<Series> {
        let idx = resolve_rows(self.len(), &selector.into())?;
        Ok(self.take(&idx))
    }

    /// Overwrite the selected rows with `values`, in place.
    ///
    /// Nothing is written unless the selector resolves and its length
    /// matches `values`.
    pub fn set(&mut self, selector: impl Into<Indexes>, values: &Series) -> Result<()> {
        let idx = resolve_rows(self.len(), &selector.into())?;
        if idx.len() != values.len() {
            return Err(DataError::DimensionMismatch {
                expected: format!("{} values", idx.len()),
                actual: format!("{} values", values.len()),
            });
        }
        for (&i, e) in idx.iter().zip(values.elements()) {
            self.data.put(i, &e);
        }
        Ok(())
    }

    /// Compare every element against `operand`, producing a Bool series.
    ///
    /// Scalars and lists are converted to this series' type (an int series
    /// compared with a float compares as floats). A series operand must have
    /// length 1 (broadcast) or this series' length. `In` tests membership in
    /// all operand values. Comparisons involving a missing element are false,
    /// except `Eq`/`Neq` which treat two missing cells as equal.
    pub fn compare(&self, comparator: Comparator, operand: impl Into<Operand>) -> Result<Series> {
        let operand = operand.into();
        let raw: Vec<Element> = match &operand {
            Operand::Value(v) => vec![Element::from(v.clone())],
            Operand::List(vs) => vs.iter().cloned().map(Element::from).collect(),
            Operand::Series(s) => s.elements(),
        };

        let ty = match (self.column_type(), dominant_operand_type(&raw)) {
            (ColumnType::Int, Some(ColumnType::Float)) => ColumnType::Float,
            (ty, _) => ty,
        };
        let others = raw
            .iter()
            .map(|e| coerce(e, ty))
            .collect::<Result<Vec<_>>>()?;
        let elems: Vec<Element> = self.elements().iter().map(|e| e.cast(ty)).collect();

        let test: fn(&Element, &Element) -> bool = match comparator {
            Comparator::Eq => |a, b| a.eq_value(b),
            Comparator::Neq => |a, b| !a.eq_value(b),
            Comparator::Greater => Element::greater,
            Comparator::GreaterEq => Element::greater_eq,
            Comparator::Less => Element::less,
            Comparator::LessEq => Element::less_eq,
            Comparator::In => {
                let out = elems
                    .iter()
                    .map(|e| others.iter().any(|o| e.eq_value(o)))
                    .collect();
                return Ok(Series::bool(self.name.clone(), out));
            }
        };

        if others.len() != 1 && others.len() != elems.len() {
            return Err(DataError::DimensionMismatch {
                expected: format!("1 or {} operand values", elems.len()),
                actual: format!("{} operand values", others.len()),
            });
        }
        let out: Vec<bool> = elems
            .iter()
            .zip(others.iter().cycle())
            .map(|(e, o)| test(e, o))
            .collect();
        Ok(Series::bool(self.name.clone(), out))
    }

    /// Bool series of `predicate` applied to every element
    pub fn compare_with<P>(&self, predicate: P) -> Series
    where
        P: Fn(&Element) -> bool,
    {
        let out = self.elements().iter().map(predicate).collect();
        Series::bool(self.name.clone(), out)
    }

    /// Stable sorting permutation. Present values are ordered ascending
    /// (descending when `reverse`); missing cells follow in original order.
    pub fn order(&self, reverse: bool) -> Vec<usize> {
        let elems = self.elements();
        let (mut present, missing): (Vec<usize>, Vec<usize>) =
            (0..elems.len()).partition(|&i| !elems[i].is_missing());
        present.sort_by(|&a, &b| {
            let ord = elems[a]
                .partial_order(&elems[b])
                .unwrap_or(Ordering::Equal);
            if reverse { ord.reverse() } else { ord }
        });
        present.extend(missing);
        present
    }

    /// Apply an element transform; results are converted back to this type
    pub fn map<M>(&self, f: M) -> Series
    where
        M: Fn(&Element) -> Element,
    {
        let mapped: Vec<Element> = self.elements().iter().map(f).collect();
        Series::from_elements(self.name.clone(), self.column_type(), &mapped)
    }

    /// Rows `j..k`
    pub fn slice(&self, j: usize, k: usize) -> Result<Series> {
        if j > k {
            return Err(DataError::InvalidParameter(format!(
                "slice start {j} is after end {k}"
            )));
        }
        if k > self.len() {
            return Err(DataError::IndexOutOfBounds {
                index: k as i64,
                len: self.len(),
            });
        }
        Ok(self.take(&(j..k).collect::<Vec<_>>()))
    }

    /// String form of every cell; missing cells read `NaN`
    pub fn records(&self) -> Vec<String> {
        self.elements().iter().map(|e| e.to_string()).collect()
    }

    /// Numeric view of every cell; missing and unparseable cells are `NaN`
    pub fn float_values(&self) -> Vec<f64> {
        self.elements().iter().map(Element::to_f64).collect()
    }

    /// Integer view; fails on missing or non-convertible cells
    pub fn int_values(&self) -> Result<Vec<i64>> {
        self.elements()
            .iter()
            .map(|e| match e.cast(ColumnType::Int) {
                Element::Int(Some(v)) => Ok(v),
                _ => Err(DataError::MissingData(self.name.clone())),
            })
            .collect()
    }

    /// Boolean view; fails on missing or non-convertible cells
    pub fn bool_values(&self) -> Result<Vec<bool>> {
        self.elements()
            .iter()
            .map(|e| match e.cast(ColumnType::Bool) {
                Element::Bool(Some(v)) => Ok(v),
                _ => Err(DataError::MissingData(self.name.clone())),
            })
            .collect()
    }

    /// Name, type, length and values on separate lines
    pub fn str(&self) -> String {
        let mut lines = Vec::new();
        if !self.name.is_empty() {
            lines.push(format!("Name: {}", self.name));
        }
        lines.push(format!("Type: {}", self.column_type()));
        lines.push(format!("Length: {}", self.len()));
        if !self.is_empty() {
            lines.push(format!("Values: {self}"));
        }
        lines.join("\n")
    }

    // ==================== Statistics ====================

    /// Arithmetic mean; `NaN` if empty, textual, or any cell is missing
    pub fn mean(&self) -> f64 {
        if self.column_type().is_string() {
            return f64::NAN;
        }
        self.numeric_array().mean().unwrap_or(f64::NAN)
    }

    /// Sample standard deviation (n - 1 denominator)
    pub fn std_dev(&self) -> f64 {
        if self.len() < 2 || self.column_type().is_string() {
            return f64::NAN;
        }
        self.numeric_array().std(1.0)
    }

    /// Sum of the cells; `NaN` for empty, bool or string series
    pub fn sum(&self) -> f64 {
        match self.column_type() {
            ColumnType::Int | ColumnType::Float if !self.is_empty() => self.numeric_array().sum(),
            _ => f64::NAN,
        }
    }

    /// Largest present value; `NaN` for string series
    pub fn max(&self) -> f64 {
        self.present_numbers()
            .into_iter()
            .reduce(f64::max)
            .unwrap_or(f64::NAN)
    }

    /// Smallest present value; `NaN` for string series
    pub fn min(&self) -> f64 {
        self.present_numbers()
            .into_iter()
            .reduce(f64::min)
            .unwrap_or(f64::NAN)
    }

    /// Median of the present values; `NaN` for empty, bool or string series
    pub fn median(&self) -> f64 {
        if self.column_type() == ColumnType::Bool {
            return f64::NAN;
        }
        let sorted = self.sorted_present();
        let n = sorted.len();
        match n {
            0 => f64::NAN,
            _ if n % 2 == 1 => sorted[n / 2],
            _ => (sorted[n / 2 - 1] + sorted[n / 2]) * 0.5,
        }
    }

    /// Empirical quantile: the first sorted present value whose cumulative
    /// count reaches `p * n`.
    pub fn quantile(&self, p: f64) -> f64 {
        if !(0.0..=1.0).contains(&p) {
            return f64::NAN;
        }
        let sorted = self.sorted_present();
        let target = p * sorted.len() as f64;
        sorted
            .iter()
            .enumerate()
            .find(|(i, _)| (i + 1) as f64 >= target)
            .map_or(f64::NAN, |(_, v)| *v)
    }

    /// Lexicographically largest present string; empty unless a string series
    pub fn max_str(&self) -> String {
        self.present_strings().max().unwrap_or_default().to_string()
    }

    /// Lexicographically smallest present string; empty unless a string series
    pub fn min_str(&self) -> String {
        self.present_strings().min().unwrap_or_default().to_string()
    }

    fn numeric_array(&self) -> Array1<f64> {
        Array1::from(self.float_values())
    }

    fn present_numbers(&self) -> Vec<f64> {
        if self.column_type().is_string() {
            return Vec::new();
        }
        self.float_values()
            .into_iter()
            .filter(|v| !v.is_nan())
            .collect()
    }

    fn sorted_present(&self) -> Vec<f64> {
        let mut values = self.present_numbers();
        values.sort_by(f64::total_cmp);
        values
    }

    fn present_strings(&self) -> impl Iterator<Item = &str> {
        let values: &[Option<String>] = match &self.data {
            SeriesData::String(v) => v,
            _ => &[],
        };
        values.iter().filter_map(|v| v.as_deref())
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.records().join(" "))
    }
}

fn int_of(e: &Element) -> Option<i64> {
    match e.cast(ColumnType::Int) {
        Element::Int(v) => v,
        _ => None,
    }
}

fn float_of(e: &Element) -> Option<f64> {
    match e.cast(ColumnType::Float) {
        Element::Float(v) => v.and_then(non_nan),
        _ => None,
    }
}

fn bool_of(e: &Element) -> Option<bool> {
    match e.cast(ColumnType::Bool) {
        Element::Bool(v) => v,
        _ => None,
    }
}

fn string_of(e: &Element) -> Option<String> {
    match e.cast(ColumnType::String) {
        Element::String(v) => v,
        _ => None,
    }
}

fn put_at<T>(values: &mut [Option<T>], idx: usize, value: Option<T>) {
    if let Some(slot) = values.get_mut(idx) {
        *slot = value;
    }
}

fn dominant_operand_type(elems: &[Element]) -> Option<ColumnType> {
    dominant_type(elems.iter().map(Element::column_type))
}

/// Convert an operand element; a present value that does not survive the
/// conversion exactly is an error rather than a silent missing or a
/// rounded value. Strings only have to parse.
fn coerce(elem: &Element, ty: ColumnType) -> Result<Element> {
    let cast = elem.cast(ty);
    let lossy = match elem {
        _ if elem.is_missing() => false,
        Element::String(_) => cast.is_missing(),
        _ => cast.is_missing() || cast.cast(elem.column_type()) != *elem,
    };
    if lossy {
        return Err(DataError::InvalidCoercion {
            value: elem.to_string(),
            target: ty,
        });
    }
    Ok(cast)
}
