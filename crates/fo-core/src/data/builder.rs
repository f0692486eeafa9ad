//! Builders and loaders for constructing DataFrames
//!
//! [`DataFrameBuilder`] assembles a table column by column. The `load_*`
//! functions build tables from raw records, row maps, numeric matrices and
//! typed records, all configured by [`LoadOptions`].

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use super::*;

/// Builder for creating DataFrames
#[derive(Debug, Default)]
pub struct DataFrameBuilder {
    columns: Vec<Series>,
    nrows: Option<usize>,
}

impl DataFrameBuilder {
    /// Create a new DataFrameBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column to the DataFrame
    pub fn with_column(mut self, series: Series) -> Result<Self> {
        if self.columns.iter().any(|s| s.name() == series.name()) {
            return Err(DataError::DuplicateColumn(series.name().to_string()));
        }

        // Check dimension consistency
        match self.nrows {
            Some(n) if series.len() != n => {
                return Err(DataError::DimensionMismatch {
                    expected: format!("{} rows", n),
                    actual: format!("{} rows", series.len()),
                });
            }
            None => {
                self.nrows = Some(series.len());
            }
            _ => {}
        }

        self.columns.push(series);
        Ok(self)
    }

    /// Build the DataFrame
    pub fn build(self) -> Result<DataFrame> {
        DataFrame::new(self.columns)
    }
}

/// Ingestion configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Type used when detection is off or finds nothing
    pub default_type: ColumnType,
    /// Infer each column's type from its tokens
    pub detect_types: bool,
    /// The first record holds the column names
    pub has_header: bool,
    /// Explicit column names, overriding any header
    pub names: Option<Vec<String>>,
    /// Tokens read as missing values
    pub nan_values: Vec<String>,
    /// Per-column type overrides, by column name
    pub types: IndexMap<String, ColumnType>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            default_type: ColumnType::String,
            detect_types: true,
            has_header: true,
            names: None,
            nan_values: vec!["NA".to_string(), "NaN".to_string(), "<nil>".to_string()],
            types: IndexMap::new(),
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_type(mut self, ty: ColumnType) -> Self {
        self.default_type = ty;
        self
    }

    pub fn detect_types(mut self, detect: bool) -> Self {
        self.detect_types = detect;
        self
    }

    pub fn has_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn names<S: Into<String>>(mut self, names: Vec<S>) -> Self {
        self.names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn nan_values<S: Into<String>>(mut self, values: Vec<S>) -> Self {
        self.nan_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Force the type of one column
    pub fn with_type(mut self, column: impl Into<String>, ty: ColumnType) -> Self {
        self.types.insert(column.into(), ty);
        self
    }

    fn is_nan_token(&self, token: &str) -> bool {
        self.nan_values.iter().any(|n| n == token)
    }

    fn column_type(&self, name: &str, tokens: &[&str]) -> ColumnType {
        if let Some(ty) = self.types.get(name) {
            return *ty;
        }
        if self.detect_types {
            infer_column_type(tokens).unwrap_or(self.default_type)
        } else {
            self.default_type
        }
    }
}

/// Build a table from row-major raw tokens.
///
/// With `has_header` the first record names the columns; `names` overrides
/// them. Tokens listed in `nan_values` (and the literal `NaN`) become
/// missing. Each column takes its type from `types`, else from inference
/// when `detect_types` is set, else `default_type`.
pub fn load_records<S: AsRef<str>>(records: &[Vec<S>], opts: &LoadOptions) -> Result<DataFrame> {
    let Some(first) = records.first() else {
        return Err(DataError::EmptyData("no records".to_string())).context("load_records");
    };
    if opts.has_header && records.len() == 1 {
        return Err(DataError::EmptyData("header without rows".to_string()))
            .context("load_records");
    }
    let width = first.len();
    if let Some(names) = &opts.names {
        if names.len() > width {
            return Err(DataError::TooManyNames {
                names: names.len(),
                columns: width,
            })
            .context("load_records");
        }
        if names.len() < width {
            return Err(DataError::NotEnoughNames {
                names: names.len(),
                columns: width,
            })
            .context("load_records");
        }
    }

    let (header, rows): (Vec<String>, &[Vec<S>]) = if opts.has_header {
        (first.iter().map(|s| s.as_ref().to_string()).collect(), &records[1..])
    } else {
        (vec![String::new(); width], records)
    };
    let header = opts.names.clone().unwrap_or(header);

    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(DataError::DimensionMismatch {
            expected: format!("{width} fields per record"),
            actual: format!("{} fields in record {i}", row.len()),
        })
        .context("load_records");
    }

    let mut sentinels = opts.nan_values.clone();
    sentinels.push("NaN".to_string());

    let columns = header
        .iter()
        .enumerate()
        .map(|(c, name)| {
            let raw: Vec<&str> = rows
                .iter()
                .map(|r| r[c].as_ref())
                .map(|t| if opts.is_nan_token(t) { "NaN" } else { t })
                .collect();
            let ty = opts.column_type(name, &raw);
            Series::from_tokens(name.clone(), ty, &raw, &sentinels)
        })
        .collect();
    DataFrame::new(columns).context("load_records")
}

/// Build a table from one name-to-value map per row.
///
/// Columns are the union of all keys, sorted by name. Values are written
/// out as tokens and loaded with [`load_records`]; an absent key is an
/// empty token and a `None` value is missing.
pub fn load_maps(maps: &[IndexMap<String, Option<Value>>], opts: &LoadOptions) -> Result<DataFrame> {
    if maps.is_empty() {
        return Err(DataError::EmptyData("no maps".to_string())).context("load_maps");
    }
    let mut names: Vec<String> = maps
        .iter()
        .flat_map(|m| m.keys().cloned())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect();
    names.sort();

    let mut records = Vec::with_capacity(maps.len() + 1);
    records.push(names.clone());
    for m in maps {
        records.push(
            names
                .iter()
                .map(|n| match m.get(n) {
                    Some(Some(v)) => v.to_string(),
                    Some(None) => "NaN".to_string(),
                    None => String::new(),
                })
                .collect(),
        );
    }
    let opts = LoadOptions {
        has_header: true,
        names: None,
        ..opts.clone()
    };
    load_records(&records, &opts).context("load_maps")
}

/// Build a table of float columns `X0`, `X1`, ... from a numeric matrix
pub fn load_matrix<M: Matrix + ?Sized>(matrix: &M) -> Result<DataFrame> {
    let (nrows, ncols) = matrix.dims();
    let columns = (0..ncols)
        .map(|c| Series::float("", (0..nrows).map(|r| matrix.at(r, c)).collect()))
        .collect();
    DataFrame::new(columns).context("load_matrix")
}

/// Build a table from typed records, one column per non-ignored field.
///
/// A field's type comes from `types` (by field name), else from its
/// declared type when `detect_types` is set, else `default_type`. Values
/// whose text is in `nan_values` become missing. Without `has_header` the
/// field names become the first row and columns are named `X0`, `X1`, ...
pub fn load_structs<R: Record>(records: &[R], opts: &LoadOptions) -> Result<DataFrame> {
    if records.is_empty() {
        return Err(DataError::EmptyData("no records".to_string())).context("load_structs");
    }
    let fields = R::fields();
    let rows: Vec<Vec<Option<Value>>> = records.iter().map(Record::values).collect();
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != fields.len()) {
        return Err(DataError::DimensionMismatch {
            expected: format!("{} fields per record", fields.len()),
            actual: format!("{} fields in record {i}", row.len()),
        })
        .context("load_structs");
    }

    let mut columns = Vec::new();
    for (j, field) in fields.iter().enumerate() {
        if field.ignore {
            continue;
        }
        let ty = match opts.types.get(&field.name) {
            Some(ty) => *ty,
            None if opts.detect_types => field.column_type,
            None => opts.default_type,
        };

        let mut cells = Vec::with_capacity(rows.len() + 1);
        let mut name = field.name.clone();
        if !opts.has_header {
            cells.push(Element::from(std::mem::take(&mut name)));
        }
        for row in &rows {
            cells.push(match &row[j] {
                Some(v) if !opts.is_nan_token(&v.to_string()) => Element::from(v.clone()),
                _ => Element::missing(ty),
            });
        }
        columns.push(Series::from_elements(name, ty, &cells));
    }
    DataFrame::new(columns).context("load_structs")
}
