//! Column types, type inference and column-name fixing

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{DataError, Result};

/// Column type information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int,
    Float,
    Bool,
    String,
}

impl ColumnType {
    /// Check if type is numeric (booleans count as 0/1)
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Float | ColumnType::Int | ColumnType::Bool)
    }

    /// Check if type is string
    pub fn is_string(&self) -> bool {
        matches!(self, ColumnType::String)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Bool => "bool",
            ColumnType::String => "string",
        }
    }

    /// Rank used by [`dominant_type`] and [`infer_column_type`]; higher wins.
    fn priority(&self) -> u8 {
        match self {
            ColumnType::Int => 0,
            ColumnType::Float => 1,
            ColumnType::Bool => 2,
            ColumnType::String => 3,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ColumnType {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "int" => Ok(ColumnType::Int),
            "float" => Ok(ColumnType::Float),
            "bool" => Ok(ColumnType::Bool),
            "string" => Ok(ColumnType::String),
            other => Err(DataError::InvalidParameter(format!(
                "unknown column type '{other}'"
            ))),
        }
    }
}

/// Classify raw text tokens into the tightest column type that holds them all.
///
/// Empty tokens and the literal `NaN` are ignored. A token is `Int` if it
/// parses as a base-10 integer, otherwise `Float` if it parses as a float,
/// otherwise `Bool` if it is exactly `true` or `false`, otherwise `String`.
/// The column type is the highest-priority class seen
/// (`String > Bool > Float > Int`). If every token was ignored the type is
/// undetectable.
pub fn infer_column_type<S: AsRef<str>>(tokens: &[S]) -> Result<ColumnType> {
    let mut seen: Option<ColumnType> = None;
    for token in tokens {
        let token = token.as_ref();
        if token.is_empty() || token == "NaN" {
            continue;
        }
        let class = if token.parse::<i64>().is_ok() {
            ColumnType::Int
        } else if token.parse::<f64>().is_ok() {
            ColumnType::Float
        } else if token == "true" || token == "false" {
            ColumnType::Bool
        } else {
            ColumnType::String
        };
        seen = Some(match seen {
            Some(prev) if prev.priority() >= class.priority() => prev,
            _ => class,
        });
        if seen == Some(ColumnType::String) {
            break;
        }
    }
    seen.ok_or(DataError::TypeUndetectable)
}

/// Pick the dominant type among already-declared column types.
///
/// This is the rule used when heterogeneous columns have to share one
/// element type (row application, struct ingestion). It uses the same
/// ordering as [`infer_column_type`] but works on declared types rather than
/// raw tokens. Returns `None` for an empty list.
pub fn dominant_type<I>(types: I) -> Option<ColumnType>
where
    I: IntoIterator<Item = ColumnType>,
{
    types.into_iter().max_by_key(ColumnType::priority)
}

/// Make column names unique and non-empty, in place.
///
/// Empty names become `X0`, `X1`, ... skipping names already in use. Every
/// name that appears more than once is then suffixed `name_0`, `name_1`, ...
/// (again skipping taken names), processing duplicated names in sorted order
/// so the outcome is deterministic.
pub fn fix_colnames(names: &mut [String]) {
    let mut positions: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    let mut unnamed = Vec::new();
    for (i, name) in names.iter().enumerate() {
        if name.is_empty() {
            unnamed.push(i);
        } else {
            positions.entry(name.clone()).or_default().push(i);
        }
    }

    let mut counter = 0;
    for i in unnamed {
        let mut proposed = format!("X{counter}");
        while names.contains(&proposed) {
            counter += 1;
            proposed = format!("X{counter}");
        }
        names[i] = proposed;
        counter += 1;
    }

    for (name, idx) in positions.into_iter().filter(|(_, idx)| idx.len() > 1) {
        let mut counter = 0;
        for i in idx {
            let mut proposed = format!("{name}_{counter}");
            while names.contains(&proposed) {
                counter += 1;
                proposed = format!("{name}_{counter}");
            }
            names[i] = proposed;
            counter += 1;
        }
    }
}
