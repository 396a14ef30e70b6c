//! Partial-update compiler: patch → `SET` clause with positional parameters.
//!
//! # Example
//!
//! ```ignore
//! use jobly::{ColumnMap, Patch, sql_for_partial_update};
//!
//! let patch = Patch::new().set("f1", "v1").set("fjs2", "v2");
//! let set = sql_for_partial_update(&patch, &ColumnMap::new([("fjs2", "f2")]))?;
//! assert_eq!(set.set_cols, r#""f1"=$1, "f2"=$2"#);
//! ```

use crate::column_map::ColumnMap;
use crate::error::{DbError, DbResult};
use crate::param::ParamList;
use crate::value::Value;

/// An ordered set of `logical field → new value` pairs.
///
/// Iteration follows insertion order. Setting a field twice keeps its first
/// position and the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    entries: Vec<(String, Value)>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chainable [`Patch::insert`].
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((field, value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(f, v)| (f.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Patch
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut patch = Patch::new();
        for (k, v) in iter {
            patch.insert(k, v);
        }
        patch
    }
}

/// A compiled `SET` fragment and the values its placeholders refer to.
#[derive(Debug, Clone, PartialEq)]
pub struct SetClause {
    /// `"col_a"=$1, "col_b"=$2, ...`
    pub set_cols: String,
    pub values: Vec<Value>,
}

/// Compile `patch` into a standalone `SET` fragment numbered from `$1`.
///
/// Fails with [`DbError::InvalidArgument`] when the patch is empty.
pub fn sql_for_partial_update(patch: &Patch, columns: &ColumnMap) -> DbResult<SetClause> {
    let mut params = ParamList::new();
    let set_cols = compile_set(patch, columns, &mut params)?;
    Ok(SetClause {
        set_cols,
        values: params.into_values(),
    })
}

/// Compile `patch` into a `SET` fragment, binding values into `params`.
///
/// Placeholders continue from whatever `params` already holds, and anything
/// pushed afterwards continues from the last patch entry.
pub fn compile_set(patch: &Patch, columns: &ColumnMap, params: &mut ParamList) -> DbResult<String> {
    if patch.is_empty() {
        return Err(DbError::invalid_argument("No data"));
    }

    let set_cols = patch
        .iter()
        .map(|(field, value)| {
            let idx = params.push(value.clone());
            format!("{}=${}", columns.quoted(field), idx)
        })
        .collect::<Vec<_>>()
        .join(", ");

    tracing::trace!(target: "jobly.sql", set_cols = %set_cols, params = params.len(), "compiled SET clause");
    Ok(set_cols)
}
