//! Positional parameter accumulator.
//!
//! Every compiler in this crate appends to one [`ParamList`] and renders the
//! index it gets back as `$n`, so fragments compiled separately (a `SET`
//! clause, then `WHERE id = $k`) keep contiguous 1-based placeholders.

use crate::value::Value;
use tokio_postgres::types::ToSql;

/// An ordered list of bound parameter values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamList {
    params: Vec<Value>,
}

impl ParamList {
    /// Create a new empty parameter list.
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a parameter and return its 1-based index.
    pub fn push(&mut self, value: impl Into<Value>) -> usize {
        self.params.push(value.into());
        self.params.len()
    }

    /// Add a parameter and return its `$n` placeholder.
    pub fn placeholder(&mut self, value: impl Into<Value>) -> String {
        format!("${}", self.push(value))
    }

    /// Get the current parameter count.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// The bound values, in placeholder order.
    pub fn values(&self) -> &[Value] {
        &self.params
    }

    pub fn into_values(self) -> Vec<Value> {
        self.params
    }

    /// Get all parameters as references for tokio-postgres.
    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_one_based_and_contiguous() {
        let mut params = ParamList::new();
        assert_eq!(params.push("a"), 1);
        assert_eq!(params.push(2), 2);
        assert_eq!(params.placeholder(None::<i32>), "$3");
        assert_eq!(params.len(), 3);
        assert_eq!(params.as_refs().len(), 3);
        assert_eq!(
            params.values(),
            &[Value::from("a"), Value::Int(2), Value::Null]
        );
    }
}
