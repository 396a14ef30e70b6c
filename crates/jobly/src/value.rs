//! Dynamically-typed SQL parameter values.
//!
//! Patches and filters carry heterogeneous values (text, integers, decimals,
//! NULL). [`Value`] is the closed set of shapes the jobs resource needs; it
//! implements [`ToSql`] by adapting to the column type PostgreSQL inferred for
//! the placeholder, so an `Int` binds to `integer` and `bigint` columns alike.

use bytes::BytesMut;
use rust_decimal::Decimal;
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A single bound parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Decimal(Decimal),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn encode(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql_checked(ty, out),
            Value::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql_checked(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql_checked(ty, out),
                Type::NUMERIC => Decimal::from(*v).to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            // Decimal strings ("0.25") are accepted for numeric columns.
            Value::Text(v) if *ty == Type::NUMERIC => {
                v.trim().parse::<Decimal>()?.to_sql_checked(ty, out)
            }
            Value::Text(v) => v.to_sql_checked(ty, out),
            Value::Decimal(v) => v.to_sql_checked(ty, out),
        }
    }
}

/// A [`Value`] that could not be encoded for its placeholder's column type.
///
/// Surfaces from the store as [`DbError::InvalidArgument`](crate::DbError::InvalidArgument).
#[derive(Debug, thiserror::Error)]
#[error("cannot bind {value:?} as {ty}: {message}")]
pub struct BindError {
    pub value: Value,
    pub ty: Type,
    pub message: String,
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        self.encode(ty, out).map_err(|e| {
            Box::new(BindError {
                value: self.clone(),
                ty: ty.clone(),
                message: e.to_string(),
            }) as Box<dyn Error + Sync + Send>
        })
    }

    fn accepts(_ty: &Type) -> bool {
        // Each variant delegates to a concrete type's checked encoder.
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
