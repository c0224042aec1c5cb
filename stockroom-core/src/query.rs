//! Scalar statement parameters and query output.
//!
//! Route handlers never touch the driver's argument types; they hand
//! scalars across this boundary and the core binds them in order.

use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::Postgres;

/// A positional scalar parameter for a statement issued through the core.
///
/// NULLs keep their declared type so the server can plan against typed
/// placeholders (an untyped NULL in a float column is a type error).
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(Option<i64>),
    Float(Option<f64>),
    Text(Option<String>),
    Bool(Option<bool>),
}

impl SqlParam {
    pub(crate) fn bind_onto<'q>(
        &'q self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        match self {
            Self::Int(value) => query.bind(*value),
            Self::Float(value) => query.bind(*value),
            Self::Text(value) => query.bind(value.as_deref()),
            Self::Bool(value) => query.bind(*value),
        }
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        Self::Int(Some(value))
    }
}

impl From<i32> for SqlParam {
    fn from(value: i32) -> Self {
        Self::Int(Some(i64::from(value)))
    }
}

impl From<f64> for SqlParam {
    fn from(value: f64) -> Self {
        Self::Float(Some(value))
    }
}

impl From<bool> for SqlParam {
    fn from(value: bool) -> Self {
        Self::Bool(Some(value))
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        Self::Text(Some(value))
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        Self::Text(Some(value.to_owned()))
    }
}

impl From<Option<String>> for SqlParam {
    fn from(value: Option<String>) -> Self {
        Self::Text(value)
    }
}

impl From<Option<f64>> for SqlParam {
    fn from(value: Option<f64>) -> Self {
        Self::Float(value)
    }
}

/// Rows and row count returned by a one-shot query.
#[derive(Debug)]
pub struct QueryOutput {
    pub rows: Vec<PgRow>,
    pub row_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_preserve_values() {
        assert_eq!(SqlParam::from(7i32), SqlParam::Int(Some(7)));
        assert_eq!(SqlParam::from("name"), SqlParam::Text(Some("name".into())));
        assert_eq!(SqlParam::from(None::<f64>), SqlParam::Float(None));
        assert_eq!(
            SqlParam::from(Some("x".to_string())),
            SqlParam::Text(Some("x".into()))
        );
    }
}
