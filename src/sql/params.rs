//! Bind values for generated queries.
//!
//! Comparisons go through `column::text`, so filters and ids bind as text; write payloads
//! bind as one JSONB document that PostgreSQL expands into a typed row.

use crate::error::ProviderError;
use serde_json::Value;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;

#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Text(String),
    TextArray(Vec<String>),
    Json(Value),
}

impl PgBindValue {
    /// Text form of a scalar JSON value, as PostgreSQL renders it with `::text`.
    pub fn scalar_text(v: &Value) -> Result<String, ProviderError> {
        match v {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(ProviderError::BadRequest(format!(
                "expected a scalar value, got {}",
                other
            ))),
        }
    }

    pub fn text_array(values: &[Value]) -> Result<Self, ProviderError> {
        values
            .iter()
            .map(Self::scalar_text)
            .collect::<Result<Vec<_>, _>>()
            .map(PgBindValue::TextArray)
    }
}

/// Bind every parameter in order.
pub fn bind_all<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[PgBindValue],
) -> Query<'q, Postgres, PgArguments> {
    for p in params {
        query = match p {
            PgBindValue::Text(s) => query.bind(s.clone()),
            PgBindValue::TextArray(v) => query.bind(v.clone()),
            PgBindValue::Json(v) => query.bind(v.clone()),
        };
    }
    query
}
